//! Profile form validation
//!
//! Raw form input is checked field by field before a `Profile` exists.
//! Every failing field is reported, not just the first.

use crate::error::{AdvisorError, FieldError};
use crate::models::{FinancialGoal, Profile};
use crate::Result;
use serde::Deserialize;
use serde_json::Value;

const MIN_AGE: i64 = 18;
const MAX_AGE: i64 = 100;
const MIN_NAME_LEN: usize = 2;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Profile form as submitted by the client. Numeric fields arrive either
/// as JSON numbers or as strings from HTML inputs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub monthly_income: Option<Value>,
    #[serde(default)]
    pub dependents: Option<Value>,
    #[serde(default)]
    pub goal: String,
}

/// Coerce a form value to a number. Missing, null and blank values are
/// reported as required; anything else that does not parse as non-numeric.
/// The error is pushed onto `errors` and `None` returned.
pub fn coerce_number(
    field: &str,
    label: &str,
    value: Option<&Value>,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    let parsed = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) if raw.trim().is_empty() => None,
        Some(Value::Number(n)) => Some(n.as_f64()),
        Some(Value::String(raw)) => Some(raw.trim().parse::<f64>().ok()),
        Some(_) => Some(None),
    };

    match parsed {
        None => {
            errors.push(FieldError::new(field, format!("{} is required.", label)));
            None
        }
        Some(Some(n)) if n.is_finite() => Some(n),
        Some(_) => {
            errors.push(FieldError::new(field, format!("{} must be a number.", label)));
            None
        }
    }
}

fn coerce_whole(
    field: &str,
    label: &str,
    value: Option<&Value>,
    errors: &mut Vec<FieldError>,
) -> Option<i64> {
    let n = coerce_number(field, label, value, errors)?;
    if n.fract() != 0.0 {
        errors.push(FieldError::new(field, format!("{} must be a whole number.", label)));
        return None;
    }
    Some(n as i64)
}

impl ProfileForm {
    /// Validate and build an immutable profile
    pub fn validate(&self) -> Result<Profile> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.chars().count() < MIN_NAME_LEN {
            errors.push(FieldError::new(
                "name",
                "Name must be at least 2 characters.",
            ));
        }

        let age = coerce_whole("age", "Age", self.age.as_ref(), &mut errors);
        match age {
            Some(age) if age < MIN_AGE => {
                errors.push(FieldError::new("age", "You must be at least 18."))
            }
            Some(age) if age > MAX_AGE => {
                errors.push(FieldError::new("age", "Age must be 100 or less."))
            }
            _ => {}
        }

        let monthly_income = coerce_number(
            "monthly_income",
            "Monthly income",
            self.monthly_income.as_ref(),
            &mut errors,
        );
        if matches!(monthly_income, Some(income) if income < 0.0) {
            errors.push(FieldError::new(
                "monthly_income",
                "Monthly income cannot be negative.",
            ));
        }

        // no dependents unless stated
        let dependents = match &self.dependents {
            None | Some(Value::Null) => Some(0),
            Some(value) => coerce_whole("dependents", "Dependents", Some(value), &mut errors),
        };
        if matches!(dependents, Some(d) if d < 0) {
            errors.push(FieldError::new(
                "dependents",
                "Dependents cannot be negative.",
            ));
        }

        let goal = FinancialGoal::parse(&self.goal);
        if goal.is_none() {
            errors.push(FieldError::new("goal", "Please select a goal."));
        }

        match (age, monthly_income, dependents, goal) {
            (Some(age), Some(monthly_income), Some(dependents), Some(goal))
                if errors.is_empty() =>
            {
                Ok(Profile::new(
                    name.to_string(),
                    age as u32,
                    monthly_income,
                    dependents as u32,
                    goal,
                ))
            }
            _ => Err(AdvisorError::Validation(errors)),
        }
    }
}

/// Re-check invariants on a profile that arrived already built
/// (e.g. echoed back by a client on each advice request).
pub fn check_profile(profile: &Profile) -> Result<()> {
    let mut errors = Vec::new();

    if i64::from(profile.age) < MIN_AGE || i64::from(profile.age) > MAX_AGE {
        errors.push(FieldError::new("age", "Age must be between 18 and 100."));
    }
    if !profile.annual_income.is_finite() || profile.annual_income < 0.0 {
        errors.push(FieldError::new(
            "annual_income",
            "Annual income cannot be negative.",
        ));
    }
    if !profile.monthly_income.is_finite() || profile.monthly_income < 0.0 {
        errors.push(FieldError::new(
            "monthly_income",
            "Monthly income cannot be negative.",
        ));
    } else if (profile.annual_income - profile.monthly_income * MONTHS_PER_YEAR).abs() > 0.5 {
        errors.push(FieldError::new(
            "annual_income",
            "Annual income must be twelve times the monthly income.",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AdvisorError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form() -> ProfileForm {
        ProfileForm {
            name: "Ananya Sharma".to_string(),
            age: Some(json!(30)),
            monthly_income: Some(json!(50_000)),
            dependents: Some(json!(0)),
            goal: "term-insurance".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let profile = form().validate().unwrap();
        assert_eq!(profile.name, "Ananya Sharma");
        assert_eq!(profile.annual_income, 600_000.0);
        assert_eq!(profile.goal, FinancialGoal::TermInsurance);
    }

    #[test]
    fn test_collects_every_field_error() {
        let bad = ProfileForm {
            name: " A ".to_string(),
            age: Some(json!(17)),
            monthly_income: Some(json!(-1.0)),
            dependents: Some(json!(-2)),
            goal: String::new(),
        };

        let err = bad.validate().unwrap_err();
        let fields: Vec<&str> = err
            .field_errors()
            .unwrap()
            .iter()
            .map(|e| e.field.as_str())
            .collect();

        assert_eq!(
            fields,
            vec!["name", "age", "monthly_income", "dependents", "goal"]
        );
    }

    #[test]
    fn test_age_upper_bound() {
        let mut f = form();
        f.age = Some(json!(101));
        let err = f.validate().unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].message, "Age must be 100 or less.");

        f.age = Some(json!(100));
        assert!(f.validate().is_ok());
    }

    #[test]
    fn test_check_profile_rejects_underage() {
        let mut profile = form().validate().unwrap();
        assert!(check_profile(&profile).is_ok());

        profile.age = 16;
        assert!(check_profile(&profile).is_err());
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let mut f = form();
        f.age = Some(json!("30"));
        f.monthly_income = Some(json!(" 45000.5 "));
        f.dependents = None;

        let profile = f.validate().unwrap();
        assert_eq!(profile.age, 30);
        assert_eq!(profile.annual_income, 540_006.0);
        assert_eq!(profile.dependents, 0);
    }

    #[test]
    fn test_missing_and_non_numeric_fields() {
        let f = ProfileForm {
            name: "Ananya".to_string(),
            age: None,
            monthly_income: Some(json!("lots")),
            dependents: Some(json!(1.5)),
            goal: "retirement".to_string(),
        };

        let err = f.validate().unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "age");
        assert_eq!(errors[0].message, "Age is required.");
        assert_eq!(errors[1].message, "Monthly income must be a number.");
        assert_eq!(errors[2].message, "Dependents must be a whole number.");
    }

    #[test]
    fn test_check_profile_rejects_edited_annual_income() {
        let mut profile = form().validate().unwrap();
        profile.annual_income = 10_000_000.0;

        let err = check_profile(&profile).unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].field, "annual_income");
    }
}
