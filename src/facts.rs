//! Deterministic facts derived from a profile
//!
//! These are handed to the provider as ground truth, so they must never
//! depend on anything but the profile.

use crate::models::{ComputedFacts, Profile};

pub const COVER_INCOME_MULTIPLE: f64 = 10.0;
pub const PREMIUM_PER_DEPENDENT: f64 = 200.0;

pub const COVER_FACT: &str = "Recommended Term Insurance Cover (₹)";
pub const PREMIUM_FACT: &str = "Illustrative Annual Premium (₹)";

pub fn recommended_cover(profile: &Profile) -> f64 {
    profile.annual_income * COVER_INCOME_MULTIPLE
}

/// Illustrative only: (cover / 1000) × (age / 10) + 200 per dependent
pub fn premium_estimate(profile: &Profile) -> u64 {
    let cover = recommended_cover(profile);
    let estimate = (cover / 1000.0) * (f64::from(profile.age) / 10.0)
        + f64::from(profile.dependents) * PREMIUM_PER_DEPENDENT;
    estimate.round().max(0.0) as u64
}

pub fn compute_facts(profile: &Profile) -> ComputedFacts {
    let mut facts = ComputedFacts::new();
    facts.insert(
        COVER_FACT.to_string(),
        format_inr(recommended_cover(profile).round().max(0.0) as u64),
    );
    facts.insert(PREMIUM_FACT.to_string(), format_inr(premium_estimate(profile)));
    facts
}

/// Indian digit grouping: last three digits, then pairs (12,34,567)
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FinancialGoal;

    fn profile(age: u32, monthly: f64, dependents: u32) -> Profile {
        Profile::new(
            "Test User".to_string(),
            age,
            monthly,
            dependents,
            FinancialGoal::TermInsurance,
        )
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(0), "0");
        assert_eq!(format_inr(999), "999");
        assert_eq!(format_inr(1_000), "1,000");
        assert_eq!(format_inr(18_000), "18,000");
        assert_eq!(format_inr(600_000), "6,00,000");
        assert_eq!(format_inr(12_000_000), "1,20,00,000");
    }

    #[test]
    fn test_cover_and_premium() {
        let p = profile(30, 50_000.0, 2);
        assert_eq!(recommended_cover(&p), 6_000_000.0);
        // 6000 * 3.0 + 400
        assert_eq!(premium_estimate(&p), 18_400);
    }

    #[test]
    fn test_compute_facts_keys() {
        let facts = compute_facts(&profile(40, 100_000.0, 0));
        assert_eq!(facts.get(COVER_FACT).unwrap(), "1,20,00,000");
        assert_eq!(facts.get(PREMIUM_FACT).unwrap(), "48,000");
    }
}
