//! Dual-regime Indian income-tax engine
//!
//! Pure arithmetic over marginal brackets. No LLM involvement.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod advisor;
pub use advisor::TaxAdvisor;

pub const STANDARD_DEDUCTION: f64 = 50_000.0;
pub const CESS_RATE: f64 = 0.04;
/// New-regime taxable income at or below this pays nothing (s.87A rebate)
pub const NEW_REGIME_REBATE_LIMIT: f64 = 700_000.0;

/// A marginal band: income above `lower` (up to the next band) taxed at `rate`
#[derive(Debug, Clone, Copy)]
pub struct TaxBand {
    pub lower: f64,
    pub rate: f64,
}

const OLD_REGIME_BANDS: &[TaxBand] = &[
    TaxBand { lower: 0.0, rate: 0.0 },
    TaxBand { lower: 250_000.0, rate: 0.05 },
    TaxBand { lower: 500_000.0, rate: 0.20 },
    TaxBand { lower: 1_000_000.0, rate: 0.30 },
];

const NEW_REGIME_BANDS: &[TaxBand] = &[
    TaxBand { lower: 0.0, rate: 0.0 },
    TaxBand { lower: 300_000.0, rate: 0.05 },
    TaxBand { lower: 600_000.0, rate: 0.10 },
    TaxBand { lower: 900_000.0, rate: 0.15 },
    TaxBand { lower: 1_200_000.0, rate: 0.20 },
    TaxBand { lower: 1_500_000.0, rate: 0.30 },
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaxRegime {
    Old,
    New,
}

impl fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaxRegime::Old => "Old Regime",
            TaxRegime::New => "New Regime",
        };
        write!(f, "{}", s)
    }
}

/// Tax liability under both regimes, in whole rupees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxComputation {
    pub old_regime_tax: u64,
    pub new_regime_tax: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegimeBreakdown {
    pub regime: TaxRegime,
    pub taxable_income: f64,
    pub tax_before_cess: f64,
    pub cess: f64,
    pub rebate_applied: bool,
    pub total_tax: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegimeComparison {
    pub old_regime: RegimeBreakdown,
    pub new_regime: RegimeBreakdown,
    pub recommended: TaxRegime,
    pub savings: u64,
}

impl RegimeComparison {
    pub fn totals(&self) -> TaxComputation {
        TaxComputation {
            old_regime_tax: self.old_regime.total_tax,
            new_regime_tax: self.new_regime.total_tax,
        }
    }
}

/// Sum of marginal tax across bands
fn marginal_tax(taxable: f64, bands: &[TaxBand]) -> f64 {
    bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let upper = bands.get(i + 1).map(|b| b.lower).unwrap_or(f64::INFINITY);
            let slice = taxable.min(upper) - band.lower;
            if slice > 0.0 {
                slice * band.rate
            } else {
                0.0
            }
        })
        .sum()
}

fn round_rupees(amount: f64) -> u64 {
    amount.round().max(0.0) as u64
}

pub fn old_regime_breakdown(income: f64, deductions: f64, hra_exemption: f64) -> RegimeBreakdown {
    let taxable = (income - deductions - hra_exemption - STANDARD_DEDUCTION).max(0.0);
    let base = marginal_tax(taxable, OLD_REGIME_BANDS);
    let cess = base * CESS_RATE;

    RegimeBreakdown {
        regime: TaxRegime::Old,
        taxable_income: taxable,
        tax_before_cess: base,
        cess,
        rebate_applied: false,
        total_tax: round_rupees(base * (1.0 + CESS_RATE)),
    }
}

pub fn new_regime_breakdown(income: f64) -> RegimeBreakdown {
    let taxable = (income - STANDARD_DEDUCTION).max(0.0);
    let base = marginal_tax(taxable, NEW_REGIME_BANDS);

    if taxable <= NEW_REGIME_REBATE_LIMIT {
        return RegimeBreakdown {
            regime: TaxRegime::New,
            taxable_income: taxable,
            tax_before_cess: base,
            cess: 0.0,
            rebate_applied: true,
            total_tax: 0,
        };
    }

    RegimeBreakdown {
        regime: TaxRegime::New,
        taxable_income: taxable,
        tax_before_cess: base,
        cess: base * CESS_RATE,
        rebate_applied: false,
        total_tax: round_rupees(base * (1.0 + CESS_RATE)),
    }
}

/// Tax under both regimes. Callers reject negative inputs beforehand.
pub fn compute_tax(income: f64, deductions: f64, hra_exemption: f64) -> TaxComputation {
    TaxComputation {
        old_regime_tax: old_regime_breakdown(income, deductions, hra_exemption).total_tax,
        new_regime_tax: new_regime_breakdown(income).total_tax,
    }
}

/// Full breakdown plus the cheaper regime. Ties go to the new (default) regime.
pub fn compare_regimes(income: f64, deductions: f64, hra_exemption: f64) -> RegimeComparison {
    let old_regime = old_regime_breakdown(income, deductions, hra_exemption);
    let new_regime = new_regime_breakdown(income);

    let (recommended, savings) = if old_regime.total_tax < new_regime.total_tax {
        (TaxRegime::Old, new_regime.total_tax - old_regime.total_tax)
    } else {
        (TaxRegime::New, old_regime.total_tax - new_regime.total_tax)
    };

    RegimeComparison {
        old_regime,
        new_regime,
        recommended,
        savings,
    }
}
