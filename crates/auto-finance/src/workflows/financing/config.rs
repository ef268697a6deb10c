use serde::{Deserialize, Serialize};

/// One row of the credit tier table. A score at or above `min_score` earns the
/// listed rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AprTier {
    pub min_score: u16,
    pub finance_apr: f64,
    pub lease_apr: f64,
}

/// Score/ratio gate for one branch of the recommendation tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionThresholds {
    /// `score >= purchase_min_score && ratio >= purchase_min_ratio` recommends cash.
    pub purchase_min_score: u16,
    pub purchase_min_ratio: f64,
    /// `score < lease_below_score || ratio < lease_below_ratio` recommends a lease.
    pub lease_below_score: u16,
    pub lease_below_ratio: f64,
}

/// Inputs of the detailed (residual / money factor / tax) lease model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeaseTerms {
    pub residual_ratio: f64,
    pub cap_cost_discount: f64,
    pub acquisition_fee: f64,
    pub tax_rate: f64,
    pub money_factor_divisor: f64,
    /// Share of the down payment charged at signing.
    pub upfront_ratio: f64,
}

/// Business constants behind every recommendation. None of these are derived;
/// they are product decisions and belong in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingConfig {
    /// Ordered from the highest `min_score` down.
    pub tiers: Vec<AprTier>,
    /// Rates for scores below every tier or outside `valid_scores`.
    pub floor_finance_apr: f64,
    pub floor_lease_apr: f64,
    pub valid_scores: (u16, u16),
    pub thresholds: SelectionThresholds,
    pub finance_term_months: u32,
    pub lease_term_months: u32,
    pub lease: LeaseTerms,
}

impl FinancingConfig {
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                AprTier {
                    min_score: 740,
                    finance_apr: 4.5,
                    lease_apr: 3.5,
                },
                AprTier {
                    min_score: 670,
                    finance_apr: 6.5,
                    lease_apr: 5.0,
                },
                AprTier {
                    min_score: 580,
                    finance_apr: 9.0,
                    lease_apr: 7.0,
                },
            ],
            floor_finance_apr: 12.0,
            floor_lease_apr: 9.0,
            valid_scores: (300, 850),
            thresholds: SelectionThresholds {
                purchase_min_score: 750,
                purchase_min_ratio: 0.30,
                lease_below_score: 650,
                lease_below_ratio: 0.10,
            },
            finance_term_months: 60,
            lease_term_months: 36,
            lease: LeaseTerms {
                residual_ratio: 0.60,
                cap_cost_discount: 0.05,
                acquisition_fee: 650.0,
                tax_rate: 0.0625,
                money_factor_divisor: 2400.0,
                upfront_ratio: 0.10,
            },
        }
    }
}

impl Default for FinancingConfig {
    fn default() -> Self {
        Self::standard()
    }
}
