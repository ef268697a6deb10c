use super::config::{FinancingConfig, SelectionThresholds};
use super::domain::ProductType;

/// Down payment as a share of the vehicle price. Degenerate prices yield 0,
/// which routes the applicant to a lease.
pub fn down_payment_ratio(down_payment: f64, vehicle_price: f64) -> f64 {
    if !vehicle_price.is_finite() || vehicle_price <= 0.0 {
        return 0.0;
    }

    let ratio = down_payment / vehicle_price;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// Stateless decision tree over credit score and down-payment ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationSelector {
    thresholds: SelectionThresholds,
}

impl RecommendationSelector {
    pub fn new(thresholds: SelectionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn select(&self, credit_score: u16, down_payment_ratio: f64) -> ProductType {
        let ratio = if down_payment_ratio.is_finite() {
            down_payment_ratio
        } else {
            0.0
        };
        let t = &self.thresholds;

        if credit_score >= t.purchase_min_score && ratio >= t.purchase_min_ratio {
            ProductType::Purchase
        } else if credit_score < t.lease_below_score || ratio < t.lease_below_ratio {
            ProductType::Lease
        } else {
            ProductType::Finance
        }
    }
}

impl Default for RecommendationSelector {
    fn default() -> Self {
        Self::new(FinancingConfig::standard().thresholds)
    }
}

/// [`RecommendationSelector::select`] with the standard thresholds.
pub fn select(credit_score: u16, down_payment_ratio: f64) -> ProductType {
    RecommendationSelector::default().select(credit_score, down_payment_ratio)
}
