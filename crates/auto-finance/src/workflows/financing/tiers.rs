use super::config::{AprTier, FinancingConfig};
use super::domain::ProductType;

/// Maps a credit score onto the configured APR table.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditTierResolver {
    tiers: Vec<AprTier>,
    floor_finance_apr: f64,
    floor_lease_apr: f64,
    valid_scores: (u16, u16),
}

impl CreditTierResolver {
    pub fn new(config: &FinancingConfig) -> Self {
        let mut tiers = config.tiers.clone();
        tiers.sort_by(|a, b| b.min_score.cmp(&a.min_score));

        Self {
            tiers,
            floor_finance_apr: config.floor_finance_apr,
            floor_lease_apr: config.floor_lease_apr,
            valid_scores: config.valid_scores,
        }
    }

    /// APR percentage for `product`. Never fails: implausible scores land in the
    /// most expensive tier.
    pub fn resolve_apr(&self, product: ProductType, credit_score: u16) -> f64 {
        let (min, max) = self.valid_scores;
        let tier = if (min..=max).contains(&credit_score) {
            self.tiers
                .iter()
                .find(|tier| credit_score >= tier.min_score)
        } else {
            None
        };

        match (product, tier) {
            (ProductType::Purchase, _) => 0.0,
            (ProductType::Finance, Some(tier)) => tier.finance_apr,
            (ProductType::Lease, Some(tier)) => tier.lease_apr,
            (ProductType::Finance, None) => self.floor_finance_apr,
            (ProductType::Lease, None) => self.floor_lease_apr,
        }
    }
}

impl Default for CreditTierResolver {
    fn default() -> Self {
        Self::new(&FinancingConfig::standard())
    }
}

/// [`CreditTierResolver::resolve_apr`] against the standard tier table.
pub fn resolve_apr(product: ProductType, credit_score: u16) -> f64 {
    CreditTierResolver::default().resolve_apr(product, credit_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_tier_is_inclusive_at_740() {
        for score in [740, 760, 800, 850] {
            assert_eq!(resolve_apr(ProductType::Finance, score), 4.5);
            assert_eq!(resolve_apr(ProductType::Lease, score), 3.5);
        }
        assert_eq!(resolve_apr(ProductType::Finance, 739), 6.5);
        assert_eq!(resolve_apr(ProductType::Lease, 739), 5.0);
    }

    #[test]
    fn lower_tiers_step_down() {
        assert_eq!(resolve_apr(ProductType::Finance, 670), 6.5);
        assert_eq!(resolve_apr(ProductType::Finance, 669), 9.0);
        assert_eq!(resolve_apr(ProductType::Lease, 580), 7.0);
        assert_eq!(resolve_apr(ProductType::Lease, 579), 9.0);
        assert_eq!(resolve_apr(ProductType::Finance, 300), 12.0);
    }

    #[test]
    fn purchase_never_carries_interest() {
        assert_eq!(resolve_apr(ProductType::Purchase, 820), 0.0);
        assert_eq!(resolve_apr(ProductType::Purchase, 0), 0.0);
    }

    #[test]
    fn implausible_scores_fall_to_highest_rate() {
        assert_eq!(resolve_apr(ProductType::Finance, 0), 12.0);
        assert_eq!(resolve_apr(ProductType::Finance, 900), 12.0);
        assert_eq!(resolve_apr(ProductType::Lease, 9_999), 9.0);
    }

    #[test]
    fn unsorted_tables_are_normalised() {
        let mut config = FinancingConfig::standard();
        config.tiers.reverse();
        let resolver = CreditTierResolver::new(&config);
        assert_eq!(resolver.resolve_apr(ProductType::Finance, 745), 4.5);
    }
}
