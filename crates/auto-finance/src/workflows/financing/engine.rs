use serde::{Deserialize, Serialize};

use super::amortization::{
    finance_monthly, finance_principal, lease_monthly, lease_upfront, LeaseModel,
};
use super::catalog::VehicleOption;
use super::config::FinancingConfig;
use super::domain::{ApplicantProfile, ProductType, ProfileError, ProfileField};
use super::selector::{down_payment_ratio, RecommendationSelector};
use super::tiers::CreditTierResolver;

/// Fully priced financing product for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingOption {
    pub product: ProductType,
    pub monthly_payment: f64,
    pub apr: f64,
    pub term_months: u32,
    pub total_cost: f64,
    pub upfront_cost: f64,
}

impl FinancingOption {
    /// Cumulative amount paid through `month`, excluding upfront cash. Cash
    /// purchases are paid in full from the first month.
    pub fn paid_through(&self, month: u32) -> f64 {
        match self.product {
            ProductType::Purchase => self.total_cost,
            _ => self.monthly_payment * f64::from(month.min(self.term_months)),
        }
    }
}

/// One point on the cumulative cost comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulePoint {
    pub month: u32,
    pub lease: f64,
    pub finance: f64,
    pub purchase: f64,
}

/// Recommendation computed for a single vehicle selection. A new selection
/// produces a new result; this value is never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommended: ProductType,
    /// Lease, finance, purchase, in that order.
    pub options: Vec<FinancingOption>,
    pub vehicle_id: String,
    pub vehicle_price: f64,
    pub down_payment_ratio: f64,
    pub lease_model: LeaseModel,
}

impl RecommendationResult {
    pub fn option(&self, product: ProductType) -> Option<&FinancingOption> {
        self.options.iter().find(|option| option.product == product)
    }

    pub fn recommended_option(&self) -> Option<&FinancingOption> {
        self.option(self.recommended)
    }

    /// Month-by-month cumulative payments over the longer of the two terms.
    pub fn payment_schedule(&self) -> Vec<SchedulePoint> {
        let horizon = self
            .options
            .iter()
            .map(|option| option.term_months)
            .max()
            .unwrap_or(0);

        let paid = |product: ProductType, month: u32| {
            self.option(product)
                .map(|option| option.paid_through(month))
                .unwrap_or(0.0)
        };

        (1..=horizon)
            .map(|month| SchedulePoint {
                month,
                lease: paid(ProductType::Lease, month),
                finance: paid(ProductType::Finance, month),
                purchase: paid(ProductType::Purchase, month),
            })
            .collect()
    }
}

/// Pure recommendation and payment engine. Holds no session state, so a single
/// instance is shared by every caller.
#[derive(Debug, Clone)]
pub struct FinancingEngine {
    config: FinancingConfig,
    resolver: CreditTierResolver,
    selector: RecommendationSelector,
    lease_model: LeaseModel,
}

impl FinancingEngine {
    pub fn new(config: FinancingConfig) -> Self {
        let resolver = CreditTierResolver::new(&config);
        let selector = RecommendationSelector::new(config.thresholds);
        Self {
            config,
            resolver,
            selector,
            lease_model: LeaseModel::Simplified,
        }
    }

    pub fn standard() -> Self {
        Self::new(FinancingConfig::standard())
    }

    pub fn with_lease_model(mut self, model: LeaseModel) -> Self {
        self.lease_model = model;
        self
    }

    pub fn config(&self) -> &FinancingConfig {
        &self.config
    }

    pub fn resolver(&self) -> &CreditTierResolver {
        &self.resolver
    }

    /// Recommendation for `vehicle`. Fails when the credit score or down
    /// payment cannot be used.
    pub fn recommend(
        &self,
        profile: &ApplicantProfile,
        vehicle: &VehicleOption,
    ) -> Result<RecommendationResult, ProfileError> {
        let credit_score = profile.credit_score()?;
        let down_payment = profile.down_payment()?;
        Ok(self.calculate(credit_score, down_payment, vehicle))
    }

    /// Like [`recommend`](Self::recommend), but substitutes the conservative
    /// values (score 0, no down payment) and reports what was substituted.
    pub fn recommend_lenient(
        &self,
        profile: &ApplicantProfile,
        vehicle: &VehicleOption,
    ) -> (RecommendationResult, Vec<ProfileError>) {
        let mut substituted = Vec::new();

        let credit_score = profile
            .credit_score
            .require(ProfileField::CreditScore)
            .unwrap_or_else(|err| {
                substituted.push(err);
                0
            });
        let down_payment = profile
            .down_payment
            .require(ProfileField::DownPayment)
            .unwrap_or_else(|err| {
                substituted.push(err);
                0.0
            });

        (
            self.calculate(credit_score, down_payment, vehicle),
            substituted,
        )
    }

    pub fn calculate(
        &self,
        credit_score: u16,
        down_payment: f64,
        vehicle: &VehicleOption,
    ) -> RecommendationResult {
        let price = vehicle.price;
        let ratio = down_payment_ratio(down_payment, price);
        let recommended = self.selector.select(credit_score, ratio);

        let options = ProductType::ordered()
            .into_iter()
            .map(|product| self.option(product, credit_score, down_payment, price))
            .collect();

        RecommendationResult {
            recommended,
            options,
            vehicle_id: vehicle.id.clone(),
            vehicle_price: price,
            down_payment_ratio: ratio,
            lease_model: self.lease_model,
        }
    }

    /// Prices a single product.
    pub fn option(
        &self,
        product: ProductType,
        credit_score: u16,
        down_payment: f64,
        price: f64,
    ) -> FinancingOption {
        let apr = self.resolver.resolve_apr(product, credit_score);

        match product {
            ProductType::Purchase => FinancingOption {
                product,
                monthly_payment: 0.0,
                apr: 0.0,
                term_months: 0,
                total_cost: price,
                upfront_cost: price,
            },
            ProductType::Finance => {
                let term = self.config.finance_term_months;
                let principal = finance_principal(price, down_payment);
                let monthly = finance_monthly(principal, apr, term);
                FinancingOption {
                    product,
                    monthly_payment: monthly,
                    apr,
                    term_months: term,
                    total_cost: monthly * f64::from(term) + down_payment,
                    upfront_cost: down_payment,
                }
            }
            ProductType::Lease => {
                let term = self.config.lease_term_months;
                let monthly = lease_monthly(
                    self.lease_model,
                    &self.config.lease,
                    price,
                    apr,
                    term,
                    down_payment,
                );
                let upfront = lease_upfront(&self.config.lease, down_payment);
                FinancingOption {
                    product,
                    monthly_payment: monthly,
                    apr,
                    term_months: term,
                    total_cost: monthly * f64::from(term) + upfront,
                    upfront_cost: upfront,
                }
            }
        }
    }
}

impl Default for FinancingEngine {
    fn default() -> Self {
        Self::standard()
    }
}
