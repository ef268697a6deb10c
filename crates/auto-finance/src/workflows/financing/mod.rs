//! Recommendation and payment calculation engine.
//!
//! Everything in this module is deterministic and network-free except the quote
//! client, which always degrades to the local math.

pub mod amortization;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod quotes;
pub mod router;
pub mod selector;
pub mod tiers;

#[cfg(test)]
mod tests;

pub use amortization::{
    finance_monthly, finance_principal, lease_monthly, lease_upfront, LeaseModel,
};
pub use catalog::{BadgeRule, CatalogEntry, CatalogError, VehicleCatalog, VehicleOption, VehicleSpecs};
pub use config::{AprTier, FinancingConfig, LeaseTerms, SelectionThresholds};
pub use domain::{
    ApplicantProfile, EmploymentStatus, ParsedField, ProductType, ProfileError, ProfileField,
    ProfileForm,
};
pub use engine::{FinancingEngine, FinancingOption, RecommendationResult, SchedulePoint};
pub use quotes::{
    FinanceQuoteRequest, HttpQuoteClient, LeaseQuoteRequest, QuoteError, QuoteGateway,
    QuoteOutcome, QuoteService,
};
pub use router::quote_router;
pub use selector::{down_payment_ratio, select, RecommendationSelector};
pub use tiers::{resolve_apr, CreditTierResolver};
