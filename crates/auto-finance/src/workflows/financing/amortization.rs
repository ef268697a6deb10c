//! Payment math shared by the recommendation engine and the quote service.
//!
//! Two lease models coexist. [`LeaseModel::Simplified`] amortizes 60% of MSRP
//! at the lease APR and backs the default recommendation. [`LeaseModel::Detailed`]
//! follows the capitalized cost / residual / money factor / tax structure used
//! for standalone lease quotes.

use serde::{Deserialize, Serialize};

use super::config::LeaseTerms;

/// Level monthly payment for `principal` at `apr_percent` over `term_months`.
///
/// A zero rate divides evenly; a zero term means the whole principal is due now.
pub fn finance_monthly(principal: f64, apr_percent: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return principal;
    }

    let n = f64::from(term_months);
    let r = apr_percent / 100.0 / 12.0;
    if r == 0.0 {
        return principal / n;
    }

    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Amount financed after the down payment, never negative.
pub fn finance_principal(price: f64, down_payment: f64) -> f64 {
    (price - down_payment).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseModel {
    #[default]
    Simplified,
    Detailed,
}

/// Monthly lease payment under the selected model.
pub fn lease_monthly(
    model: LeaseModel,
    terms: &LeaseTerms,
    msrp: f64,
    apr_percent: f64,
    term_months: u32,
    down_payment: f64,
) -> f64 {
    match model {
        LeaseModel::Simplified => {
            finance_monthly(msrp * terms.residual_ratio, apr_percent, term_months)
        }
        LeaseModel::Detailed => {
            let cap_cost = msrp * (1.0 - terms.cap_cost_discount) + terms.acquisition_fee;
            let adjusted_cap = cap_cost - down_payment;
            let residual = msrp * terms.residual_ratio;
            let money_factor = apr_percent / terms.money_factor_divisor;

            let depreciation = (adjusted_cap - residual) / f64::from(term_months.max(1));
            let finance_charge = (adjusted_cap + residual) * money_factor;
            (depreciation + finance_charge) * (1.0 + terms.tax_rate)
        }
    }
}

/// Cash due at lease signing.
pub fn lease_upfront(terms: &LeaseTerms, down_payment: f64) -> f64 {
    (down_payment * terms.upfront_ratio).max(0.0)
}
