use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::amortization::{finance_monthly, finance_principal, lease_monthly, LeaseModel};
use super::config::LeaseTerms;

/// Query of `GET /calculatefinance/`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinanceQuoteRequest {
    pub vehicle_value: f64,
    pub apr: f64,
    pub months: u32,
    #[serde(default)]
    pub downpayment: f64,
}

/// Query of `GET /calculatelease/`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeaseQuoteRequest {
    pub msrp: f64,
    pub apr: f64,
    pub term_months: u32,
    #[serde(default)]
    pub downpayment: f64,
}

fn check_amount(name: &'static str, value: f64) -> Result<(), QuoteError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(QuoteError::InvalidInput(name))
    }
}

impl FinanceQuoteRequest {
    pub fn validate(&self) -> Result<(), QuoteError> {
        check_amount("vehicle_value", self.vehicle_value)?;
        check_amount("apr", self.apr)?;
        check_amount("downpayment", self.downpayment)
    }

    pub fn local_monthly(&self) -> f64 {
        finance_monthly(
            finance_principal(self.vehicle_value, self.downpayment),
            self.apr,
            self.months,
        )
    }
}

impl LeaseQuoteRequest {
    pub fn validate(&self) -> Result<(), QuoteError> {
        check_amount("msrp", self.msrp)?;
        check_amount("apr", self.apr)?;
        check_amount("downpayment", self.downpayment)
    }

    /// Standalone lease quotes use the detailed model.
    pub fn local_monthly(&self, terms: &LeaseTerms) -> f64 {
        lease_monthly(
            LeaseModel::Detailed,
            terms,
            self.msrp,
            self.apr,
            self.term_months,
            self.downpayment,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error("quote service unreachable: {0}")]
    Transport(String),
    #[error("quote service returned HTTP {0}")]
    Status(u16),
    #[error("quote service returned a non-numeric body: {0}")]
    Malformed(String),
    #[error("quote service did not answer in time")]
    Timeout,
    #[error("quote request was cancelled")]
    Cancelled,
    #[error("{0} must be a finite, non-negative number")]
    InvalidInput(&'static str),
    #[error("no quote service configured")]
    NotConfigured,
}

/// Downstream monthly payment calculator.
#[async_trait]
pub trait QuoteGateway: Send + Sync {
    async fn finance(&self, request: &FinanceQuoteRequest) -> Result<f64, QuoteError>;
    async fn lease(&self, request: &LeaseQuoteRequest) -> Result<f64, QuoteError>;
}

/// HTTP client for the `/calculatefinance/` and `/calculatelease/` endpoints.
#[derive(Debug, Clone)]
pub struct HttpQuoteClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuoteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch<Q: Serialize + Sync>(&self, path: &str, query: &Q) -> Result<f64, QuoteError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(|err| QuoteError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|err| QuoteError::Transport(err.to_string()))?;
        parse_numeric_body(&body)
    }
}

#[async_trait]
impl QuoteGateway for HttpQuoteClient {
    async fn finance(&self, request: &FinanceQuoteRequest) -> Result<f64, QuoteError> {
        self.fetch("/calculatefinance/", request).await
    }

    async fn lease(&self, request: &LeaseQuoteRequest) -> Result<f64, QuoteError> {
        self.fetch("/calculatelease/", request).await
    }
}

/// Accepts a JSON number, a JSON string holding a number, or bare numeric text.
pub fn parse_numeric_body(body: &str) -> Result<f64, QuoteError> {
    let trimmed = body.trim();
    let value = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Number(number)) => number.as_f64(),
        Ok(serde_json::Value::String(text)) => text.trim().parse::<f64>().ok(),
        Ok(_) => None,
        Err(_) => trimmed.parse::<f64>().ok(),
    };

    match value {
        Some(amount) if amount.is_finite() => Ok(amount),
        _ => Err(QuoteError::Malformed(trimmed.chars().take(64).collect())),
    }
}

/// Monthly payment and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    Remote(f64),
    Local { monthly: f64, reason: QuoteError },
}

impl QuoteOutcome {
    pub fn monthly(&self) -> f64 {
        match self {
            QuoteOutcome::Remote(monthly) => *monthly,
            QuoteOutcome::Local { monthly, .. } => *monthly,
        }
    }

    pub fn warning(&self) -> Option<&QuoteError> {
        match self {
            QuoteOutcome::Remote(_) => None,
            QuoteOutcome::Local { reason, .. } => Some(reason),
        }
    }
}

/// Fetches quotes from the downstream service, falling back to local math on
/// any failure.
#[derive(Clone)]
pub struct QuoteService {
    gateway: Option<Arc<dyn QuoteGateway>>,
    lease_terms: LeaseTerms,
    timeout: Duration,
}

impl QuoteService {
    pub fn new(
        gateway: Option<Arc<dyn QuoteGateway>>,
        lease_terms: LeaseTerms,
        timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            lease_terms,
            timeout,
        }
    }

    pub fn offline(lease_terms: LeaseTerms) -> Self {
        Self::new(None, lease_terms, Duration::ZERO)
    }

    pub async fn finance(
        &self,
        request: &FinanceQuoteRequest,
        token: &CancellationToken,
    ) -> QuoteOutcome {
        let local = request.local_monthly();
        let Some(gateway) = self.gateway.as_ref() else {
            return local_outcome(local, QuoteError::NotConfigured);
        };
        self.settle(gateway.finance(request), local, token).await
    }

    pub async fn lease(
        &self,
        request: &LeaseQuoteRequest,
        token: &CancellationToken,
    ) -> QuoteOutcome {
        let local = request.local_monthly(&self.lease_terms);
        let Some(gateway) = self.gateway.as_ref() else {
            return local_outcome(local, QuoteError::NotConfigured);
        };
        self.settle(gateway.lease(request), local, token).await
    }

    async fn settle<F>(&self, call: F, local: f64, token: &CancellationToken) -> QuoteOutcome
    where
        F: std::future::Future<Output = Result<f64, QuoteError>>,
    {
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(QuoteError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, call) => {
                outcome.unwrap_or(Err(QuoteError::Timeout))
            }
        };

        match result {
            Ok(monthly) => QuoteOutcome::Remote(monthly),
            Err(reason) => local_outcome(local, reason),
        }
    }
}

fn local_outcome(monthly: f64, reason: QuoteError) -> QuoteOutcome {
    QuoteOutcome::Local { monthly, reason }
}
