//! Optional remote enrichment: vehicle suggestions and payment advice.
//!
//! Every call has a deterministic local counterpart with the same output shape.
//! Callers receive an [`Enrichment`] saying which one produced the value and
//! decide themselves whether the fallback is worth logging.

pub mod advice;
pub mod gateway;
pub mod router;
pub mod vehicle_pick;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AdvisorConfig;
use crate::workflows::financing::{ApplicantProfile, VehicleCatalog};

pub use advice::{advice_prompt, heuristic_advice, AdviceRequest, ADVICE_MAX_TOKENS};
pub use gateway::{extract_text, CompletionError, CompletionGateway, HttpCompletionClient};
pub use router::advisory_router;
pub use vehicle_pick::{VehiclePick, HEURISTIC_EXPLANATION, PICK_MAX_TOKENS};

/// Why the local strategy supplied (part of) a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    NotConfigured,
    Failed(CompletionError),
    UnmatchedSelection,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotConfigured => f.write_str("advisory service not configured"),
            FallbackReason::Failed(err) => write!(f, "advisory service failed: {err}"),
            FallbackReason::UnmatchedSelection => {
                f.write_str("advisory suggestion named no catalog vehicle")
            }
        }
    }
}

/// Value produced remotely, or by the heuristic along with the reason.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment<T> {
    Remote(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Enrichment<T> {
    pub fn value(&self) -> &T {
        match self {
            Enrichment::Remote(value) => value,
            Enrichment::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Enrichment::Remote(value) => value,
            Enrichment::Fallback { value, .. } => value,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Enrichment::Remote(_))
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Enrichment::Remote(_) => None,
            Enrichment::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Remote-first advisory calls with transparent heuristic fallback.
#[derive(Clone)]
pub struct AdvisoryService {
    gateway: Option<Arc<dyn CompletionGateway>>,
    catalog: Arc<VehicleCatalog>,
    timeout: Duration,
}

impl AdvisoryService {
    pub fn new(
        gateway: Option<Arc<dyn CompletionGateway>>,
        catalog: Arc<VehicleCatalog>,
        timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            catalog,
            timeout,
        }
    }

    /// Heuristics only; no network access.
    pub fn offline(catalog: Arc<VehicleCatalog>) -> Self {
        Self::new(None, catalog, Duration::ZERO)
    }

    /// Remote strategy only when a credential is configured.
    pub fn from_config(config: &AdvisorConfig, catalog: Arc<VehicleCatalog>) -> Self {
        let gateway = config.api_key.as_ref().map(|key| {
            Arc::new(HttpCompletionClient::new(config.endpoint.clone(), key.clone()))
                as Arc<dyn CompletionGateway>
        });
        Self::new(gateway, catalog, config.timeout)
    }

    pub fn catalog(&self) -> &VehicleCatalog {
        &self.catalog
    }

    pub fn is_remote_enabled(&self) -> bool {
        self.gateway.is_some()
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, FallbackReason> {
        let Some(gateway) = self.gateway.as_ref() else {
            return Err(FallbackReason::NotConfigured);
        };

        match tokio::time::timeout(self.timeout, gateway.complete(prompt, max_tokens)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(FallbackReason::Failed(err)),
            Err(_) => Err(FallbackReason::Failed(CompletionError::Timeout)),
        }
    }

    pub async fn choose(&self, profile: &ApplicantProfile) -> Enrichment<VehiclePick> {
        let prompt = vehicle_pick::pick_prompt(profile, &self.catalog);
        match self.complete(&prompt, PICK_MAX_TOKENS).await {
            Ok(text) => vehicle_pick::resolve_remote(text, profile, &self.catalog),
            Err(reason) => Enrichment::Fallback {
                value: vehicle_pick::heuristic(profile, &self.catalog),
                reason,
            },
        }
    }

    pub async fn advise(&self, request: &AdviceRequest) -> Enrichment<String> {
        let prompt = advice_prompt(request);
        match self.complete(&prompt, ADVICE_MAX_TOKENS).await {
            Ok(text) => Enrichment::Remote(text),
            Err(reason) => Enrichment::Fallback {
                value: heuristic_advice(request),
                reason,
            },
        }
    }
}

impl fmt::Debug for AdvisoryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisoryService")
            .field("remote", &self.gateway.is_some())
            .field("vehicles", &self.catalog.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}
