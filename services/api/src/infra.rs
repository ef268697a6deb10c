use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use auto_finance::config::AppConfig;
use auto_finance::workflows::advisory::AdvisoryService;
use auto_finance::workflows::financing::{
    FinancingEngine, HttpQuoteClient, LeaseModel, QuoteGateway, QuoteService, VehicleCatalog,
};
use auto_finance::workflows::wizard::WizardStateMachine;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Shared, stateless collaborators built once per process.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) engine: Arc<FinancingEngine>,
    pub(crate) catalog: Arc<VehicleCatalog>,
    pub(crate) advisory: Arc<AdvisoryService>,
}

impl Services {
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        let catalog = Arc::new(VehicleCatalog::standard());
        Self {
            engine: Arc::new(FinancingEngine::standard()),
            advisory: Arc::new(AdvisoryService::from_config(
                &config.advisor,
                Arc::clone(&catalog),
            )),
            catalog,
        }
    }

    pub(crate) fn offline() -> Self {
        let catalog = Arc::new(VehicleCatalog::standard());
        Self {
            engine: Arc::new(FinancingEngine::standard()),
            advisory: Arc::new(AdvisoryService::offline(Arc::clone(&catalog))),
            catalog,
        }
    }

    pub(crate) fn quotes(&self, config: &AppConfig, remote: bool) -> QuoteService {
        let lease_terms = self.engine.config().lease;
        if remote {
            let gateway: Arc<dyn QuoteGateway> =
                Arc::new(HttpQuoteClient::new(config.quotes.base_url.clone()));
            QuoteService::new(Some(gateway), lease_terms, config.quotes.timeout)
        } else {
            QuoteService::offline(lease_terms)
        }
    }

    pub(crate) fn wizard(&self, config: &AppConfig) -> WizardStateMachine {
        WizardStateMachine::new(
            Arc::clone(&self.advisory),
            Arc::clone(&self.engine),
            config.wizard,
            config.environment.transition_policy(),
        )
    }
}

pub(crate) fn parse_lease_model(raw: &str) -> Result<LeaseModel, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "simplified" | "simple" => Ok(LeaseModel::Simplified),
        "detailed" => Ok(LeaseModel::Detailed),
        other => Err(format!(
            "unknown lease model '{other}' (expected simplified or detailed)"
        )),
    }
}

pub(crate) fn format_money(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let (sign, cents) = if cents < 0 { ("-", -cents) } else { ("", cents) };
    let dollars = cents / 100;
    let digits = dollars.to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{:02}", cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_is_grouped_and_rounded() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(419.4679), "$419.47");
        assert_eq!(format_money(37_500.0), "$37,500.00");
        assert_eq!(format_money(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_money(-12.5), "-$12.50");
    }

    #[test]
    fn lease_models_parse_by_name() {
        assert_eq!(parse_lease_model("Detailed"), Ok(LeaseModel::Detailed));
        assert_eq!(parse_lease_model("simple"), Ok(LeaseModel::Simplified));
        assert!(parse_lease_model("balloon").is_err());
    }
}
