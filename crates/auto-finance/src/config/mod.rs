use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::wizard::{TransitionPolicy, WizardTiming};

const DEFAULT_ADVISOR_ENDPOINT: &str = "https://api.openai.com/v1/engines/gemini-mini/completions";
const DEFAULT_QUOTE_BASE_URL: &str = "http://localhost:8000";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Out-of-sequence wizard events fail loudly everywhere except production.
    pub fn transition_policy(self) -> TransitionPolicy {
        match self {
            Self::Production => TransitionPolicy::Lenient,
            Self::Development | Self::Test => TransitionPolicy::Strict,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub advisor: AdvisorConfig,
    pub quotes: QuoteConfig,
    pub wizard: WizardTiming,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let api_key = env::var("ADVISOR_API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let endpoint =
            env::var("ADVISOR_ENDPOINT").unwrap_or_else(|_| DEFAULT_ADVISOR_ENDPOINT.to_string());
        let advisor_timeout = millis_var("ADVISOR_TIMEOUT_MS", 8_000)?;

        let quote_base_url =
            env::var("QUOTE_BASE_URL").unwrap_or_else(|_| DEFAULT_QUOTE_BASE_URL.to_string());
        let quote_timeout = millis_var("QUOTE_TIMEOUT_MS", 5_000)?;

        let wizard = WizardTiming {
            profile_delay: millis_var("WIZARD_PROFILE_DELAY_MS", 800)?,
            payment_delay: millis_var("WIZARD_PAYMENT_DELAY_MS", 2_000)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            advisor: AdvisorConfig {
                api_key,
                endpoint,
                timeout: advisor_timeout,
            },
            quotes: QuoteConfig {
                base_url: quote_base_url,
                timeout: quote_timeout,
            },
            wizard,
        })
    }
}

fn millis_var(key: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidDuration { key }),
        Err(_) => Ok(Duration::from_millis(default)),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Remote text-generation service used for vehicle picks and payment advice.
///
/// A missing `api_key` is not an error: the advisory layer silently runs on its
/// local heuristics.
#[derive(Clone)]
pub struct AdvisorConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
}

impl fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Downstream payment quote service.
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDuration { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDuration { key } => {
                write!(f, "{key} must be a whole number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidDuration { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ADVISOR_API_KEY",
            "GEMINI_API_KEY",
            "ADVISOR_ENDPOINT",
            "ADVISOR_TIMEOUT_MS",
            "QUOTE_BASE_URL",
            "QUOTE_TIMEOUT_MS",
            "WIZARD_PROFILE_DELAY_MS",
            "WIZARD_PAYMENT_DELAY_MS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.advisor.api_key.is_none());
        assert_eq!(config.quotes.base_url, "http://localhost:8000");
        assert_eq!(config.wizard.profile_delay, Duration::from_millis(800));
        assert_eq!(config.wizard.payment_delay, Duration::from_millis(2_000));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn legacy_credential_name_enables_remote_advisor() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GEMINI_API_KEY", "secret");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.advisor.api_key.as_deref(), Some("secret"));
        assert!(!format!("{:?}", config.advisor).contains("secret"));
    }

    #[test]
    fn blank_credential_is_treated_as_absent() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADVISOR_API_KEY", "  ");
        let config = AppConfig::load().expect("config loads");
        assert!(config.advisor.api_key.is_none());
    }

    #[test]
    fn rejects_non_numeric_delays() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("WIZARD_PAYMENT_DELAY_MS", "soon");
        match AppConfig::load() {
            Err(ConfigError::InvalidDuration { key }) => {
                assert_eq!(key, "WIZARD_PAYMENT_DELAY_MS")
            }
            other => panic!("expected invalid duration, got {other:?}"),
        }
    }

    #[test]
    fn production_environment_relaxes_transition_policy() {
        assert_eq!(
            AppEnvironment::Production.transition_policy(),
            TransitionPolicy::Lenient
        );
        assert_eq!(
            AppEnvironment::Test.transition_policy(),
            TransitionPolicy::Strict
        );
    }
}
