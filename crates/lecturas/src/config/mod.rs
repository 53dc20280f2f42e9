use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::readings::{AnomalyPolicy, UnsupportedWidthPolicy};

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
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub readings: ReadingsConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            readings: ReadingsConfig::from_env()?,
        })
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

/// Thresholds and policies applied by the reading pipeline.
#[derive(Debug, Clone, Default)]
pub struct ReadingsConfig {
    pub anomaly: AnomalyPolicy,
    pub unsupported_width: UnsupportedWidthPolicy,
    /// Optional JSON export of the clave catalog served by the API.
    pub claves_path: Option<PathBuf>,
}

impl ReadingsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = AnomalyPolicy::default();
        let anomaly = AnomalyPolicy {
            rollover_ratio: decimal_var("APP_ANOMALY_ROLLOVER_RATIO", defaults.rollover_ratio)?,
            history_factor: decimal_var("APP_ANOMALY_HISTORY_FACTOR", defaults.history_factor)?,
            floor: decimal_var("APP_ANOMALY_FLOOR", defaults.floor)?,
            fallback_base: decimal_var("APP_ANOMALY_FALLBACK_BASE", defaults.fallback_base)?,
        };

        let unsupported_width = match env::var("APP_UNSUPPORTED_DIGIT_WIDTH") {
            Ok(raw) => UnsupportedWidthPolicy::parse(&raw)
                .ok_or(ConfigError::InvalidWidthPolicy { value: raw })?,
            Err(_) => UnsupportedWidthPolicy::default(),
        };

        let claves_path = env::var("APP_CLAVES_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            anomaly,
            unsupported_width,
            claves_path,
        })
    }
}

fn decimal_var(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or(ConfigError::InvalidDecimal { key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDecimal { key: &'static str, value: String },
    InvalidWidthPolicy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDecimal { key, value } => {
                write!(f, "{key} must be a non-negative number (found '{value}')")
            }
            ConfigError::InvalidWidthPolicy { value } => write!(
                f,
                "APP_UNSUPPORTED_DIGIT_WIDTH must be 'reject' or 'no_offset' (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidDecimal { .. }
            | ConfigError::InvalidWidthPolicy { .. } => None,
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
            "APP_ANOMALY_ROLLOVER_RATIO",
            "APP_ANOMALY_HISTORY_FACTOR",
            "APP_ANOMALY_FLOOR",
            "APP_ANOMALY_FALLBACK_BASE",
            "APP_UNSUPPORTED_DIGIT_WIDTH",
            "APP_CLAVES_PATH",
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
        assert_eq!(config.readings.anomaly, AnomalyPolicy::default());
        assert_eq!(
            config.readings.unsupported_width,
            UnsupportedWidthPolicy::Reject
        );
        assert!(config.readings.claves_path.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_anomaly_overrides_and_width_policy() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ANOMALY_FLOOR", "5000");
        env::set_var("APP_UNSUPPORTED_DIGIT_WIDTH", "no_offset");
        env::set_var("APP_CLAVES_PATH", "/tmp/claves.json");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.readings.anomaly.floor, 5000.0);
        assert_eq!(config.readings.anomaly.history_factor, 3.0);
        assert_eq!(
            config.readings.unsupported_width,
            UnsupportedWidthPolicy::NoOffset
        );
        assert_eq!(
            config.readings.claves_path,
            Some(PathBuf::from("/tmp/claves.json"))
        );
        reset_env();
    }

    #[test]
    fn rejects_negative_thresholds() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ANOMALY_ROLLOVER_RATIO", "-1");
        let err = AppConfig::load().expect_err("negative ratio rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidDecimal {
                key: "APP_ANOMALY_ROLLOVER_RATIO",
                ..
            }
        ));
        reset_env();
    }

    #[test]
    fn rejects_unknown_width_policy() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_UNSUPPORTED_DIGIT_WIDTH", "guess");
        let err = AppConfig::load().expect_err("unknown policy rejected");
        assert!(err.to_string().contains("guess"));
        reset_env();
    }
}
