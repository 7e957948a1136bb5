use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::certificates::domain::{TestOutcome, VehicleType};

/// Watermark printed on every certificate produced outside production.
pub const NON_PRODUCTION_WATERMARK: &str = "NOT VALID";

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

    /// Certificates are only unmarked when issued by the production service.
    pub fn watermark(self) -> &'static str {
        match self {
            Self::Production => "",
            Self::Development | Self::Test => NON_PRODUCTION_WATERMARK,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub certificates: CertificateConfig,
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

        let welsh_fetch_attempts = env::var("CERT_WELSH_FETCH_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u8>()
            .ok()
            .filter(|attempts| *attempts > 0)
            .ok_or(ConfigError::InvalidWelshAttempts)?;

        let welsh_vehicle_types = match env::var("CERT_WELSH_VEHICLE_TYPES") {
            Ok(raw) => parse_vehicle_types(&raw)?,
            Err(_) => CertificateConfig::default().welsh.vehicle_types,
        };

        let fixtures_path = env::var("CERT_FIXTURES_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let certificates = CertificateConfig {
            watermark: environment.watermark().to_string(),
            welsh_fetch_attempts,
            welsh: WelshPolicy {
                vehicle_types: welsh_vehicle_types,
                ..WelshPolicy::default()
            },
            fixtures_path,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            certificates,
        })
    }
}

fn parse_vehicle_types(raw: &str) -> Result<Vec<VehicleType>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<VehicleType>()
                .map_err(|_| ConfigError::InvalidVehicleType(value.to_string()))
        })
        .collect()
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

/// Settings consumed by payload generation.
#[derive(Debug, Clone)]
pub struct CertificateConfig {
    pub watermark: String,
    /// Attempts made against the translation service before Welsh output is dropped.
    pub welsh_fetch_attempts: u8,
    pub welsh: WelshPolicy,
    /// JSON fixture file backing the local lookup adapter.
    pub fixtures_path: Option<PathBuf>,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            watermark: NON_PRODUCTION_WATERMARK.to_string(),
            welsh_fetch_attempts: 3,
            welsh: WelshPolicy::default(),
            fixtures_path: None,
        }
    }
}

/// Vehicle type and outcome combinations that have bilingual templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelshPolicy {
    pub vehicle_types: Vec<VehicleType>,
    pub outcomes: Vec<TestOutcome>,
}

impl WelshPolicy {
    pub fn allows(&self, vehicle_type: VehicleType, outcome: TestOutcome) -> bool {
        self.vehicle_types.contains(&vehicle_type) && self.outcomes.contains(&outcome)
    }
}

impl Default for WelshPolicy {
    fn default() -> Self {
        Self {
            vehicle_types: vec![VehicleType::Hgv, VehicleType::Trl],
            outcomes: vec![TestOutcome::Pass, TestOutcome::Fail, TestOutcome::Prs],
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWelshAttempts,
    InvalidVehicleType(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWelshAttempts => {
                write!(f, "CERT_WELSH_FETCH_ATTEMPTS must be a positive integer")
            }
            ConfigError::InvalidVehicleType(value) => write!(
                f,
                "CERT_WELSH_VEHICLE_TYPES contains unknown vehicle type '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidWelshAttempts
            | ConfigError::InvalidVehicleType(_) => None,
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("CERT_WELSH_FETCH_ATTEMPTS");
        env::remove_var("CERT_WELSH_VEHICLE_TYPES");
        env::remove_var("CERT_FIXTURES_PATH");
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
        assert_eq!(config.certificates.watermark, NON_PRODUCTION_WATERMARK);
        assert_eq!(config.certificates.welsh_fetch_attempts, 3);
        assert_eq!(config.certificates.welsh, WelshPolicy::default());
        assert!(config.certificates.fixtures_path.is_none());
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
    fn production_certificates_carry_no_watermark() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.certificates.watermark, "");
    }

    #[test]
    fn welsh_vehicle_types_are_parsed_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CERT_WELSH_VEHICLE_TYPES", "psv, hgv");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.certificates.welsh.vehicle_types,
            vec![VehicleType::Psv, VehicleType::Hgv]
        );

        env::set_var("CERT_WELSH_VEHICLE_TYPES", "car");
        let err = AppConfig::load().expect_err("unknown vehicle type rejected");
        assert!(matches!(err, ConfigError::InvalidVehicleType(value) if value == "car"));
    }

    #[test]
    fn zero_welsh_attempts_are_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CERT_WELSH_FETCH_ATTEMPTS", "0");
        let err = AppConfig::load().expect_err("zero attempts rejected");
        assert!(matches!(err, ConfigError::InvalidWelshAttempts));
    }
}
