use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub mod endpoints;
pub mod profile;

pub use endpoints::{with_id, EndpointConfig};
pub use profile::{test_plan, LoadProfile, Stage, ThresholdRule};

use shared_models::LoadTestError;

/// Range of the simulated pause a healthcare professional spends inside a
/// consultation before ending it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsultationPause {
    pub min: Duration,
    pub max: Duration,
}

#[derive(Debug, Clone)]
pub struct LoadTestConfig {
    pub base_url: String,
    pub profile: LoadProfile,
    pub patient_count: usize,
    pub healthcare_count: usize,
    pub admin_email: String,
    pub admin_password: String,
    pub request_timeout: Duration,
    pub think_time: Duration,
    pub consultation_pause: ConsultationPause,
    pub graceful_stop: Duration,
    pub results_dir: PathBuf,
    pub endpoints: EndpointConfig,
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

impl LoadTestConfig {
    pub fn from_env() -> Result<Self, LoadTestError> {
        let profile = match env::var("LOAD_PROFILE") {
            Ok(raw) => raw.parse()?,
            Err(_) => {
                warn!("LOAD_PROFILE not set, using smoke profile");
                LoadProfile::Smoke
            }
        };

        let endpoints = match env::var("ENDPOINTS_FILE") {
            Ok(path) => Self::load_endpoints(&path)?,
            Err(_) => EndpointConfig::default(),
        };

        let config = Self {
            base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("BASE_URL not set, using default");
                    "http://localhost:3000".to_string()
                }),
            profile,
            patient_count: env_or::<i64>("PATIENT_COUNT", 100).max(0) as usize,
            healthcare_count: env_or::<i64>("HEALTHCARE_COUNT", 20).max(0) as usize,
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_EMAIL not set, using default admin account");
                    "admin@loadtest.local".to_string()
                }),
            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_PASSWORD not set, using default admin password");
                    "Admin123!".to_string()
                }),
            request_timeout: Duration::from_secs(env_or("REQUEST_TIMEOUT_SECS", 30)),
            think_time: Duration::from_millis(env_or("THINK_TIME_MS", 1000)),
            consultation_pause: ConsultationPause {
                min: Duration::from_secs(env_or("CONSULTATION_PAUSE_MIN_SECS", 5)),
                max: Duration::from_secs(env_or("CONSULTATION_PAUSE_MAX_SECS", 15)),
            },
            graceful_stop: Duration::from_secs(env_or("GRACEFUL_STOP_SECS", 30)),
            results_dir: PathBuf::from(env::var("RESULTS_DIR").unwrap_or_else(|_| "results".to_string())),
            endpoints,
        };

        config.validate()?;

        if !config.is_configured() {
            warn!("Load test not fully configured - BASE_URL is not an http(s) URL");
        }

        Ok(config)
    }

    pub fn load_endpoints(path: &str) -> Result<EndpointConfig, LoadTestError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LoadTestError::Config(format!("cannot read ENDPOINTS_FILE {}: {}", path, e)))?;
        let endpoints = serde_json::from_str(&raw)?;
        Ok(endpoints)
    }

    pub fn validate(&self) -> Result<(), LoadTestError> {
        if self.consultation_pause.min > self.consultation_pause.max {
            return Err(LoadTestError::Config(format!(
                "consultation pause min {:?} exceeds max {:?}",
                self.consultation_pause.min, self.consultation_pause.max
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(LoadTestError::Config("REQUEST_TIMEOUT_SECS must be positive".to_string()));
        }
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.starts_with("http://") || self.base_url.starts_with("https://")
    }
}
