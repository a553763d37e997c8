//! Environment-driven configuration
//!
//! Values are read from the process environment after `.env` has been loaded
//! by the binary. Every setting has a default so the server starts with no
//! configuration at all.

use crate::models::ScanLabel;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CHART_BASE_URL: &str = "https://www.marketinout.com/chart/servlet.php";
pub const DEFAULT_ACCESS_PIN: &str = "1234";
pub const DEFAULT_OUTPUT_DIR: &str = "charts_download";
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SCANS: &[&str] = &["bct4", "ep9"];
pub const DEFAULT_JOB_TTL_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Current deployment environment (`APP_ENV`), defaults to `sandbox`
pub fn get_environment() -> String {
    env::var("APP_ENV")
        .ok()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "sandbox".to_string())
}

/// Application configuration shared by the server and the CLI
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub access_pin: String,
    pub chart_base_url: String,
    pub output_dir: PathBuf,
    pub request_delay: Duration,
    pub scans: Vec<String>,
    /// How long a finished web job and its PDF are kept
    pub job_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            access_pin: DEFAULT_ACCESS_PIN.to_string(),
            chart_base_url: DEFAULT_CHART_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            scans: DEFAULT_SCANS.iter().map(|s| s.to_string()).collect(),
            job_ttl: Duration::from_secs(DEFAULT_JOB_TTL_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => defaults.port,
        };

        let request_delay = match get("REQUEST_DELAY_MS") {
            Some(raw) => Duration::from_millis(parse_number("REQUEST_DELAY_MS", &raw)?),
            None => defaults.request_delay,
        };

        let scans = match get("SCANS") {
            Some(raw) => {
                let scans: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if scans.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        key: "SCANS",
                        value: raw,
                        reason: "no scan labels".to_string(),
                    });
                }
                // Labels end up in PDF file names
                for scan in &scans {
                    if let Err(e) = ScanLabel::parse(scan) {
                        return Err(ConfigError::InvalidValue {
                            key: "SCANS",
                            value: raw,
                            reason: e.to_string(),
                        });
                    }
                }
                scans
            }
            None => defaults.scans,
        };

        let job_ttl = match get("JOB_TTL_SECS") {
            Some(raw) => Duration::from_secs(parse_number("JOB_TTL_SECS", &raw)?),
            None => defaults.job_ttl,
        };

        Ok(Self {
            port,
            access_pin: get("ACCESS_PIN").unwrap_or(defaults.access_pin),
            chart_base_url: get("CHART_BASE_URL").unwrap_or(defaults.chart_base_url),
            output_dir: get("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            request_delay,
            scans,
            job_ttl,
        })
    }

    pub fn is_known_scan(&self, scan: &str) -> bool {
        self.scans.iter().any(|s| s == scan)
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
