use std::env;
use std::time::Duration;

use crate::ws::PageLocation;

#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the page serving the inverter web GUI; the stream endpoint
    /// is derived from it.
    pub page: PageLocation,
    pub backoff: BackoffConfig,
    /// Upper bound on a single connect attempt, handshake included.
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    pub min: Duration,
    pub max: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(1000),
            max: Duration::from_millis(30000),
        }
    }
}

fn env_required(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("{key} environment variable is required"))
}

fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    parse_or_default(key, env::var(key).ok(), default)
}

/// Unset or empty falls back to `default`; anything else must parse.
fn parse_or_default<T: std::str::FromStr>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, String> {
    match raw.filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| format!("{key} has an invalid value '{v}'")),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let page_url = env_required("INVERTER_GUI_URL")?;
        let page = PageLocation::parse(&page_url)
            .map_err(|e| format!("INVERTER_GUI_URL is invalid: {e}"))?;

        let config = Self {
            page,
            backoff: BackoffConfig {
                min: Duration::from_millis(env_or_default("BACKOFF_MIN_MS", 1000)?),
                max: Duration::from_millis(env_or_default("BACKOFF_MAX_MS", 30000)?),
            },
            connect_timeout: Duration::from_millis(env_or_default("CONNECT_TIMEOUT_MS", 10000)?),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.backoff.min.is_zero() {
            return Err("BACKOFF_MIN_MS must be > 0".into());
        }
        if self.backoff.max < self.backoff.min {
            return Err("BACKOFF_MAX_MS must be >= BACKOFF_MIN_MS".into());
        }
        if self.connect_timeout.is_zero() {
            return Err("CONNECT_TIMEOUT_MS must be > 0".into());
        }
        Ok(())
    }
}
