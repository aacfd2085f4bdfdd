//! Configuration for the stub timings.
//!
//! All values come from environment variables, with defaults matching the
//! walkthrough's fixed durations:
//! - `FORECAST_DELAY_MS` - Optional. Wait before the forecast reading resolves. Defaults to `1000`.
//! - `TEMPERATURE_DELAY_MS` - Optional. Wait before the temperature reading resolves. Defaults to `1000`.
//! - `FAULT_DELAY_MS` - Optional. Wait before the faulty temperature reading raises. Defaults to `500`.
//! - `CANCEL_DELAY_MS` - Optional. Wait before the cancellation walkthrough cancels the temperature task. Defaults to `500`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Stub timing configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Wait before the forecast reading resolves
    pub forecast_delay: Duration,

    /// Wait before the temperature reading resolves
    pub temperature_delay: Duration,

    /// Wait before the faulty temperature reading raises
    pub fault_delay: Duration,

    /// Wait before the cancellation walkthrough cancels the temperature task
    pub cancel_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            forecast_delay: Duration::from_millis(1000),
            temperature_delay: Duration::from_millis(1000),
            fault_delay: Duration::from_millis(500),
            cancel_delay: Duration::from_millis(500),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a delay variable is set but is
    /// not a whole number of milliseconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();
        Ok(Self {
            forecast_delay: env_delay("FORECAST_DELAY_MS", defaults.forecast_delay)?,
            temperature_delay: env_delay("TEMPERATURE_DELAY_MS", defaults.temperature_delay)?,
            fault_delay: env_delay("FAULT_DELAY_MS", defaults.fault_delay)?,
            cancel_delay: env_delay("CANCEL_DELAY_MS", defaults.cancel_delay)?,
        })
    }
}

fn env_delay(name: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => parse_millis(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_millis(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_walkthrough_timings() {
        let config = Config::default();
        assert_eq!(config.forecast_delay, Duration::from_millis(1000));
        assert_eq!(config.temperature_delay, Duration::from_millis(1000));
        assert_eq!(config.fault_delay, Duration::from_millis(500));
        assert_eq!(config.cancel_delay, Duration::from_millis(500));
    }

    #[test]
    fn parse_millis_accepts_whole_milliseconds() {
        let parsed = parse_millis("FORECAST_DELAY_MS", "250").unwrap();
        assert_eq!(parsed, Duration::from_millis(250));
    }

    #[test]
    fn parse_millis_rejects_non_numeric_values() {
        assert!(parse_millis("FORECAST_DELAY_MS", "fast").is_err());
    }
}
