//! Weather reading stubs.
//!
//! The readings simulate I/O with fixed-duration waits; no real sensor or
//! network access happens here.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

/// Fixed forecast reading.
pub const FORECAST: &str = "Sunny";
/// Fixed temperature reading.
pub const TEMPERATURE: &str = "30°C";

/// A reading that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadingError {
    #[error("invalid reading: {0}")]
    Invalid(String),
}

/// Source of forecast and temperature readings.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn forecast(&self) -> Result<String, ReadingError>;
    async fn temperature(&self) -> Result<String, ReadingError>;
}

/// Stub source that waits a fixed duration per reading.
#[derive(Debug, Clone)]
pub struct StubSource {
    forecast_delay: Duration,
    temperature_delay: Duration,
    fail_temperature: bool,
}

impl StubSource {
    /// Source whose readings both succeed.
    pub fn reliable(forecast_delay: Duration, temperature_delay: Duration) -> Self {
        Self {
            forecast_delay,
            temperature_delay,
            fail_temperature: false,
        }
    }

    /// Source whose temperature reading raises after `fault_delay`.
    pub fn faulty(forecast_delay: Duration, fault_delay: Duration) -> Self {
        Self {
            forecast_delay,
            temperature_delay: fault_delay,
            fail_temperature: true,
        }
    }
}

#[async_trait]
impl WeatherSource for StubSource {
    async fn forecast(&self) -> Result<String, ReadingError> {
        sleep(self.forecast_delay).await;
        Ok(FORECAST.to_string())
    }

    async fn temperature(&self) -> Result<String, ReadingError> {
        sleep(self.temperature_delay).await;
        if self.fail_temperature {
            return Err(ReadingError::Invalid("Temperature is invalid".to_string()));
        }
        Ok(TEMPERATURE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn reliable_source_reports_fixed_values() {
        let source = StubSource::reliable(Duration::from_millis(40), Duration::from_millis(60));
        let started = Instant::now();
        assert_eq!(source.forecast().await.as_deref(), Ok(FORECAST));
        assert_eq!(source.temperature().await.as_deref(), Ok(TEMPERATURE));
        // sequential awaits here, so the delays add up
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn faulty_source_raises_after_its_delay() {
        let source = StubSource::faulty(Duration::from_millis(100), Duration::from_millis(30));
        let started = Instant::now();
        let fault = source.temperature().await.unwrap_err();
        assert_eq!(fault, ReadingError::Invalid("Temperature is invalid".to_string()));
        assert_eq!(fault.to_string(), "invalid reading: Temperature is invalid");
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(30));
        assert!(elapsed < Duration::from_millis(100));
    }
}
