//! The weather station: six orchestration walkthroughs over stub readings.
//!
//! Each public operation spawns readings inside a [`Scope`], prints through
//! the station's sink, and closes with the measured execution time. Faults
//! are always recovered here; no operation lets one escape to the host.

use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::scope::{Scope, TaskError};
use crate::sink::ReportSink;
use crate::timing::{timed, Timed};
use crate::weather::{ReadingError, StubSource, WeatherSource};

/// Reading used when the temperature task recovers from its own fault.
const TEMPERATURE_FALLBACK: &str = "{ No temperature found }";

/// Orchestrates stub weather readings and reports through a sink.
pub struct WeatherStation {
    config: Config,
    sink: Arc<dyn ReportSink>,
}

impl WeatherStation {
    pub fn new(config: Config, sink: Arc<dyn ReportSink>) -> Self {
        Self { config, sink }
    }

    /// Fire-and-forget: both readings print themselves; the scope holds the
    /// operation open until they are done, so the waits overlap.
    pub async fn broadcast_readings(&self) {
        let run = timed(async {
            self.print("step1");
            let source = self.reliable_source();
            let mut scope: Scope<ReadingError> = Scope::new();
            {
                let source = Arc::clone(&source);
                let sink = Arc::clone(&self.sink);
                scope.spawn(async move {
                    let reading = source.forecast().await?;
                    sink.line(&reading);
                    Ok(())
                });
            }
            {
                let source = Arc::clone(&source);
                let sink = Arc::clone(&self.sink);
                scope.spawn(async move {
                    let reading = source.temperature().await?;
                    sink.line(&reading);
                    Ok(())
                });
            }
            self.print("step2");
            if let Err(fault) = scope.join().await {
                warn!(%fault, "background reading failed");
            }
        })
        .await;
        self.print_elapsed(&run);
    }

    /// Spawn both readings, then await the results in order. `step2` prints
    /// before either result is known.
    pub async fn report_inline(&self) {
        let run = timed(async {
            self.print("step1");
            let source = self.reliable_source();
            let mut scope = Scope::new();
            let forecast = {
                let source = Arc::clone(&source);
                scope.spawn(async move { source.forecast().await })
            };
            let temperature = {
                let source = Arc::clone(&source);
                scope.spawn(async move { source.temperature().await })
            };
            self.print("step2");
            let outcome = scope
                .complete(async move {
                    Ok(format!(
                        "{}, {}",
                        forecast.join().await?,
                        temperature.join().await?
                    ))
                })
                .await;
            match outcome {
                Ok(report) => self.print(&report),
                Err(fault) => self.report_unavailable(&fault),
            }
            self.print("step3");
        })
        .await;
        self.print_elapsed(&run);
    }

    /// Compose the report through the nested-scope helper, which behaves
    /// like a single synchronous call.
    pub async fn report_composed(&self) {
        let run = timed(async {
            self.print("step1");
            let source = self.reliable_source();
            match self.assemble_report(&source).await {
                Ok(report) => self.print(&report),
                Err(fault) => self.report_unavailable(&fault),
            }
            self.print("step2");
        })
        .await;
        self.print_elapsed(&run);
    }

    /// Same composition over a faulty source: the temperature fault cancels
    /// the forecast sibling and is caught here at the top level.
    pub async fn report_with_fallback(&self) {
        let run = timed(async {
            let source = self.faulty_source();
            match self.assemble_report(&source).await {
                Ok(report) => self.print(&report),
                Err(TaskError::Failed(fault)) => {
                    self.print(&format!("Caught exception {fault}"));
                    self.print("Report unavailable at this time");
                }
                Err(TaskError::Cancelled) => {
                    warn!("report scope cancelled without a fault");
                    self.print("Report unavailable at this time");
                }
            }
        })
        .await;
        self.print_elapsed(&run);
    }

    /// The temperature task recovers from its own fault with a fallback
    /// value, so the forecast sibling keeps running.
    pub async fn report_with_partial_data(&self) {
        let run = timed(async {
            let source = self.faulty_source();
            let mut scope = Scope::new();
            let forecast = {
                let source = Arc::clone(&source);
                scope.spawn(async move { source.forecast().await })
            };
            let temperature = {
                let source = Arc::clone(&source);
                let sink = Arc::clone(&self.sink);
                scope.spawn(async move {
                    match source.temperature().await {
                        Ok(reading) => Ok(reading),
                        Err(fault) => {
                            sink.line(&format!("Caught exception {fault}"));
                            Ok(TEMPERATURE_FALLBACK.to_string())
                        }
                    }
                })
            };
            let outcome = scope
                .complete(async move {
                    Ok(format!(
                        "{}, {}",
                        forecast.join().await?,
                        temperature.join().await?
                    ))
                })
                .await;
            match outcome {
                Ok(report) => self.print(&report),
                Err(fault) => self.report_unavailable(&fault),
            }
        })
        .await;
        self.print_elapsed(&run);
    }

    /// Cancel the temperature reading partway through and report the
    /// forecast alone.
    pub async fn report_latest_available(&self) {
        let run = timed(async {
            self.print("step1");
            let source = self.reliable_source();
            let cancel_delay = self.config.cancel_delay;
            let mut scope = Scope::new();
            let forecast = {
                let source = Arc::clone(&source);
                scope.spawn(async move { source.forecast().await })
            };
            let temperature = {
                let source = Arc::clone(&source);
                scope.spawn(async move { source.temperature().await })
            };
            let outcome = scope
                .complete(async move {
                    tokio::time::sleep(cancel_delay).await;
                    temperature.cancel();
                    forecast.join().await
                })
                .await;
            match outcome {
                Ok(report) => self.print(&report),
                Err(fault) => self.report_unavailable(&fault),
            }
            self.print("step2");
        })
        .await;
        self.print_elapsed(&run);
    }

    /// Fetch both readings concurrently inside a nested scope and combine
    /// them. Does not return until both readings are finished.
    async fn assemble_report(
        &self,
        source: &Arc<dyn WeatherSource>,
    ) -> Result<String, TaskError<ReadingError>> {
        let mut scope = Scope::new();
        let forecast = {
            let source = Arc::clone(source);
            scope.spawn(async move { source.forecast().await })
        };
        let temperature = {
            let source = Arc::clone(source);
            scope.spawn(async move { source.temperature().await })
        };
        scope
            .complete(async move {
                Ok(format!(
                    "{}, {}",
                    forecast.join().await?,
                    temperature.join().await?
                ))
            })
            .await
    }

    fn reliable_source(&self) -> Arc<dyn WeatherSource> {
        Arc::new(StubSource::reliable(
            self.config.forecast_delay,
            self.config.temperature_delay,
        ))
    }

    fn faulty_source(&self) -> Arc<dyn WeatherSource> {
        Arc::new(StubSource::faulty(
            self.config.forecast_delay,
            self.config.fault_delay,
        ))
    }

    fn print(&self, line: &str) {
        self.sink.line(line);
    }

    fn print_elapsed(&self, run: &Timed<()>) {
        self.print(&format!("Execution time: {:.3} seconds", run.seconds()));
    }

    fn report_unavailable(&self, fault: &dyn std::fmt::Display) {
        self.print(&format!("Caught exception {fault}"));
        self.print("Report unavailable at this time");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use crate::sink::MemorySink;

    use super::*;

    fn station() -> (WeatherStation, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let station = WeatherStation::new(Config::default(), sink.clone());
        (station, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn broadcast_overlaps_the_waits() {
        let (station, sink) = station();
        let started = Instant::now();
        station.broadcast_readings().await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(
            elapsed < Duration::from_millis(1800),
            "waits did not overlap: {elapsed:?}"
        );
        let lines = sink.lines();
        assert_eq!(&lines[..2], &["step1", "step2"]);
        assert!(lines[2..4].contains(&"Sunny".to_string()));
        assert!(lines[2..4].contains(&"30°C".to_string()));
        assert!(lines[4].starts_with("Execution time: "));
    }

    #[tokio::test(start_paused = true)]
    async fn inline_report_prints_in_documented_order() {
        let (station, sink) = station();
        let started = Instant::now();
        station.report_inline().await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1800));
        let lines = sink.lines();
        assert_eq!(&lines[..4], &["step1", "step2", "Sunny, 30°C", "step3"]);
        assert!(lines[4].starts_with("Execution time: "));
    }

    #[tokio::test(start_paused = true)]
    async fn composed_report_reads_like_one_call() {
        let (station, sink) = station();
        let started = Instant::now();
        station.report_composed().await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1800));
        assert_eq!(&sink.lines()[..3], &["step1", "Sunny, 30°C", "step2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_after_scope_level_fault() {
        let (station, sink) = station();
        let started = Instant::now();
        station.report_with_fallback().await;
        let elapsed = started.elapsed();
        // the forecast sibling is cancelled, so the fault delay dominates
        assert!(elapsed >= Duration::from_millis(500));
        assert!(
            elapsed < Duration::from_millis(1000),
            "sibling kept running: {elapsed:?}"
        );
        let lines = sink.lines();
        assert_eq!(
            lines[0],
            "Caught exception invalid reading: Temperature is invalid"
        );
        assert_eq!(lines[1], "Report unavailable at this time");
    }

    #[tokio::test(start_paused = true)]
    async fn partial_data_keeps_the_forecast() {
        let (station, sink) = station();
        let started = Instant::now();
        station.report_with_partial_data().await;
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(1000),
            "forecast was cancelled: {elapsed:?}"
        );
        assert!(elapsed < Duration::from_millis(1500));
        let lines = sink.lines();
        assert_eq!(
            lines[0],
            "Caught exception invalid reading: Temperature is invalid"
        );
        assert_eq!(lines[1], "Sunny, { No temperature found }");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_reports_forecast_alone() {
        let (station, sink) = station();
        let started = Instant::now();
        station.report_latest_available().await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(
            elapsed < Duration::from_millis(1500),
            "cancelled reading still held the scope: {elapsed:?}"
        );
        assert_eq!(&sink.lines()[..3], &["step1", "Sunny", "step2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn timing_line_reports_seconds() {
        let (station, sink) = station();
        station.report_inline().await;
        let lines = sink.lines();
        let timing = lines.last().expect("timing line");
        assert_eq!(timing, "Execution time: 1.000 seconds");
    }
}
