//! Elapsed-time measurement around a block of async work.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// A value together with how long it took to produce.
///
/// Read-only once computed. Measured with the tokio clock, so paused-clock
/// tests observe virtual time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timed<T> {
    value: T,
    elapsed: Duration,
}

impl<T> Timed<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed seconds at millisecond resolution, as the reports print them.
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_millis() as f64 / 1000.0
    }
}

/// Run `work` and record how long it took.
pub async fn timed<T>(work: impl Future<Output = T>) -> Timed<T> {
    let started = Instant::now();
    let value = work.await;
    Timed {
        value,
        elapsed: started.elapsed(),
    }
}
