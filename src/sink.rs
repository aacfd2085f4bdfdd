//! Report output sinks.
//!
//! Everything the station says goes through a [`ReportSink`], so hosts decide
//! where lines land and tests capture them in order instead of scraping
//! stdout.

use std::sync::{Mutex, PoisonError};

/// Ordered line output for station reports.
pub trait ReportSink: Send + Sync {
    fn line(&self, line: &str);
}

/// Prints each line to stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn line(&self, line: &str) {
        println!("{line}");
    }
}

/// Collects lines in memory, preserving order.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lines recorded so far, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReportSink for MemorySink {
    fn line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_preserves_order() {
        let sink = MemorySink::new();
        sink.line("first");
        sink.line("second");
        assert_eq!(sink.lines(), vec!["first", "second"]);
    }
}
