//! # skycast
//!
//! A structured-concurrency walkthrough built around a toy weather report.
//!
//! Six station operations demonstrate the core patterns of scoped tasks:
//! fire-and-forget spawning, value-returning tasks, nested-scope
//! composition, scope-level fault propagation, task-level fault recovery,
//! and explicit cooperative cancellation. The readings themselves are stubs
//! that wait fixed durations; the only behavior worth watching is the
//! orchestration timing and the error/cancellation semantics.
//!
//! ## Modules
//! - `scope`: the structured-concurrency core ([`Scope`], [`TaskHandle`])
//! - `station`: the walkthrough operations ([`WeatherStation`])
//! - `weather`: stub reading sources
//! - `sink`: report output sinks
//! - `timing`: elapsed-time measurement
//! - `config`: stub timing configuration

pub mod config;
pub mod scope;
pub mod sink;
pub mod station;
pub mod timing;
pub mod weather;

pub use config::Config;
pub use scope::{Scope, TaskError, TaskHandle, TaskId, TaskStatus};
pub use sink::{MemorySink, ReportSink, StdoutSink};
pub use station::WeatherStation;
pub use timing::{timed, Timed};
pub use weather::{ReadingError, StubSource, WeatherSource};
