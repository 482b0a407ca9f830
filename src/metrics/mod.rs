//! Metrics for the court-rotation service
//!
//! Prometheus counters and gauges describing pairing runs, lifecycle
//! changes and command failures.

pub mod collector;

pub use collector::{CommandMetrics, MetricsCollector, MetricsTimer, PairingMetrics};
