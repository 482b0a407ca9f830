//! Metrics collection using Prometheus

use crate::error::PairingError;
use crate::pairing::RunSummary;
use crate::types::MatchState;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Pairing run metrics
    pairing_metrics: PairingMetrics,

    /// Command handling metrics
    command_metrics: CommandMetrics,
}

/// Pairing run metrics
#[derive(Clone)]
pub struct PairingMetrics {
    /// Runs generated, labelled by command (generate or reshuffle)
    pub runs_generated_total: IntCounterVec,

    /// Matches created across all runs
    pub matches_created_total: IntCounter,

    /// Roster sizes seen by successful generations
    pub roster_size: Histogram,

    /// Matches in the current run
    pub current_matches: IntGauge,

    /// Participants in the current rotation queue
    pub queue_length: IntGauge,

    /// Lifecycle transitions, labelled by target state
    pub transitions_total: IntCounterVec,

    /// Serve assignment changes
    pub server_changes_total: IntCounter,

    /// Fixture exports
    pub exports_total: IntCounter,
}

/// Command handling metrics
#[derive(Clone)]
pub struct CommandMetrics {
    /// Rejected commands, labelled by error kind
    pub errors_total: IntCounterVec,

    /// Command handling time, labelled by command
    pub command_duration_seconds: HistogramVec,

    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let pairing_metrics = PairingMetrics::new(&registry)?;
        let command_metrics = CommandMetrics::new(&registry)?;

        Ok(Self {
            registry,
            pairing_metrics,
            command_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn pairing(&self) -> &PairingMetrics {
        &self.pairing_metrics
    }

    pub fn command(&self) -> &CommandMetrics {
        &self.command_metrics
    }

    /// Record a successful generation or reshuffle
    pub fn record_run_generated(&self, reshuffle: bool, roster_size: usize, summary: &RunSummary) {
        let command = if reshuffle { "reshuffle" } else { "generate" };

        self.pairing_metrics
            .runs_generated_total
            .with_label_values(&[command])
            .inc();
        self.pairing_metrics
            .matches_created_total
            .inc_by(summary.matches as u64);
        self.pairing_metrics.roster_size.observe(roster_size as f64);

        self.update_run_gauges(summary);
    }

    /// Refresh gauges describing the current run
    pub fn update_run_gauges(&self, summary: &RunSummary) {
        self.pairing_metrics
            .current_matches
            .set(summary.matches as i64);
        self.pairing_metrics.queue_length.set(summary.queued as i64);
    }

    pub fn record_transition(&self, target: MatchState) {
        self.pairing_metrics
            .transitions_total
            .with_label_values(&[target.as_str()])
            .inc();
    }

    pub fn record_server_change(&self) {
        self.pairing_metrics.server_changes_total.inc();
    }

    pub fn record_export(&self) {
        self.pairing_metrics.exports_total.inc();
    }

    /// Record a rejected command
    pub fn record_error(&self, error: &PairingError) {
        self.command_metrics
            .errors_total
            .with_label_values(&[error.kind()])
            .inc();
    }

    /// Record command handling duration
    pub fn record_command(&self, command: &str, duration: Duration) {
        self.command_metrics
            .command_duration_seconds
            .with_label_values(&[command])
            .observe(duration.as_secs_f64());
    }

    pub fn update_uptime(&self, uptime: Duration) {
        self.command_metrics
            .uptime_seconds
            .set(uptime.as_secs() as i64);
    }

    /// Render all registered metrics in the Prometheus text format
    pub fn gather_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Start a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer {
            start: Instant::now(),
        }
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl PairingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let runs_generated_total = IntCounterVec::new(
            Opts::new(
                "court_rotation_runs_generated_total",
                "Total pairing runs generated",
            ),
            &["command"],
        )?;
        registry.register(Box::new(runs_generated_total.clone()))?;

        let matches_created_total = IntCounter::new(
            "court_rotation_matches_created_total",
            "Total matches created",
        )?;
        registry.register(Box::new(matches_created_total.clone()))?;

        let roster_size = Histogram::with_opts(
            HistogramOpts::new(
                "court_rotation_roster_size",
                "Roster size of successful generations",
            )
            .buckets(vec![2.0, 4.0, 8.0, 12.0, 16.0, 24.0, 32.0, 48.0, 64.0]),
        )?;
        registry.register(Box::new(roster_size.clone()))?;

        let current_matches = IntGauge::new(
            "court_rotation_current_matches",
            "Matches in the current run",
        )?;
        registry.register(Box::new(current_matches.clone()))?;

        let queue_length = IntGauge::new(
            "court_rotation_queue_length",
            "Participants waiting in the rotation queue",
        )?;
        registry.register(Box::new(queue_length.clone()))?;

        let transitions_total = IntCounterVec::new(
            Opts::new(
                "court_rotation_transitions_total",
                "Total match lifecycle transitions",
            ),
            &["state"],
        )?;
        registry.register(Box::new(transitions_total.clone()))?;

        let server_changes_total = IntCounter::new(
            "court_rotation_server_changes_total",
            "Total serve assignment changes",
        )?;
        registry.register(Box::new(server_changes_total.clone()))?;

        let exports_total =
            IntCounter::new("court_rotation_exports_total", "Total fixture exports")?;
        registry.register(Box::new(exports_total.clone()))?;

        Ok(Self {
            runs_generated_total,
            matches_created_total,
            roster_size,
            current_matches,
            queue_length,
            transitions_total,
            server_changes_total,
            exports_total,
        })
    }
}

impl CommandMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let errors_total = IntCounterVec::new(
            Opts::new("court_rotation_errors_total", "Total rejected commands"),
            &["kind"],
        )?;
        registry.register(Box::new(errors_total.clone()))?;

        let command_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "court_rotation_command_duration_seconds",
                "Command handling time in seconds",
            ),
            &["command"],
        )?;
        registry.register(Box::new(command_duration_seconds.clone()))?;

        let uptime_seconds =
            IntGauge::new("court_rotation_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            errors_total,
            command_duration_seconds,
            uptime_seconds,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::current_timestamp;

    fn summary(matches: usize, queued: usize) -> RunSummary {
        RunSummary {
            participants: matches * 2 + queued,
            matches,
            queued,
            byes: 0,
            scheduled: matches,
            in_progress: 0,
            completed: 0,
            generated_at: current_timestamp(),
        }
    }

    #[test]
    fn test_run_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_run_generated(false, 5, &summary(2, 1));
        collector.record_run_generated(true, 5, &summary(2, 1));

        let pairing = collector.pairing();
        assert_eq!(
            pairing
                .runs_generated_total
                .with_label_values(&["generate"])
                .get(),
            1
        );
        assert_eq!(
            pairing
                .runs_generated_total
                .with_label_values(&["reshuffle"])
                .get(),
            1
        );
        assert_eq!(pairing.matches_created_total.get(), 4);
        assert_eq!(pairing.current_matches.get(), 2);
        assert_eq!(pairing.queue_length.get(), 1);
    }

    #[test]
    fn test_error_recording_by_kind() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_error(&PairingError::NoActiveRun);
        collector.record_error(&PairingError::NoActiveRun);
        collector.record_error(&PairingError::InsufficientParticipants { count: 1 });

        let errors = &collector.command().errors_total;
        assert_eq!(errors.with_label_values(&["no_active_run"]).get(), 2);
        assert_eq!(
            errors
                .with_label_values(&["insufficient_participants"])
                .get(),
            1
        );
    }

    #[test]
    fn test_gather_text() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        collector.record_transition(MatchState::InProgress);
        collector.record_export();

        let text = collector.gather_text().unwrap();
        assert!(text.contains("court_rotation_transitions_total"));
        assert!(text.contains("in-progress"));
        assert!(text.contains("court_rotation_exports_total 1"));
    }

    #[test]
    fn test_metrics_timer() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let timer = collector.start_timer();

        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.elapsed();
        assert!(duration >= Duration::from_millis(10));

        collector.record_command("generate", timer.stop());
    }
}
