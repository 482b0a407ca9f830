//! Application state and command handling
//!
//! `AppState` owns the single pairing scheduler behind one mutex, so every
//! command for the run is serialized. Callers only ever receive cloned
//! snapshots of the run.

use crate::config::AppConfig;
use crate::error::{PairingError, PairingResult, Result};
use crate::events::{EventPublisher, LoggingEventPublisher};
use crate::metrics::MetricsCollector;
use crate::pairing::{
    Match, PairingRun, PairingScheduler, RosterProvider, RunSummary, StaticRosterProvider,
};
use crate::types::{
    FixturesExported, MatchId, MatchState, MatchStatusChanged, Participant, RunGenerated,
    ServerAssigned, ServerSlot,
};
use crate::utils::{current_timestamp, fixtures_filename};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// A rendered fixtures table with its suggested download name
#[derive(Debug, Clone)]
pub struct ExportedFixtures {
    pub filename: String,
    pub csv: String,
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// The scheduler and its current run
    scheduler: Mutex<PairingScheduler>,

    /// Source of roster snapshots for commands that carry none
    roster_provider: Arc<dyn RosterProvider>,

    /// Publisher for command notifications
    event_publisher: Arc<dyn EventPublisher>,

    /// Metrics collector for recording command outcomes
    metrics: Arc<MetricsCollector>,

    started_at: Instant,
}

impl AppState {
    /// Initialize the application from configuration
    pub fn new(config: AppConfig) -> std::result::Result<Self, ServiceError> {
        info!("Initializing court-rotation service");
        info!(
            "Configuration: service={}, odd_participant_policy={}, seeded={}",
            config.service.name,
            config.pairing.odd_participant_policy,
            config.pairing.rng_seed.is_some()
        );

        let roster_provider: Arc<dyn RosterProvider> = match &config.pairing.roster_path {
            Some(path) => Arc::new(StaticRosterProvider::from_file(path).map_err(|e| {
                ServiceError::Configuration {
                    message: format!("{:#}", e),
                }
            })?),
            None => {
                warn!("No roster file configured; commands must carry their own roster");
                Arc::new(StaticRosterProvider::default())
            }
        };

        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        let scheduler = match config.pairing.rng_seed {
            Some(seed) => PairingScheduler::with_seed(config.scheduler_config(), seed),
            None => PairingScheduler::new(config.scheduler_config()),
        };

        Ok(Self::with_components(
            config,
            scheduler,
            roster_provider,
            Arc::new(LoggingEventPublisher::new()),
            metrics,
        ))
    }

    /// Assemble the application from explicit components
    pub fn with_components(
        config: AppConfig,
        scheduler: PairingScheduler,
        roster_provider: Arc<dyn RosterProvider>,
        event_publisher: Arc<dyn EventPublisher>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            config,
            scheduler: Mutex::new(scheduler),
            roster_provider,
            event_publisher,
            metrics,
            started_at: Instant::now(),
        }
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Whether the scheduler is currently free to accept a command
    pub fn scheduler_available(&self) -> bool {
        self.scheduler.try_lock().is_ok()
    }

    /// Pair a roster into a fresh run
    ///
    /// Without an explicit roster the provider's snapshot is used.
    pub async fn generate(&self, roster: Option<Vec<Participant>>) -> Result<PairingRun> {
        self.pair(roster, false).await
    }

    /// Replace the current run with a new random pairing
    pub async fn reshuffle(&self, roster: Option<Vec<Participant>>) -> Result<PairingRun> {
        self.pair(roster, true).await
    }

    pub async fn set_server(&self, match_id: MatchId, slot: ServerSlot) -> Result<Match> {
        let timer = self.metrics.start_timer();
        let result = {
            let mut scheduler = self.scheduler.lock().await;
            scheduler.set_server(match_id, slot).cloned()
        };
        self.metrics.record_command("set_server", timer.stop());

        let updated = self.track(result)?;
        self.after_server_change(&updated).await;
        Ok(updated)
    }

    pub async fn swap_server(&self, match_id: MatchId) -> Result<Match> {
        let timer = self.metrics.start_timer();
        let result = {
            let mut scheduler = self.scheduler.lock().await;
            scheduler.swap_server(match_id).cloned()
        };
        self.metrics.record_command("swap_server", timer.stop());

        let updated = self.track(result)?;
        self.after_server_change(&updated).await;
        Ok(updated)
    }

    /// Move a match one step along its lifecycle
    pub async fn transition(&self, match_id: MatchId, target: MatchState) -> Result<Match> {
        let timer = self.metrics.start_timer();
        let result = {
            let mut scheduler = self.scheduler.lock().await;
            scheduler.transition(match_id, target).and_then(|previous| {
                let updated = scheduler
                    .current_run()
                    .and_then(|run| run.find_match(match_id))
                    .cloned()
                    .ok_or(PairingError::NoActiveRun)?;
                let summary = scheduler.summary()?;
                Ok((previous, updated, summary))
            })
        };
        self.metrics.record_command("transition", timer.stop());

        let (previous, updated, summary) = self.track(result)?;
        self.metrics.record_transition(target);
        self.metrics.update_run_gauges(&summary);

        let event = MatchStatusChanged {
            match_id,
            court_number: updated.court_number(),
            from: previous,
            to: target,
            timestamp: current_timestamp(),
        };
        if let Err(e) = self.event_publisher.publish_match_status_changed(event).await {
            warn!("Failed to publish MatchStatusChanged event: {}", e);
        }

        Ok(updated)
    }

    /// Render the current run as a downloadable CSV table
    pub async fn export_fixtures(&self) -> Result<ExportedFixtures> {
        let timer = self.metrics.start_timer();
        let result = {
            let scheduler = self.scheduler.lock().await;
            scheduler.export_run().and_then(|csv| {
                let rows = scheduler.summary()?.matches;
                Ok((csv, rows))
            })
        };
        self.metrics.record_command("export", timer.stop());

        let (csv, rows) = self.track(result)?;
        let filename = fixtures_filename(current_timestamp().date_naive());
        self.metrics.record_export();

        let event = FixturesExported {
            filename: filename.clone(),
            rows,
            timestamp: current_timestamp(),
        };
        if let Err(e) = self.event_publisher.publish_fixtures_exported(event).await {
            warn!("Failed to publish FixturesExported event: {}", e);
        }

        Ok(ExportedFixtures { filename, csv })
    }

    /// Snapshot of the current run
    pub async fn current_run(&self) -> Result<PairingRun> {
        let result = {
            let scheduler = self.scheduler.lock().await;
            scheduler
                .current_run()
                .cloned()
                .ok_or(PairingError::NoActiveRun)
        };
        self.track(result)
    }

    pub async fn summary(&self) -> Result<RunSummary> {
        let result = self.scheduler.lock().await.summary();
        self.track(result)
    }

    /// Summary if a run exists, without counting a missing run as an error
    pub async fn try_summary(&self) -> Option<RunSummary> {
        self.scheduler.lock().await.summary().ok()
    }

    async fn pair(&self, roster: Option<Vec<Participant>>, reshuffle: bool) -> Result<PairingRun> {
        let command = if reshuffle { "reshuffle" } else { "generate" };
        let timer = self.metrics.start_timer();

        let roster = match roster {
            Some(roster) => roster,
            None => {
                debug!("No roster supplied, taking snapshot from provider");
                self.roster_provider.snapshot()?
            }
        };

        info!(
            "Processing {} request - participants: {}",
            command,
            roster.len()
        );

        let result = {
            let mut scheduler = self.scheduler.lock().await;
            if reshuffle {
                scheduler.reshuffle(&roster).cloned()
            } else {
                scheduler.generate(&roster).cloned()
            }
        };
        self.metrics.record_command(command, timer.stop());

        let run = self.track(result)?;
        let summary = run.summary();
        self.metrics
            .record_run_generated(reshuffle, roster.len(), &summary);

        let event = RunGenerated {
            reshuffle,
            participants: roster.len(),
            matches: summary.matches,
            queued: summary.queued,
            bye: run.bye().map(|p| p.id.clone()),
            timestamp: current_timestamp(),
        };
        if let Err(e) = self.event_publisher.publish_run_generated(event).await {
            warn!("Failed to publish RunGenerated event: {}", e);
        }

        Ok(run)
    }

    async fn after_server_change(&self, updated: &Match) {
        self.metrics.record_server_change();

        let event = ServerAssigned {
            match_id: updated.id(),
            court_number: updated.court_number(),
            slot: updated.server_slot(),
            server: updated.server().id.clone(),
            timestamp: current_timestamp(),
        };
        if let Err(e) = self.event_publisher.publish_server_assigned(event).await {
            warn!("Failed to publish ServerAssigned event: {}", e);
        }
    }

    /// Count rejected commands and lift scheduler errors into the service result
    fn track<T>(&self, result: PairingResult<T>) -> Result<T> {
        result.map_err(|e| {
            warn!("Command rejected ({}): {}", e.kind(), e);
            self.metrics.record_error(&e);
            e.into()
        })
    }
}
