//! Event publishers for scheduler notifications

use crate::error::Result;
use crate::types::*;
use async_trait::async_trait;
use tracing::info;

/// Trait for publishing scheduler events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a RunGenerated event
    async fn publish_run_generated(&self, event: RunGenerated) -> Result<()>;

    /// Publish a ServerAssigned event
    async fn publish_server_assigned(&self, event: ServerAssigned) -> Result<()>;

    /// Publish a MatchStatusChanged event
    async fn publish_match_status_changed(&self, event: MatchStatusChanged) -> Result<()>;

    /// Publish a FixturesExported event
    async fn publish_fixtures_exported(&self, event: FixturesExported) -> Result<()>;
}

/// Publisher that records events as structured log lines
#[derive(Debug, Clone, Default)]
pub struct LoggingEventPublisher;

impl LoggingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish_run_generated(&self, event: RunGenerated) -> Result<()> {
        let message = match (event.queued, &event.bye) {
            (0, None) => format!("Created {} matches!", event.matches),
            (_, Some(bye)) => format!("Created {} matches! {} has a bye.", event.matches, bye),
            (queued, None) => format!("Created {} matches! {} player queued.", event.matches, queued),
        };

        info!(
            event = "RunGenerated",
            reshuffle = event.reshuffle,
            participants = event.participants,
            matches = event.matches,
            queued = event.queued,
            "{}",
            message
        );
        Ok(())
    }

    async fn publish_server_assigned(&self, event: ServerAssigned) -> Result<()> {
        info!(
            event = "ServerAssigned",
            match_id = %event.match_id,
            court = event.court_number,
            slot = %event.slot,
            "Serve assignment updated"
        );
        Ok(())
    }

    async fn publish_match_status_changed(&self, event: MatchStatusChanged) -> Result<()> {
        info!(
            event = "MatchStatusChanged",
            match_id = %event.match_id,
            court = event.court_number,
            from = %event.from,
            "Match status updated to {}",
            event.to
        );
        Ok(())
    }

    async fn publish_fixtures_exported(&self, event: FixturesExported) -> Result<()> {
        info!(
            event = "FixturesExported",
            filename = %event.filename,
            rows = event.rows,
            "Fixtures exported as CSV"
        );
        Ok(())
    }
}

/// Publisher that keeps events in memory for tests
#[derive(Debug, Default)]
pub struct MockEventPublisher {
    published_events: std::sync::Mutex<Vec<PairingEvent>>,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all published events
    pub fn get_published_events(&self) -> Vec<PairingEvent> {
        self.published_events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Count events with the given name
    pub fn count_events_of_type(&self, event_type: &str) -> usize {
        self.get_published_events()
            .iter()
            .filter(|event| event.name() == event_type)
            .count()
    }

    pub fn clear_events(&self) {
        if let Ok(mut events) = self.published_events.lock() {
            events.clear();
        }
    }

    fn record(&self, event: PairingEvent) {
        if let Ok(mut events) = self.published_events.lock() {
            events.push(event);
        }
    }
}

#[async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish_run_generated(&self, event: RunGenerated) -> Result<()> {
        self.record(PairingEvent::RunGenerated(event));
        Ok(())
    }

    async fn publish_server_assigned(&self, event: ServerAssigned) -> Result<()> {
        self.record(PairingEvent::ServerAssigned(event));
        Ok(())
    }

    async fn publish_match_status_changed(&self, event: MatchStatusChanged) -> Result<()> {
        self.record(PairingEvent::MatchStatusChanged(event));
        Ok(())
    }

    async fn publish_fixtures_exported(&self, event: FixturesExported) -> Result<()> {
        self.record(PairingEvent::FixturesExported(event));
        Ok(())
    }
}
