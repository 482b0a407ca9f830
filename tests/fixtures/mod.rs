//! Test fixtures shared by the integration tests
#![allow(dead_code)]

use court_rotation::config::AppConfig;
use court_rotation::error::Result;
use court_rotation::events::MockEventPublisher;
use court_rotation::metrics::MetricsCollector;
use court_rotation::pairing::{PairingScheduler, RosterProvider, SchedulerConfig};
use court_rotation::service::AppState;
use court_rotation::types::{OddParticipantPolicy, Participant};
use court_rotation::utils::current_timestamp;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Roster of `size` participants with ids "1".."size"
pub fn roster(size: usize) -> Vec<Participant> {
    (1..=size)
        .map(|i| {
            Participant::new(
                i.to_string(),
                format!("Player {}", i),
                format!("player{}@example.com", i),
                current_timestamp(),
            )
        })
        .collect()
}

/// The five-player session used throughout the scenarios
pub fn club_roster() -> Vec<Participant> {
    [
        ("1", "John Kamau", "john@example.com"),
        ("2", "Mary Wanjiru", "mary@example.com"),
        ("3", "Peter Omondi", "peter@example.com"),
        ("4", "Alice Muthoni", "alice@example.com"),
        ("5", "David Kiprop", "david@example.com"),
    ]
    .into_iter()
    .map(|(id, name, contact)| Participant::new(id, name, contact, current_timestamp()))
    .collect()
}

/// Roster provider whose attendance can change between commands
#[derive(Debug, Default)]
pub struct AttendanceRosterProvider {
    present: Mutex<Vec<Participant>>,
    snapshots: AtomicUsize,
}

impl AttendanceRosterProvider {
    pub fn new(present: Vec<Participant>) -> Self {
        Self {
            present: Mutex::new(present),
            snapshots: AtomicUsize::new(0),
        }
    }

    pub fn arrive(&self, participant: Participant) {
        if let Ok(mut present) = self.present.lock() {
            present.push(participant);
        }
    }

    pub fn leave(&self, participant_id: &str) {
        if let Ok(mut present) = self.present.lock() {
            present.retain(|p| p.id != participant_id);
        }
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }
}

impl RosterProvider for AttendanceRosterProvider {
    fn snapshot(&self) -> Result<Vec<Participant>> {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        self.present
            .lock()
            .map(|present| present.clone())
            .map_err(|_| anyhow::anyhow!("attendance lock poisoned"))
    }
}

/// Complete service wired with in-memory collaborators
pub struct TestSystem {
    pub app_state: Arc<AppState>,
    pub provider: Arc<AttendanceRosterProvider>,
    pub publisher: Arc<MockEventPublisher>,
    pub metrics: Arc<MetricsCollector>,
}

pub fn create_test_system(present: Vec<Participant>, seed: u64) -> TestSystem {
    create_test_system_with_policy(present, seed, OddParticipantPolicy::Queue)
}

pub fn create_test_system_with_policy(
    present: Vec<Participant>,
    seed: u64,
    policy: OddParticipantPolicy,
) -> TestSystem {
    let provider = Arc::new(AttendanceRosterProvider::new(present));
    let publisher = Arc::new(MockEventPublisher::new());
    let metrics = Arc::new(MetricsCollector::new().expect("Failed to create collector"));

    let app_state = AppState::with_components(
        AppConfig::default(),
        PairingScheduler::with_seed(SchedulerConfig::with_policy(policy), seed),
        provider.clone(),
        publisher.clone(),
        metrics.clone(),
    );

    TestSystem {
        app_state: Arc::new(app_state),
        provider,
        publisher,
        metrics,
    }
}
