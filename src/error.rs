//! Error types for the pairing scheduler
//!
//! Scheduler operations report a [`PairingError`] so callers can tell the
//! failure kinds apart. Application glue (configuration, service start-up,
//! the CLI) uses anyhow for consistent error handling.

use crate::types::MatchState;

/// Result type alias for application glue
pub type Result<T> = anyhow::Result<T>;

/// Result type returned by scheduler operations
pub type PairingResult<T> = std::result::Result<T, PairingError>;

/// Failure kinds surfaced by the pairing scheduler
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairingError {
    #[error("At least 2 participants are required to create matches, got {count}")]
    InsufficientParticipants { count: usize },

    #[error("Participant appears more than once in the roster: {participant_id}")]
    DuplicateParticipant { participant_id: String },

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: String },

    #[error("Match {match_id} cannot move from {from} to {to}")]
    InvalidTransition {
        match_id: String,
        from: MatchState,
        to: MatchState,
    },

    #[error("No pairing run has been generated yet")]
    NoActiveRun,

    #[error("Failed to export fixtures: {message}")]
    ExportFailed { message: String },
}

impl PairingError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            PairingError::InsufficientParticipants { .. } => "insufficient_participants",
            PairingError::DuplicateParticipant { .. } => "duplicate_participant",
            PairingError::MatchNotFound { .. } => "match_not_found",
            PairingError::InvalidTransition { .. } => "invalid_transition",
            PairingError::NoActiveRun => "no_active_run",
            PairingError::ExportFailed { .. } => "export_failed",
        }
    }
}
