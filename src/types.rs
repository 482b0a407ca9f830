//! Common types used throughout the pairing scheduler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for participants, assigned by the roster provider
pub type ParticipantId = String;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// A participant eligible for pairing, as supplied by the roster provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    /// Contact identifier (usually an email address); may be empty
    #[serde(default)]
    pub contact_id: String,
    pub arrival_time: DateTime<Utc>,
}

impl Participant {
    pub fn new(
        id: impl Into<ParticipantId>,
        display_name: impl Into<String>,
        contact_id: impl Into<String>,
        arrival_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            contact_id: contact_id.into(),
            arrival_time,
        }
    }
}

/// Which side of a match serves first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServerSlot {
    A,
    B,
}

impl ServerSlot {
    /// The opposite slot
    pub fn toggled(self) -> Self {
        match self {
            ServerSlot::A => ServerSlot::B,
            ServerSlot::B => ServerSlot::A,
        }
    }
}

impl std::fmt::Display for ServerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerSlot::A => write!(f, "A"),
            ServerSlot::B => write!(f, "B"),
        }
    }
}

impl FromStr for ServerSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(ServerSlot::A),
            "B" => Ok(ServerSlot::B),
            other => Err(format!("Invalid server slot '{}', expected A or B", other)),
        }
    }
}

/// Lifecycle of a single match
///
/// Matches only move forward one step at a time:
/// `Scheduled -> InProgress -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchState {
    /// Match has been created and is waiting for a court (initial state)
    Scheduled,
    /// Match is being played
    InProgress,
    /// Match has finished (terminal state)
    Completed,
}

impl MatchState {
    /// The only state this one may move to, if any
    pub fn next(self) -> Option<MatchState> {
        match self {
            MatchState::Scheduled => Some(MatchState::InProgress),
            MatchState::InProgress => Some(MatchState::Completed),
            MatchState::Completed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Lowercase name used in exports and on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            MatchState::Scheduled => "scheduled",
            MatchState::InProgress => "in-progress",
            MatchState::Completed => "completed",
        }
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "scheduled" => Ok(MatchState::Scheduled),
            "in-progress" | "inprogress" => Ok(MatchState::InProgress),
            "completed" => Ok(MatchState::Completed),
            other => Err(format!("Invalid match state '{}'", other)),
        }
    }
}

/// What happens to the participant left over when the roster size is odd
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddParticipantPolicy {
    /// Leftover participant waits in the rotation queue
    #[default]
    Queue,
    /// Leftover participant is marked as having a bye for this round
    Bye,
}

impl std::fmt::Display for OddParticipantPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OddParticipantPolicy::Queue => write!(f, "queue"),
            OddParticipantPolicy::Bye => write!(f, "bye"),
        }
    }
}

impl FromStr for OddParticipantPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(OddParticipantPolicy::Queue),
            "bye" | "bye-marker" => Ok(OddParticipantPolicy::Bye),
            other => Err(format!(
                "Invalid odd participant policy '{}', expected queue or bye",
                other
            )),
        }
    }
}

/// Event emitted when a new pairing run replaces the previous one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunGenerated {
    pub reshuffle: bool,
    pub participants: usize,
    pub matches: usize,
    pub queued: usize,
    pub bye: Option<ParticipantId>,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted when the serving side of a match changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerAssigned {
    pub match_id: MatchId,
    pub court_number: u32,
    pub slot: ServerSlot,
    pub server: ParticipantId,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted when a match moves along its lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStatusChanged {
    pub match_id: MatchId,
    pub court_number: u32,
    pub from: MatchState,
    pub to: MatchState,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted when the current run is exported
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixturesExported {
    pub filename: String,
    pub rows: usize,
    pub timestamp: DateTime<Utc>,
}

/// Union type for all scheduler notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PairingEvent {
    RunGenerated(RunGenerated),
    ServerAssigned(ServerAssigned),
    MatchStatusChanged(MatchStatusChanged),
    FixturesExported(FixturesExported),
}

impl PairingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PairingEvent::RunGenerated(_) => "RunGenerated",
            PairingEvent::ServerAssigned(_) => "ServerAssigned",
            PairingEvent::MatchStatusChanged(_) => "MatchStatusChanged",
            PairingEvent::FixturesExported(_) => "FixturesExported",
        }
    }
}
