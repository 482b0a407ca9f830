//! Pairing run: the matches and rotation queue produced by one generation

use crate::pairing::matches::Match;
use crate::types::{MatchId, MatchState, Participant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Participants waiting to rotate onto a court, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationQueue {
    participants: Vec<Participant>,
}

impl RotationQueue {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self { participants }
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Participant> {
        self.participants.iter()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }
}

/// Result of one generation
///
/// A run is replaced wholesale by the next generation; only the server slot
/// and lifecycle state of its matches change in between.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingRun {
    matches: Vec<Match>,
    queue: RotationQueue,
    /// Participant sitting out this round under the bye policy
    bye: Option<Participant>,
    generated_at: DateTime<Utc>,
}

impl PairingRun {
    pub(crate) fn new(
        matches: Vec<Match>,
        queue: RotationQueue,
        bye: Option<Participant>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            matches,
            queue,
            bye,
            generated_at,
        }
    }

    /// Matches in ascending court order
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn queue(&self) -> &RotationQueue {
        &self.queue
    }

    pub fn bye(&self) -> Option<&Participant> {
        self.bye.as_ref()
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn find_match(&self, match_id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id() == match_id)
    }

    pub(crate) fn find_match_mut(&mut self, match_id: MatchId) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id() == match_id)
    }

    /// Total number of participants covered by this run
    pub fn participant_count(&self) -> usize {
        self.matches.len() * 2 + self.queue.len() + usize::from(self.bye.is_some())
    }

    pub fn summary(&self) -> RunSummary {
        let count_in = |state: MatchState| {
            self.matches
                .iter()
                .filter(|m| m.state() == state)
                .count()
        };

        RunSummary {
            participants: self.participant_count(),
            matches: self.matches.len(),
            queued: self.queue.len(),
            byes: usize::from(self.bye.is_some()),
            scheduled: count_in(MatchState::Scheduled),
            in_progress: count_in(MatchState::InProgress),
            completed: count_in(MatchState::Completed),
            generated_at: self.generated_at,
        }
    }
}

/// Counts shown on the planner dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub participants: usize,
    pub matches: usize,
    pub queued: usize,
    pub byes: usize,
    pub scheduled: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub generated_at: DateTime<Utc>,
}
