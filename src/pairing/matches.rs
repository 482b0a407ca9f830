//! Match entity and lifecycle management
//!
//! A match pairs two participants on a numbered court. After creation only
//! its serving side and lifecycle state may change.

use crate::error::{PairingError, PairingResult};
use crate::types::{MatchId, MatchState, Participant, ServerSlot};
use serde::Serialize;

/// One-on-one match on a court
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    id: MatchId,
    court_number: u32,
    participant_a: Participant,
    participant_b: Participant,
    server_slot: ServerSlot,
    lifecycle_state: MatchState,
}

impl Match {
    /// Create a scheduled match
    ///
    /// Callers guarantee the two participants are distinct; the scheduler
    /// only ever pairs different positions of a duplicate-free roster.
    pub(crate) fn new(
        id: MatchId,
        court_number: u32,
        participant_a: Participant,
        participant_b: Participant,
        server_slot: ServerSlot,
    ) -> Self {
        debug_assert_ne!(participant_a.id, participant_b.id);
        Self {
            id,
            court_number,
            participant_a,
            participant_b,
            server_slot,
            lifecycle_state: MatchState::Scheduled,
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn court_number(&self) -> u32 {
        self.court_number
    }

    pub fn participant_a(&self) -> &Participant {
        &self.participant_a
    }

    pub fn participant_b(&self) -> &Participant {
        &self.participant_b
    }

    pub fn participant(&self, slot: ServerSlot) -> &Participant {
        match slot {
            ServerSlot::A => &self.participant_a,
            ServerSlot::B => &self.participant_b,
        }
    }

    pub fn server_slot(&self) -> ServerSlot {
        self.server_slot
    }

    /// Participant currently assigned to serve
    pub fn server(&self) -> &Participant {
        self.participant(self.server_slot)
    }

    pub fn state(&self) -> MatchState {
        self.lifecycle_state
    }

    /// Whether the participant plays in this match
    pub fn involves(&self, participant_id: &str) -> bool {
        self.participant_a.id == participant_id || self.participant_b.id == participant_id
    }

    pub(crate) fn set_server(&mut self, slot: ServerSlot) {
        self.server_slot = slot;
    }

    pub fn can_transition_to(&self, target: MatchState) -> bool {
        self.lifecycle_state.next() == Some(target)
    }

    /// Move one step along `Scheduled -> InProgress -> Completed`
    pub(crate) fn transition_to(&mut self, target: MatchState) -> PairingResult<MatchState> {
        if !self.can_transition_to(target) {
            return Err(PairingError::InvalidTransition {
                match_id: self.id.to_string(),
                from: self.lifecycle_state,
                to: target,
            });
        }

        let previous = self.lifecycle_state;
        self.lifecycle_state = target;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{current_timestamp, generate_match_id};

    fn create_test_participant(id: &str) -> Participant {
        Participant::new(
            id,
            format!("Player {}", id),
            format!("{}@example.com", id),
            current_timestamp(),
        )
    }

    fn create_test_match() -> Match {
        Match::new(
            generate_match_id(&mut rand::thread_rng()),
            1,
            create_test_participant("p1"),
            create_test_participant("p2"),
            ServerSlot::A,
        )
    }

    #[test]
    fn test_match_creation() {
        let m = create_test_match();

        assert_eq!(m.state(), MatchState::Scheduled);
        assert_eq!(m.court_number(), 1);
        assert_eq!(m.server().id, "p1");
        assert!(m.involves("p2"));
        assert!(!m.involves("p3"));
    }

    #[test]
    fn test_forward_transitions() {
        let mut m = create_test_match();

        assert_eq!(
            m.transition_to(MatchState::InProgress).unwrap(),
            MatchState::Scheduled
        );
        assert_eq!(m.state(), MatchState::InProgress);

        assert_eq!(
            m.transition_to(MatchState::Completed).unwrap(),
            MatchState::InProgress
        );
        assert_eq!(m.state(), MatchState::Completed);
    }

    #[test]
    fn test_skipping_is_rejected() {
        let mut m = create_test_match();

        let err = m.transition_to(MatchState::Completed).unwrap_err();
        assert!(matches!(
            err,
            PairingError::InvalidTransition {
                from: MatchState::Scheduled,
                to: MatchState::Completed,
                ..
            }
        ));
        assert_eq!(m.state(), MatchState::Scheduled);
    }

    #[test]
    fn test_no_transitions_out_of_completed() {
        let mut m = create_test_match();
        m.transition_to(MatchState::InProgress).unwrap();
        m.transition_to(MatchState::Completed).unwrap();

        for target in [
            MatchState::Scheduled,
            MatchState::InProgress,
            MatchState::Completed,
        ] {
            assert!(m.transition_to(target).is_err());
        }
        assert_eq!(m.state(), MatchState::Completed);
    }

    #[test]
    fn test_self_transition_is_rejected() {
        let mut m = create_test_match();
        m.transition_to(MatchState::InProgress).unwrap();

        assert!(m.transition_to(MatchState::InProgress).is_err());
        assert!(m.transition_to(MatchState::Scheduled).is_err());
    }

    #[test]
    fn test_set_server_keeps_state_and_court() {
        let mut m = create_test_match();
        m.transition_to(MatchState::InProgress).unwrap();

        m.set_server(ServerSlot::B);
        assert_eq!(m.server().id, "p2");
        assert_eq!(m.state(), MatchState::InProgress);
        assert_eq!(m.court_number(), 1);
    }
}
