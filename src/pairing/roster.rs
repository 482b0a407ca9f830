//! Roster provider traits and implementations
//!
//! The roster provider supplies the ordered snapshot of participants marked
//! present by the attendance tracker. The scheduler never mutates it.

use crate::error::{PairingError, PairingResult, Result};
use crate::types::Participant;
use anyhow::Context;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Minimum roster size for a pairing run
pub const MIN_PARTICIPANTS: usize = 2;

/// Trait for supplying the current roster snapshot
#[cfg_attr(test, mockall::automock)]
pub trait RosterProvider: Send + Sync {
    /// Ordered snapshot of currently eligible participants
    fn snapshot(&self) -> Result<Vec<Participant>>;
}

/// Roster provider backed by a fixed participant list
#[derive(Debug, Clone, Default)]
pub struct StaticRosterProvider {
    participants: Vec<Participant>,
}

impl StaticRosterProvider {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self { participants }
    }

    /// Load a roster from a JSON array of participants
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file {}", path.display()))?;
        let participants: Vec<Participant> = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid roster file {}", path.display()))?;

        info!(
            "Loaded roster with {} participants from {}",
            participants.len(),
            path.display()
        );

        Ok(Self::new(participants))
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

impl RosterProvider for StaticRosterProvider {
    fn snapshot(&self) -> Result<Vec<Participant>> {
        debug!("Serving roster snapshot of {} participants", self.participants.len());
        Ok(self.participants.clone())
    }
}

/// Check a roster is large enough and free of duplicate ids
pub fn validate_roster(roster: &[Participant]) -> PairingResult<()> {
    if roster.len() < MIN_PARTICIPANTS {
        return Err(PairingError::InsufficientParticipants {
            count: roster.len(),
        });
    }

    let mut seen = HashSet::with_capacity(roster.len());
    for participant in roster {
        if !seen.insert(participant.id.as_str()) {
            return Err(PairingError::DuplicateParticipant {
                participant_id: participant.id.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::current_timestamp;
    use std::io::Write;

    fn participant(id: &str, contact: &str) -> Participant {
        Participant::new(id, format!("Player {}", id), contact, current_timestamp())
    }

    #[test]
    fn test_validate_roster_size() {
        assert_eq!(
            validate_roster(&[]),
            Err(PairingError::InsufficientParticipants { count: 0 })
        );
        assert_eq!(
            validate_roster(&[participant("1", "a@x")]),
            Err(PairingError::InsufficientParticipants { count: 1 })
        );
        assert!(validate_roster(&[participant("1", "a@x"), participant("2", "b@x")]).is_ok());
    }

    #[test]
    fn test_validate_roster_duplicates() {
        let roster = vec![
            participant("1", "a@x"),
            participant("2", "b@x"),
            participant("1", "c@x"),
        ];

        assert_eq!(
            validate_roster(&roster),
            Err(PairingError::DuplicateParticipant {
                participant_id: "1".to_string()
            })
        );
    }

    #[test]
    fn test_empty_contact_is_accepted() {
        let roster = vec![participant("1", ""), participant("2", "")];
        assert!(validate_roster(&roster).is_ok());
    }

    #[test]
    fn test_static_provider_snapshot_preserves_order() {
        let provider = StaticRosterProvider::new(vec![
            participant("3", ""),
            participant("1", ""),
            participant("2", ""),
        ]);

        let ids: Vec<_> = provider
            .snapshot()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_static_provider_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "1", "displayName": "John Kamau", "contactId": "john@example.com", "arrivalTime": "2024-03-01T09:15:00Z"}},
                {{"id": "2", "displayName": "Mary Wanjiru", "contactId": "mary@example.com", "arrivalTime": "2024-03-01T09:18:00Z"}}
            ]"#
        )
        .unwrap();

        let provider = StaticRosterProvider::from_file(file.path()).unwrap();
        assert_eq!(provider.len(), 2);
        assert_eq!(provider.snapshot().unwrap()[1].display_name, "Mary Wanjiru");
    }

    #[test]
    fn test_static_provider_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(StaticRosterProvider::from_file(file.path()).is_err());
    }
}
