//! CSV export of a pairing run
//!
//! Layout:
//!
//! ```text
//! Court,Player 1,Player 2,Serves,Status
//! 1,John Kamau,Mary Wanjiru,Mary Wanjiru,scheduled
//! 2,Peter Omondi,Alice Muthoni,Peter Omondi,in-progress
//!
//! Queue
//! David Kiprop,david@example.com
//! ```
//!
//! The trailing section is only present when a participant was left over;
//! it is headed `Bye` instead of `Queue` under the bye policy.

use crate::error::{PairingError, PairingResult};
use crate::pairing::run::PairingRun;
use crate::types::Participant;
use csv::WriterBuilder;

/// Header row of the fixtures table
pub const FIXTURES_HEADER: [&str; 5] = ["Court", "Player 1", "Player 2", "Serves", "Status"];

/// Render the fixtures table for a run
pub fn render_fixtures(run: &PairingRun) -> PairingResult<String> {
    let mut output = write_section(|wtr| {
        wtr.write_record(FIXTURES_HEADER)?;
        for m in run.matches() {
            wtr.write_record([
                m.court_number().to_string().as_str(),
                m.participant_a().display_name.as_str(),
                m.participant_b().display_name.as_str(),
                m.server().display_name.as_str(),
                m.state().as_str(),
            ])?;
        }
        Ok(())
    })?;

    if !run.queue().is_empty() {
        output.push('\n');
        output.push_str(&participant_section("Queue", run.queue().participants())?);
    }

    if let Some(bye) = run.bye() {
        output.push('\n');
        output.push_str(&participant_section("Bye", std::slice::from_ref(bye))?);
    }

    Ok(output)
}

fn participant_section(title: &str, participants: &[Participant]) -> PairingResult<String> {
    write_section(|wtr| {
        wtr.write_record([title])?;
        for participant in participants {
            wtr.write_record([
                participant.display_name.as_str(),
                participant.contact_id.as_str(),
            ])?;
        }
        Ok(())
    })
}

fn write_section<F>(write: F) -> PairingResult<String>
where
    F: FnOnce(&mut csv::Writer<Vec<u8>>) -> csv::Result<()>,
{
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());

    write(&mut wtr).map_err(export_failed)?;

    let bytes = wtr.into_inner().map_err(|e| PairingError::ExportFailed {
        message: e.to_string(),
    })?;

    String::from_utf8(bytes).map_err(|e| PairingError::ExportFailed {
        message: e.to_string(),
    })
}

fn export_failed(err: csv::Error) -> PairingError {
    PairingError::ExportFailed {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::matches::Match;
    use crate::pairing::run::RotationQueue;
    use crate::types::{MatchState, ServerSlot};
    use crate::utils::{current_timestamp, generate_match_id};

    fn participant(id: &str, name: &str, contact: &str) -> Participant {
        Participant::new(id, name, contact, current_timestamp())
    }

    fn two_court_run(queue: Vec<Participant>, bye: Option<Participant>) -> PairingRun {
        let mut rng = rand::thread_rng();
        let first = Match::new(
            generate_match_id(&mut rng),
            1,
            participant("1", "John Kamau", "john@example.com"),
            participant("2", "Mary Wanjiru", "mary@example.com"),
            ServerSlot::B,
        );
        let mut second = Match::new(
            generate_match_id(&mut rng),
            2,
            participant("3", "Peter Omondi", "peter@example.com"),
            participant("4", "Alice Muthoni", "alice@example.com"),
            ServerSlot::A,
        );
        second.transition_to(MatchState::InProgress).unwrap();

        PairingRun::new(
            vec![first, second],
            RotationQueue::new(queue),
            bye,
            current_timestamp(),
        )
    }

    #[test]
    fn test_export_with_queue() {
        let run = two_court_run(
            vec![participant("5", "David Kiprop", "david@example.com")],
            None,
        );

        let csv = render_fixtures(&run).unwrap();
        assert_eq!(
            csv,
            "Court,Player 1,Player 2,Serves,Status\n\
             1,John Kamau,Mary Wanjiru,Mary Wanjiru,scheduled\n\
             2,Peter Omondi,Alice Muthoni,Peter Omondi,in-progress\n\
             \n\
             Queue\n\
             David Kiprop,david@example.com\n"
        );
    }

    #[test]
    fn test_export_without_queue_has_no_section() {
        let run = two_court_run(Vec::new(), None);

        let csv = render_fixtures(&run).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(!csv.contains("Queue"));
    }

    #[test]
    fn test_export_bye_section() {
        let run = two_court_run(Vec::new(), Some(participant("5", "David Kiprop", "")));

        let csv = render_fixtures(&run).unwrap();
        assert!(csv.ends_with("\nBye\nDavid Kiprop,\n"));
        assert!(!csv.contains("Queue"));
    }

    #[test]
    fn test_export_quotes_embedded_commas() {
        let mut rng = rand::thread_rng();
        let run = PairingRun::new(
            vec![Match::new(
                generate_match_id(&mut rng),
                1,
                participant("1", "Kamau, John", "john@example.com"),
                participant("2", "Mary Wanjiru", "mary@example.com"),
                ServerSlot::A,
            )],
            RotationQueue::default(),
            None,
            current_timestamp(),
        );

        let csv = render_fixtures(&run).unwrap();
        assert!(csv.contains("1,\"Kamau, John\",Mary Wanjiru,\"Kamau, John\",scheduled"));
    }
}
