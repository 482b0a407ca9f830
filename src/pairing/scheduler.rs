//! Pairing scheduler
//!
//! Owns the current [`PairingRun`] and is the only way to change it. A
//! generation shuffles the roster with an unbiased Fisher-Yates shuffle,
//! walks it two at a time to fill courts 1..=n/2, and leaves an odd
//! participant to the configured [`OddParticipantPolicy`].

use crate::error::{PairingError, PairingResult};
use crate::export::render_fixtures;
use crate::pairing::matches::Match;
use crate::pairing::roster::validate_roster;
use crate::pairing::run::{PairingRun, RotationQueue, RunSummary};
use crate::types::{MatchId, MatchState, OddParticipantPolicy, Participant, ServerSlot};
use crate::utils::{current_timestamp, generate_match_id};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Scheduler behaviour settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// What to do with the leftover participant of an odd roster
    pub odd_participant_policy: OddParticipantPolicy,
}

impl SchedulerConfig {
    pub fn with_policy(odd_participant_policy: OddParticipantPolicy) -> Self {
        Self {
            odd_participant_policy,
        }
    }
}

/// Scheduler owning a single pairing run
///
/// The random source is injectable so runs can be reproduced from a seed.
#[derive(Debug)]
pub struct PairingScheduler<R = StdRng> {
    config: SchedulerConfig,
    rng: R,
    run: Option<PairingRun>,
}

impl PairingScheduler<StdRng> {
    /// Create a scheduler seeded from OS entropy
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a scheduler whose runs are fully determined by `seed`
    pub fn with_seed(config: SchedulerConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PairingScheduler<R> {
    pub fn with_rng(config: SchedulerConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            run: None,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Current run, if one has been generated
    pub fn current_run(&self) -> Option<&PairingRun> {
        self.run.as_ref()
    }

    /// Pair the roster into a fresh run, replacing any previous run
    ///
    /// On error the previous run is left untouched.
    pub fn generate(&mut self, roster: &[Participant]) -> PairingResult<&PairingRun> {
        let run = self.build_run(roster)?;

        info!(
            "Generated pairing run - participants: {}, matches: {}, queued: {}, bye: {}",
            roster.len(),
            run.matches().len(),
            run.queue().len(),
            run.bye().is_some()
        );

        Ok(&*self.run.insert(run))
    }

    /// Regenerate from the same or an updated roster
    ///
    /// Previous pairings are not remembered, so a reshuffle may repeat them.
    pub fn reshuffle(&mut self, roster: &[Participant]) -> PairingResult<&PairingRun> {
        if self.run.is_none() {
            debug!("Reshuffle requested without a previous run, generating fresh");
        }
        self.generate(roster)
    }

    /// Assign the serving side of a match
    pub fn set_server(&mut self, match_id: MatchId, slot: ServerSlot) -> PairingResult<&Match> {
        let m = self.match_mut(match_id)?;
        m.set_server(slot);

        debug!(
            "Court {} server set to slot {} ({})",
            m.court_number(),
            slot,
            m.server().display_name
        );

        Ok(m)
    }

    /// Give the serve to the other side of a match
    pub fn swap_server(&mut self, match_id: MatchId) -> PairingResult<&Match> {
        let slot = self.match_mut(match_id)?.server_slot().toggled();
        self.set_server(match_id, slot)
    }

    /// Move a match one step along its lifecycle, returning the previous state
    pub fn transition(
        &mut self,
        match_id: MatchId,
        target: MatchState,
    ) -> PairingResult<MatchState> {
        let m = self.match_mut(match_id)?;

        match m.transition_to(target) {
            Ok(previous) => {
                info!(
                    "Court {} match {} moved {} -> {}",
                    m.court_number(),
                    match_id,
                    previous,
                    target
                );
                Ok(previous)
            }
            Err(e) => {
                warn!("Rejected lifecycle change for match {}: {}", match_id, e);
                Err(e)
            }
        }
    }

    /// Render the current run as a CSV fixtures table
    pub fn export_run(&self) -> PairingResult<String> {
        let run = self.run.as_ref().ok_or(PairingError::NoActiveRun)?;
        render_fixtures(run)
    }

    pub fn summary(&self) -> PairingResult<RunSummary> {
        self.run
            .as_ref()
            .map(PairingRun::summary)
            .ok_or(PairingError::NoActiveRun)
    }

    fn match_mut(&mut self, match_id: MatchId) -> PairingResult<&mut Match> {
        self.run
            .as_mut()
            .ok_or(PairingError::NoActiveRun)?
            .find_match_mut(match_id)
            .ok_or_else(|| PairingError::MatchNotFound {
                match_id: match_id.to_string(),
            })
    }

    /// Assemble a complete run without touching the current one
    fn build_run(&mut self, roster: &[Participant]) -> PairingResult<PairingRun> {
        validate_roster(roster)?;

        let mut order = roster.to_vec();
        order.shuffle(&mut self.rng);

        let pairs = order.chunks_exact(2);
        let leftover = pairs.remainder().first().cloned();

        let mut matches = Vec::with_capacity(order.len() / 2);
        for (court_number, pair) in (1u32..).zip(pairs) {
            let server = if self.rng.gen_bool(0.5) {
                ServerSlot::A
            } else {
                ServerSlot::B
            };
            matches.push(Match::new(
                generate_match_id(&mut self.rng),
                court_number,
                pair[0].clone(),
                pair[1].clone(),
                server,
            ));
        }

        let (queue, bye) = match (leftover, self.config.odd_participant_policy) {
            (Some(participant), OddParticipantPolicy::Queue) => {
                (RotationQueue::new(vec![participant]), None)
            }
            (Some(participant), OddParticipantPolicy::Bye) => {
                (RotationQueue::default(), Some(participant))
            }
            (None, _) => (RotationQueue::default(), None),
        };

        Ok(PairingRun::new(matches, queue, bye, current_timestamp()))
    }
}
