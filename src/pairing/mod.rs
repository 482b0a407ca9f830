//! Match pairing system for training sessions
//!
//! This module turns a roster snapshot into one-on-one matches on numbered
//! courts, keeps a rotation queue for the odd participant out, and tracks
//! each match through its lifecycle.

pub mod matches;
pub mod roster;
pub mod run;
pub mod scheduler;

// Re-export commonly used types
pub use matches::Match;
pub use roster::{validate_roster, RosterProvider, StaticRosterProvider, MIN_PARTICIPANTS};
pub use run::{PairingRun, RotationQueue, RunSummary};
pub use scheduler::{PairingScheduler, SchedulerConfig};
