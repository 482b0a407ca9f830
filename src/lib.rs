//! Court Rotation - Random one-on-one pairing for club sessions
//!
//! This crate pairs the participants present at a session onto numbered
//! courts, assigns who serves, tracks each match through its lifecycle and
//! exports the fixtures as a CSV table.

pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod metrics;
pub mod pairing;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{PairingError, PairingResult, Result};
pub use types::*;

// Re-export key components
pub use events::EventPublisher;
pub use pairing::{PairingRun, PairingScheduler, RosterProvider, StaticRosterProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
