//! Notifications emitted after successful scheduler commands
//!
//! The presentation layer subscribes to these to show confirmations such as
//! "Created 2 matches, 1 player queued" or "Serve assignment updated".

pub mod publisher;

pub use publisher::{EventPublisher, LoggingEventPublisher, MockEventPublisher};
