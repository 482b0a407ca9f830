//! Service layer for the court-rotation scheduler
//!
//! This module wires the scheduler to its collaborators (roster provider,
//! event publisher, metrics) and exposes the command surface over HTTP.

pub mod app;
pub mod health;
pub mod http;

pub use app::{AppState, ExportedFixtures, ServiceError};
pub use health::{HealthCheck, HealthStatus};
pub use http::{create_router, HttpServer, HttpServerConfig};
