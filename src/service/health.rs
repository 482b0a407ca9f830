//! Health check reporting
//!
//! The service is healthy while the scheduler lock can be acquired promptly.
//! A scheduler that stays busy past the probe timeout reports degraded.

use crate::service::app::AppState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How long a probe waits for the scheduler before reporting degraded
const SCHEDULER_PROBE_TIMEOUT: Duration = Duration::from_millis(250);

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub stats: ServiceStats,
}

/// Current run statistics for health reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    pub has_active_run: bool,
    pub matches: usize,
    pub queued: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub uptime_seconds: u64,
}

impl HealthCheck {
    /// Perform a health check of the service
    pub async fn check(app_state: Arc<AppState>) -> Self {
        let uptime = app_state.uptime();
        app_state.metrics().update_uptime(uptime);

        let summary =
            tokio::time::timeout(SCHEDULER_PROBE_TIMEOUT, app_state.try_summary()).await;

        let (status, stats) = match summary {
            Ok(summary) => {
                let stats = match summary {
                    Some(summary) => ServiceStats {
                        has_active_run: true,
                        matches: summary.matches,
                        queued: summary.queued,
                        in_progress: summary.in_progress,
                        completed: summary.completed,
                        uptime_seconds: uptime.as_secs(),
                    },
                    None => ServiceStats {
                        uptime_seconds: uptime.as_secs(),
                        ..ServiceStats::default()
                    },
                };
                (HealthStatus::Healthy, stats)
            }
            Err(_) => {
                warn!(
                    "Scheduler did not respond within {:?}",
                    SCHEDULER_PROBE_TIMEOUT
                );
                (
                    HealthStatus::Degraded,
                    ServiceStats {
                        uptime_seconds: uptime.as_secs(),
                        ..ServiceStats::default()
                    },
                )
            }
        };

        debug!("Health check completed: {}", status);

        HealthCheck {
            status,
            service: app_state.config().service.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            stats,
        }
    }

    /// Liveness probe that never waits on the scheduler
    pub fn liveness_check(app_state: &AppState) -> HealthStatus {
        if app_state.scheduler_available() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        }
    }
}
