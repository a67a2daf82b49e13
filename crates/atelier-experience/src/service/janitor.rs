//! Session Janitor
//!
//! The single expiry authority: sweeps idle sessions out of the repository
//! on a fixed interval and drops their analytics logs.

use std::sync::Arc;
use std::time::Duration;

use atelier_common::SessionId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, instrument};

use super::analytics::AnalyticsTracker;
use super::session_store::{idle_cutoff, SessionStore};

/// Shortest period between sweeps
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of one sweep
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub swept_at: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    pub removed: Vec<SessionId>,
    /// Capacity evictions whose analytics were dropped by this sweep
    pub evicted: Vec<SessionId>,
}

/// Background idle-session sweeper
pub struct SessionJanitor {
    sessions: Arc<SessionStore>,
    analytics: Arc<AnalyticsTracker>,
    interval: Duration,
    last_sweep: RwLock<Option<SweepReport>>,
}

impl SessionJanitor {
    pub fn new(sessions: Arc<SessionStore>, analytics: Arc<AnalyticsTracker>, interval: Duration) -> Self {
        Self {
            sessions,
            analytics,
            interval: interval.max(MIN_SWEEP_INTERVAL),
            last_sweep: RwLock::new(None),
        }
    }

    /// Sweep sessions idle longer than the store's max age
    pub async fn sweep_once(&self) -> SweepReport {
        self.sweep_before(idle_cutoff(Utc::now(), self.sessions.max_age())).await
    }

    /// Sweep sessions last active before `cutoff`
    #[instrument(skip(self))]
    pub async fn sweep_before(&self, cutoff: DateTime<Utc>) -> SweepReport {
        let removed = self.sessions.cleanup_before(cutoff).await;
        self.analytics.forget_sessions(&removed);
        let evicted = self.forget_evicted().await;

        let report = SweepReport {
            swept_at: Utc::now(),
            cutoff,
            removed,
            evicted,
        };
        *self.last_sweep.write() = Some(report.clone());
        report
    }

    /// Drop analytics for sessions the repository evicted for capacity
    pub async fn forget_evicted(&self) -> Vec<SessionId> {
        let evicted = self.sessions.drain_evicted().await;
        self.analytics.forget_sessions(&evicted);
        evicted
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Most recent sweep, if any ran
    pub fn last_sweep(&self) -> Option<SweepReport> {
        self.last_sweep.read().clone()
    }

    /// Start background sweeper
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            // First tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let report = self.sweep_once().await;
                if !report.removed.is_empty() {
                    info!(count = report.removed.len(), "Auto-swept idle sessions");
                }
            }
        })
    }
}
