//! Session Store
//!
//! Metadata view over the session repository: create, read (refreshing
//! activity), partial update and the idle sweep policy.

use std::sync::Arc;
use std::time::Duration;

use atelier_common::{Result, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::infra::session_repository::{
    RepositoryStats, SessionEntry, SessionMetadata, SessionRepository, StoreError,
};

/// Partial metadata update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    /// Replaces the preference bag wholesale
    #[serde(default)]
    pub preferences: Option<Map<String, Value>>,
}

impl SessionUpdate {
    pub fn preferences(preferences: Map<String, Value>) -> Self {
        Self {
            preferences: Some(preferences),
        }
    }
}

/// Session metadata store
pub struct SessionStore {
    repository: Arc<dyn SessionRepository>,
    max_age: Duration,
}

impl SessionStore {
    pub fn new(repository: Arc<dyn SessionRepository>, max_age: Duration) -> Self {
        Self {
            repository,
            max_age,
        }
    }

    /// Idle age after which sessions are swept
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Create a session; its experience state starts empty in browse mode
    #[instrument(skip(self))]
    pub async fn create(&self) -> Result<SessionMetadata> {
        let entry = SessionEntry::create();
        let metadata = entry.metadata.clone();
        self.repository.insert(entry).await?;

        info!(session_id = %metadata.id, "Session created");
        Ok(metadata)
    }

    /// Get session metadata, refreshing its activity timestamp
    #[instrument(skip(self), fields(session_id = %id))]
    pub async fn get(&self, id: &SessionId) -> Option<SessionMetadata> {
        let mut snapshot = None;
        let touched = self
            .repository
            .modify(
                id,
                Box::new(|entry| {
                    entry.touch();
                    snapshot = Some(entry.metadata.clone());
                }),
            )
            .await;

        match touched {
            Ok(()) => snapshot,
            Err(StoreError::NotFound(_)) => None,
            Err(err) => {
                debug!(error = %err, "Session lookup failed");
                None
            }
        }
    }

    /// Merge a partial update; the identifier is never changed
    #[instrument(skip(self, update), fields(session_id = %id))]
    pub async fn update(&self, id: &SessionId, update: SessionUpdate) -> Result<SessionMetadata> {
        let mut snapshot = None;
        self.repository
            .modify(
                id,
                Box::new(|entry| {
                    if let Some(preferences) = update.preferences {
                        entry.metadata.preferences = preferences;
                    }
                    entry.touch();
                    snapshot = Some(entry.metadata.clone());
                }),
            )
            .await?;

        snapshot.ok_or_else(|| atelier_common::AtelierError::session_not_found(id.as_str()))
    }

    /// Remove sessions idle longer than the configured age
    pub async fn cleanup(&self) -> Vec<SessionId> {
        self.cleanup_before(idle_cutoff(Utc::now(), self.max_age)).await
    }

    /// Remove sessions last active before `cutoff`
    #[instrument(skip(self))]
    pub async fn cleanup_before(&self, cutoff: DateTime<Utc>) -> Vec<SessionId> {
        let removed = self.repository.purge_inactive(cutoff).await;
        if !removed.is_empty() {
            info!(removed = removed.len(), "Swept idle sessions");
        }
        removed
    }

    /// Sessions evicted for capacity since the last drain
    pub async fn drain_evicted(&self) -> Vec<SessionId> {
        self.repository.drain_evicted().await
    }

    /// Number of live sessions
    pub async fn count(&self) -> usize {
        self.repository.count().await
    }

    pub async fn stats(&self) -> RepositoryStats {
        self.repository.stats().await
    }
}

/// Activity cutoff for an idle age measured back from `now`
pub fn idle_cutoff(now: DateTime<Utc>, max_age: Duration) -> DateTime<Utc> {
    match chrono::Duration::from_std(max_age) {
        Ok(age) => now.checked_sub_signed(age).unwrap_or(DateTime::<Utc>::MIN_UTC),
        Err(_) => DateTime::<Utc>::MIN_UTC,
    }
}
