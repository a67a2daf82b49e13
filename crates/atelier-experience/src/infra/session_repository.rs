//! Session Storage Implementations
//!
//! One record per session holds the metadata, the experience state and the
//! event log, so every view over a session (session store, experience
//! engine, sweep) reads and expires the same record.

use async_trait::async_trait;
use atelier_common::{AtelierError, SessionId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::event::ExperienceEvent;
use crate::domain::state::ExperienceState;

/// Session metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Free-form preference bag
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

impl SessionMetadata {
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            last_activity: now,
            preferences: Map::new(),
        }
    }
}

/// Everything stored for one session
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub metadata: SessionMetadata,
    pub state: ExperienceState,
    /// Append-only interaction log
    pub events: Vec<ExperienceEvent>,
}

impl SessionEntry {
    /// Fresh session with a generated id
    pub fn create() -> Self {
        Self::with_id(SessionId::generate())
    }

    /// Fresh session with a caller-chosen id
    pub fn with_id(id: SessionId) -> Self {
        Self {
            metadata: SessionMetadata::new(id.clone()),
            state: ExperienceState::new(id),
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.metadata.id
    }

    /// Mark the session as active now
    pub fn touch(&mut self) {
        self.metadata.last_activity = Utc::now();
    }

    /// Latest of metadata activity and state mutation
    pub fn last_active(&self) -> DateTime<Utc> {
        self.metadata.last_activity.max(self.state.timestamp)
    }
}

/// In-place mutation applied under exclusive access to one session
pub type SessionMutation<'a> = Box<dyn FnOnce(&mut SessionEntry) + Send + 'a>;

/// Trait for session storage backends
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session
    async fn insert(&self, entry: SessionEntry) -> Result<SessionId, StoreError>;

    /// Get a copy of a session
    async fn get(&self, id: &SessionId) -> Option<SessionEntry>;

    /// Mutate a session in place; no other writer observes a partial update
    async fn modify(&self, id: &SessionId, mutation: SessionMutation<'_>) -> Result<(), StoreError>;

    /// Delete a session
    async fn remove(&self, id: &SessionId) -> Result<SessionEntry, StoreError>;

    /// Check whether a session exists
    async fn contains(&self, id: &SessionId) -> bool;

    /// All stored session ids
    async fn session_ids(&self) -> Vec<SessionId>;

    /// Number of stored sessions
    async fn count(&self) -> usize;

    /// Delete every session last active before `cutoff`; returns removed ids
    async fn purge_inactive(&self, cutoff: DateTime<Utc>) -> Vec<SessionId>;

    /// Aggregate counts over stored sessions
    async fn stats(&self) -> RepositoryStats;

    /// Take the ids evicted for capacity since the last call
    async fn drain_evicted(&self) -> Vec<SessionId>;
}

/// Errors from session store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Session already exists: {0}")]
    AlreadyExists(SessionId),
}

impl From<StoreError> for AtelierError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AtelierError::session_not_found(id.into_inner()),
            StoreError::AlreadyExists(id) => {
                AtelierError::Storage(format!("session already exists: {id}"))
            }
        }
    }
}

/// In-memory storage implementation
///
/// Uses DashMap so each session is guarded by its shard lock during a
/// read-modify-write. When `max_sessions` is reached the least recently
/// active session is evicted and queued until `drain_evicted`.
pub struct InMemorySessionRepository {
    sessions: DashMap<SessionId, SessionEntry>,
    max_sessions: usize,
    evicted: Mutex<Vec<SessionId>>,
}

impl InMemorySessionRepository {
    /// Create a new in-memory repository
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions,
            evicted: Mutex::new(Vec::new()),
        }
    }

    /// Evict least recently active sessions until there is room for one more
    fn evict_if_needed(&self) {
        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.last_active())
                .map(|entry| entry.key().clone());

            match oldest {
                Some(id) => {
                    if self.sessions.remove(&id).is_some() {
                        self.evicted.lock().push(id.clone());
                    }
                    warn!(session_id = %id, "Session capacity reached, evicted least recently active session");
                }
                None => break,
            }
        }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_SESSIONS)
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, entry: SessionEntry) -> Result<SessionId, StoreError> {
        let id = entry.id().clone();

        if self.sessions.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }

        self.evict_if_needed();
        self.sessions.insert(id.clone(), entry);
        debug!(session_id = %id, "Stored session");

        Ok(id)
    }

    async fn get(&self, id: &SessionId) -> Option<SessionEntry> {
        self.sessions.get(id).map(|e| e.clone())
    }

    async fn modify(&self, id: &SessionId, mutation: SessionMutation<'_>) -> Result<(), StoreError> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        mutation(entry.value_mut());
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> Result<SessionEntry, StoreError> {
        self.sessions
            .remove(id)
            .map(|(_, entry)| entry)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    async fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    async fn count(&self) -> usize {
        self.sessions.len()
    }

    async fn purge_inactive(&self, cutoff: DateTime<Utc>) -> Vec<SessionId> {
        let mut removed = Vec::new();

        self.sessions.retain(|id, entry| {
            if entry.last_active() < cutoff {
                removed.push(id.clone());
                false
            } else {
                true
            }
        });

        removed
    }

    async fn stats(&self) -> RepositoryStats {
        let total = self.sessions.len();
        let total_events: usize = self.sessions.iter().map(|e| e.events.len()).sum();
        let with_cart = self
            .sessions
            .iter()
            .filter(|e| !e.state.cart_items.is_empty())
            .count();

        RepositoryStats {
            total_sessions: total,
            total_events,
            sessions_with_cart: with_cart,
            avg_events_per_session: if total > 0 {
                total_events as f32 / total as f32
            } else {
                0.0
            },
            max_sessions: self.max_sessions,
        }
    }

    async fn drain_evicted(&self) -> Vec<SessionId> {
        std::mem::take(&mut *self.evicted.lock())
    }
}

/// Statistics about the session repository
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStats {
    pub total_sessions: usize,
    pub total_events: usize,
    pub sessions_with_cart: usize,
    pub avg_events_per_session: f32,
    pub max_sessions: usize,
}
