//! Experience Engine
//!
//! Owns the per-session shopping state: appends events to the session log
//! and applies the transition table under exclusive access to the session.

use std::sync::Arc;

use atelier_common::{AtelierError, Result, SessionId};
use tracing::{debug, instrument};

use crate::domain::event::ExperienceEvent;
use crate::domain::personalization::PersonalizedExperience;
use crate::domain::state::{ExperienceState, StateUpdate};
use crate::domain::transition::Transition;
use crate::infra::session_repository::{SessionEntry, SessionRepository};

/// Event-driven shopping state engine
pub struct ExperienceEngine {
    repository: Arc<dyn SessionRepository>,
}

impl ExperienceEngine {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Start a session with empty state in browse mode
    #[instrument(skip(self))]
    pub async fn create_session(&self) -> Result<SessionId> {
        let id = self.repository.insert(SessionEntry::create()).await?;
        debug!(session_id = %id, "Experience session created");
        Ok(id)
    }

    /// Current state snapshot (never includes the event log)
    pub async fn get_state(&self, id: &SessionId) -> Option<ExperienceState> {
        self.repository.get(id).await.map(|entry| entry.state)
    }

    /// Merge a partial update into the session state
    #[instrument(skip(self, update), fields(session_id = %id))]
    pub async fn update_state(&self, id: &SessionId, update: StateUpdate) -> Result<ExperienceState> {
        let mut snapshot = None;
        self.repository
            .modify(
                id,
                Box::new(|entry| {
                    entry.state.apply_update(update);
                    entry.touch();
                    snapshot = Some(entry.state.clone());
                }),
            )
            .await?;

        snapshot.ok_or_else(|| AtelierError::session_not_found(id.as_str()))
    }

    /// Append an event to the session log and apply its transition
    #[instrument(skip(self, event), fields(session_id = %id, kind = %event.kind))]
    pub async fn record_event(&self, id: &SessionId, event: ExperienceEvent) -> Result<ExperienceState> {
        let transition = Transition::for_event(&event);
        debug!(?transition, "Applying transition");

        let mut snapshot = None;
        self.repository
            .modify(
                id,
                Box::new(|entry| {
                    entry.events.push(event);
                    transition.apply(&mut entry.state);
                    entry.touch();
                    snapshot = Some(entry.state.clone());
                }),
            )
            .await?;

        snapshot.ok_or_else(|| AtelierError::session_not_found(id.as_str()))
    }

    /// Derive personalization from the session's state and event history
    pub async fn get_personalized_experience(&self, id: &SessionId) -> Result<PersonalizedExperience> {
        let entry = self
            .repository
            .get(id)
            .await
            .ok_or_else(|| AtelierError::session_not_found(id.as_str()))?;

        Ok(PersonalizedExperience::derive(&entry.state, &entry.events))
    }

    /// Copy of the session's event log
    pub async fn session_events(&self, id: &SessionId) -> Result<Vec<ExperienceEvent>> {
        self.repository
            .get(id)
            .await
            .map(|entry| entry.events)
            .ok_or_else(|| AtelierError::session_not_found(id.as_str()))
    }
}
