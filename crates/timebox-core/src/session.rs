//! Forwarding work completions to session storage.
//!
//! [`SessionRecorder`] is the completion sink a host plugs into the timer
//! engine. Every completed work interval is offered to the store exactly
//! once. A failed write becomes a notice for the host to show; it is never
//! retried and never changes timer state.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::storage::SessionRecord;
use crate::timer::{CompletionEvent, CompletionSink, Mode};

/// Payload for the create-session operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSession {
    pub activity_type: String,
    pub duration_secs: u64,
    #[serde(default)]
    pub comment: String,
}

impl NewSession {
    /// Build from a completion. Breaks are not recorded.
    pub fn from_completion(event: &CompletionEvent) -> Option<Self> {
        if event.mode != Mode::Work {
            return None;
        }
        Some(Self {
            activity_type: event.activity_label.clone().unwrap_or_default(),
            duration_secs: event.elapsed_secs,
            comment: event.note.clone().unwrap_or_default(),
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.activity_type.trim().is_empty() {
            return Err(ValidationError::Required("activity_type".into()));
        }
        if self.duration_secs == 0 {
            return Err(ValidationError::Required("duration".into()));
        }
        Ok(())
    }
}

/// Anything that can persist a completed session.
pub trait SessionStore {
    fn create_session(&self, session: &NewSession) -> Result<SessionRecord>;
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn create_session(&self, session: &NewSession) -> Result<SessionRecord> {
        (**self).create_session(session)
    }
}

/// Completion sink that records work sessions.
pub struct SessionRecorder<T> {
    store: T,
    saved: Vec<SessionRecord>,
    notices: Vec<String>,
}

impl<T: SessionStore> SessionRecorder<T> {
    pub fn new(store: T) -> Self {
        Self {
            store,
            saved: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    /// Sessions written since the last call.
    pub fn take_saved(&mut self) -> Vec<SessionRecord> {
        std::mem::take(&mut self.saved)
    }

    /// User-facing failure messages since the last call.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    fn record(&mut self, session: &NewSession) -> Result<SessionRecord> {
        session.validate()?;
        self.store.create_session(session)
    }
}

impl<T: SessionStore> CompletionSink for SessionRecorder<T> {
    fn on_completion(&mut self, event: &CompletionEvent) {
        let Some(session) = NewSession::from_completion(event) else {
            return;
        };
        match self.record(&session) {
            Ok(record) => {
                tracing::info!(
                    id = record.id,
                    activity = %record.activity_type,
                    duration_secs = record.duration_secs,
                    "session saved"
                );
                self.saved.push(record);
            }
            Err(e) => {
                tracing::warn!(activity = %session.activity_type, "failed to save session: {e}");
                self.notices.push(format!("Session was not saved: {e}"));
            }
        }
    }
}
