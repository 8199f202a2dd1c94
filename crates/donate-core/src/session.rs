//! Session Management
//!
//! One donation wizard per browser session, held server-side.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, WizardError};
use crate::wizard::WizardState;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A donor's wizard session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DonationSession {
    pub id: SessionId,

    pub wizard: WizardState,

    /// A submission is running; further submissions are refused until it ends
    pub pending: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonationSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            wizard: WizardState::new(),
            pending: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Replace the wizard state
    pub fn apply(&mut self, wizard: WizardState) {
        self.wizard = wizard;
        self.touch();
    }
}

impl Default for DonationSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A wizard transition applied inside [`SessionStore::update`]
pub type WizardChange<'a> = Box<dyn FnOnce(&WizardState) -> Result<WizardState> + 'a>;

/// Session store trait for persistence
pub trait SessionStore: Send + Sync {
    /// Save a session
    fn save(&self, session: &DonationSession) -> Result<()>;

    /// Load a session by ID
    fn load(&self, id: &SessionId) -> Result<Option<DonationSession>>;

    /// Delete a session
    fn delete(&self, id: &SessionId) -> Result<()>;

    /// Replace the wizard with the result of `change` under the store's lock.
    /// Fails with `SubmissionInFlight` while a submission is running, and
    /// leaves the session untouched when `change` fails.
    fn update(&self, id: &SessionId, change: WizardChange<'_>) -> Result<DonationSession>;

    /// Mark a session as submitting; fails if a submission is already running
    fn begin_submission(&self, id: &SessionId) -> Result<DonationSession>;

    /// Store the post-submission wizard state and clear the pending flag
    fn finish_submission(&self, id: &SessionId, wizard: WizardState) -> Result<DonationSession>;

    /// Load a session or fail with `SessionNotFound`
    fn require(&self, id: &SessionId) -> Result<DonationSession> {
        self.load(id)?
            .ok_or_else(|| WizardError::SessionNotFound(id.to_string()))
    }
}

/// In-memory session store
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, DonationSession>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> WizardError {
    WizardError::Session("session store lock poisoned".into())
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &DonationSession) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn load(&self, id: &SessionId) -> Result<Option<DonationSession>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(id).cloned())
    }

    fn delete(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.remove(id);
        Ok(())
    }

    fn update(&self, id: &SessionId, change: WizardChange<'_>) -> Result<DonationSession> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| WizardError::SessionNotFound(id.to_string()))?;

        if session.pending {
            return Err(WizardError::SubmissionInFlight);
        }
        let wizard = change(&session.wizard)?;
        session.apply(wizard);
        Ok(session.clone())
    }

    fn begin_submission(&self, id: &SessionId) -> Result<DonationSession> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| WizardError::SessionNotFound(id.to_string()))?;

        if session.pending {
            return Err(WizardError::SubmissionInFlight);
        }
        session.pending = true;
        session.touch();
        Ok(session.clone())
    }

    fn finish_submission(&self, id: &SessionId, wizard: WizardState) -> Result<DonationSession> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| WizardError::SessionNotFound(id.to_string()))?;

        session.pending = false;
        session.apply(wizard);
        Ok(session.clone())
    }
}
