//! Session access over a storage backend.

use std::sync::Arc;

use thiserror::Error;

use hotelgate_auth::{Identity, Session};
use hotelgate_core::GateError;

use crate::backend::{InMemoryStorage, StorageBackend, StorageError};

/// Entry holding the serialized identity object.
pub const IDENTITY_KEY: &str = "hotel-inventory-user";

/// Entry holding the opaque credential token.
pub const TOKEN_KEY: &str = "hotel-inventory-token";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session present")]
    Absent,

    #[error("torn session: {0}")]
    Torn(&'static str),

    #[error("identity entry is unreadable: {0}")]
    Unparsable(String),

    #[error("failed to serialize identity: {0}")]
    Serialize(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<SessionError> for GateError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::Absent => GateError::SessionAbsent,
            other => GateError::malformed(other.to_string()),
        }
    }
}

/// Reads and writes the identity+token pair.
///
/// Writes are two separate entry writes; a reader racing a writer may see
/// only one of them, which every read path reports as "no session".
#[derive(Clone)]
pub struct SessionManager {
    backend: Arc<dyn StorageBackend>,
}

impl SessionManager {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn from_arc(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(InMemoryStorage::new())
    }

    /// Diagnostic read: tells an empty store apart from a broken one.
    pub fn load(&self) -> Result<Session, SessionError> {
        let identity = non_empty(self.backend.get_item(IDENTITY_KEY)?);
        let token = non_empty(self.backend.get_item(TOKEN_KEY)?);

        match (identity, token) {
            (None, None) => Err(SessionError::Absent),
            (Some(_), None) => Err(SessionError::Torn("identity without token")),
            (None, Some(_)) => Err(SessionError::Torn("token without identity")),
            (Some(raw), Some(token)) => {
                let identity: Identity =
                    serde_json::from_str(&raw).map_err(|e| SessionError::Unparsable(e.to_string()))?;
                Ok(Session::new(identity, token))
            }
        }
    }

    /// The current session, or `None` for anything short of a complete,
    /// parseable pair. Never fails.
    pub fn get(&self) -> Option<Session> {
        match self.load() {
            Ok(session) => Some(session),
            Err(SessionError::Absent) => None,
            Err(e) => {
                tracing::debug!("treating stored session as absent: {e}");
                None
            }
        }
    }

    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }

    pub fn set(&self, session: &Session) -> Result<(), SessionError> {
        let identity =
            serde_json::to_string(&session.identity).map_err(|e| SessionError::Serialize(e.to_string()))?;
        self.backend.set_item(IDENTITY_KEY, &identity)?;
        self.backend.set_item(TOKEN_KEY, &session.token)?;
        Ok(())
    }

    /// Remove both entries. Clearing an empty store is a no-op.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.backend.remove_item(IDENTITY_KEY)?;
        self.backend.remove_item(TOKEN_KEY)?;
        Ok(())
    }
}

impl core::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
