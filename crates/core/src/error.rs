//! Gate error model.

use thiserror::Error;

/// Failure kinds of the cross-service identity protocol.
///
/// None of these is fatal: every variant maps onto a [`Recovery`] that ends
/// in either a render or a navigation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Nothing is stored for this storage origin.
    #[error("no session present")]
    SessionAbsent,

    /// The stored entries could not be used (parse failure, torn state).
    #[error("session is malformed: {0}")]
    SessionMalformed(String),

    /// The session belongs to a role this service does not serve.
    #[error("role mismatch: service requires {required}, session has {found}")]
    RoleMismatch { required: String, found: String },

    /// The destination for a role did not answer the reachability check.
    #[error("service unreachable: {0}")]
    ServiceUnreachable(String),

    /// The credential exchange refused the supplied credentials.
    #[error("login rejected: {0}")]
    LoginRejected(String),

    /// The session carries a role with no configured destination.
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

/// How a [`GateError`] is resolved.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Clear whatever is stored and send the user back to the login origin.
    /// Nothing is shown to the user.
    EvictAndRedirect,
    /// Stop routing, keep the session and let the user pick a destination.
    ManualChoice,
    /// Show direct links and allow one automatic re-check.
    Fallback,
    /// Render the message next to the login form.
    Inline,
}

impl GateError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::SessionMalformed(msg.into())
    }

    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::ServiceUnreachable(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::LoginRejected(msg.into())
    }

    pub fn recovery(&self) -> Recovery {
        match self {
            GateError::SessionAbsent
            | GateError::SessionMalformed(_)
            | GateError::RoleMismatch { .. } => Recovery::EvictAndRedirect,
            GateError::UnknownRole(_) => Recovery::ManualChoice,
            GateError::ServiceUnreachable(_) => Recovery::Fallback,
            GateError::LoginRejected(_) => Recovery::Inline,
        }
    }

    /// Whether the error may be shown to the end user at all.
    pub fn is_user_visible(&self) -> bool {
        self.recovery() != Recovery::EvictAndRedirect
    }
}
