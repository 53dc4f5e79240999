//! Explicit login-to-destination state machine.
//!
//! ```text
//! LoggedOut ──Submit──▶ Authenticating ──LoginSucceeded──▶ RoutingDecision
//!     ▲                       │                              │  │   │
//!     └──────LoginRejected────┘                     Navigate │  │   │ Deny
//!     │                                                      ▼  │   ▼
//!     └──Resume──────────────────────────────────▶  Redirecting │  Denied ──Retry──▶ RoutingDecision
//!                                                        Admit  ▼
//!                                                          Authorized
//! ```
//!
//! `Logout` is accepted from every state. Invalid transitions are reported,
//! never panicked on, and leave the machine where it was.

use thiserror::Error;

use hotelgate_auth::Identity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    UnknownRole(String),
    Unreachable(String),
    RoleMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    LoggedOut { error: Option<String> },
    Authenticating,
    RoutingDecision { identity: Identity },
    Redirecting { target: String },
    Authorized { identity: Identity },
    Denied { identity: Identity, reason: DenyReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    Submit,
    LoginSucceeded(Identity),
    LoginRejected(String),
    /// A session already exists when the flow starts.
    Resume(Identity),
    Navigate(String),
    Admit,
    Deny(DenyReason),
    Retry,
    Logout,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("invalid transition: {event} in state {from}")]
    InvalidTransition { from: &'static str, event: &'static str },
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::LoggedOut { .. } => "LoggedOut",
            FlowState::Authenticating => "Authenticating",
            FlowState::RoutingDecision { .. } => "RoutingDecision",
            FlowState::Redirecting { .. } => "Redirecting",
            FlowState::Authorized { .. } => "Authorized",
            FlowState::Denied { .. } => "Denied",
        }
    }

    /// Redirecting and Authorized end the flow for this browsing context.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Redirecting { .. } | FlowState::Authorized { .. })
    }

    pub fn apply(&self, event: FlowEvent) -> Result<FlowState, FlowError> {
        use FlowEvent as E;
        use FlowState as S;

        let next = match (self, event) {
            (_, E::Logout) => S::LoggedOut { error: None },
            (S::LoggedOut { .. }, E::Submit) => S::Authenticating,
            (S::LoggedOut { .. }, E::Resume(identity)) => S::RoutingDecision { identity },
            (S::Authenticating, E::LoginSucceeded(identity)) => S::RoutingDecision { identity },
            (S::Authenticating, E::LoginRejected(message)) => S::LoggedOut { error: Some(message) },
            (S::RoutingDecision { .. }, E::Navigate(target)) => S::Redirecting { target },
            (S::RoutingDecision { identity }, E::Admit) => S::Authorized {
                identity: identity.clone(),
            },
            (S::RoutingDecision { identity }, E::Deny(reason)) => S::Denied {
                identity: identity.clone(),
                reason,
            },
            // Manual link chosen from the fallback or manual-choice view.
            (S::Denied { .. }, E::Navigate(target)) => S::Redirecting { target },
            (
                S::Denied {
                    identity,
                    reason: DenyReason::Unreachable(_),
                },
                E::Retry,
            ) => S::RoutingDecision {
                identity: identity.clone(),
            },
            (state, event) => {
                return Err(FlowError::InvalidTransition {
                    from: state.name(),
                    event: event.name(),
                });
            }
        };
        Ok(next)
    }
}

impl FlowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FlowEvent::Submit => "Submit",
            FlowEvent::LoginSucceeded(_) => "LoginSucceeded",
            FlowEvent::LoginRejected(_) => "LoginRejected",
            FlowEvent::Resume(_) => "Resume",
            FlowEvent::Navigate(_) => "Navigate",
            FlowEvent::Admit => "Admit",
            FlowEvent::Deny(_) => "Deny",
            FlowEvent::Retry => "Retry",
            FlowEvent::Logout => "Logout",
        }
    }
}

/// Holds the current [`FlowState`] and applies events to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMachine {
    state: FlowState,
}

impl FlowMachine {
    pub fn new() -> Self {
        Self {
            state: FlowState::LoggedOut { error: None },
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn fire(&mut self, event: FlowEvent) -> Result<&FlowState, FlowError> {
        let event_name = event.name();
        let next = self.state.apply(event)?;
        tracing::debug!(from = self.state.name(), to = next.name(), event = event_name, "flow transition");
        self.state = next;
        Ok(&self.state)
    }
}

impl Default for FlowMachine {
    fn default() -> Self {
        Self::new()
    }
}
