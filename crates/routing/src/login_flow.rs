//! Login flow: credential exchange, session write, then routing.

use std::sync::Arc;

use hotelgate_auth::{CredentialExchange, Credentials, Identity, LoginError, Session};
use hotelgate_session::SessionManager;

use crate::flow::{FlowEvent, FlowMachine, FlowState};
use crate::router::{RoleRouter, RoutingOutcome};

pub struct LoginFlow {
    exchange: Arc<dyn CredentialExchange>,
    sessions: SessionManager,
    machine: FlowMachine,
}

impl LoginFlow {
    pub fn new(exchange: Arc<dyn CredentialExchange>, sessions: SessionManager) -> Self {
        Self {
            exchange,
            sessions,
            machine: FlowMachine::new(),
        }
    }

    pub fn state(&self) -> &FlowState {
        self.machine.state()
    }

    /// Pick up a session written earlier (e.g. page reload on the login
    /// origin) and move straight to the routing decision.
    pub fn resume(&mut self) -> Option<Identity> {
        let session = self.sessions.get()?;
        self.restart();
        self.fire(FlowEvent::Resume(session.identity.clone()));
        Some(session.identity)
    }

    /// Exchange credentials and store the resulting session.
    ///
    /// Incomplete credentials are refused before any exchange and leave the
    /// state alone. A rejection returns the flow to `LoggedOut` carrying the
    /// inline message.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<Session, LoginError> {
        if !credentials.is_complete() {
            return Err(LoginError::Incomplete);
        }

        self.restart();
        self.fire(FlowEvent::Submit);

        let session = match self.exchange.exchange(credentials).await {
            Ok(session) => session,
            Err(e) => {
                tracing::info!(username = %credentials.username, "login rejected: {e}");
                self.fire(FlowEvent::LoginRejected(e.inline_message()));
                return Err(e);
            }
        };

        if let Err(e) = self.sessions.set(&session) {
            let err = LoginError::Persist(e.to_string());
            tracing::error!(username = %credentials.username, "{err}");
            self.fire(FlowEvent::LoginRejected(err.inline_message()));
            return Err(err);
        }

        tracing::info!(username = %session.identity.username, role = %session.identity.role, "login succeeded");
        self.fire(FlowEvent::LoginSucceeded(session.identity.clone()));
        Ok(session)
    }

    /// Hand the stored session to the router and record where it ended up.
    pub async fn route(&mut self, router: &RoleRouter) -> RoutingOutcome {
        let outcome = router.run().await;
        self.fire(outcome.flow_event());
        outcome
    }

    /// A new attempt starts from `LoggedOut`, whatever an earlier (possibly
    /// abandoned) attempt left behind.
    fn restart(&mut self) {
        if !matches!(self.machine.state(), FlowState::LoggedOut { .. }) {
            self.fire(FlowEvent::Logout);
        }
    }

    fn fire(&mut self, event: FlowEvent) {
        if let Err(e) = self.machine.fire(event) {
            tracing::warn!("login flow: {e}");
        }
    }
}

impl core::fmt::Debug for LoginFlow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginFlow")
            .field("state", self.machine.state())
            .finish_non_exhaustive()
    }
}
