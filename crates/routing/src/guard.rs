//! Per-service gate mounted at the root of every role-service.
//!
//! The guard is evaluated exactly once per mount:
//!
//! ```text
//! Checking ──(session matches role)──────────────▶ Authorized
//!    │
//!    ├──(no session)─────────────────────────────▶ Redirecting (nothing cleared)
//!    └──(torn / unreadable / other role)── clear ─▶ Redirecting
//! ```
//!
//! A redirect always targets the login page and is never explained to the
//! user: permission denial and a missing session look the same.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use hotelgate_auth::{Identity, JwtValidator, KnownRole, Session};
use hotelgate_core::GateError;
use hotelgate_session::{SessionError, SessionManager};

use crate::flow::{DenyReason, FlowEvent};
use crate::navigator::Navigator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    Redirecting {
        target: String,
        /// Whether the stored entries were cleared on the way out.
        cleared: bool,
        reason: GateError,
    },
    Authorized {
        identity: Identity,
    },
}

/// What the mounted service may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardView<'a> {
    /// Neutral loading indicator; used while checking and while leaving.
    Loading,
    Children(&'a Identity),
}

/// Outcome of the guard rule, before any side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Admit(Identity),
    Redirect { clear: bool, reason: GateError },
}

/// The guard rule as a pure function of the stored session.
pub fn decide(required: KnownRole, stored: Result<Session, SessionError>) -> Verdict {
    match stored {
        Err(SessionError::Absent) => Verdict::Redirect {
            clear: false,
            reason: GateError::SessionAbsent,
        },
        // Torn or unreadable leftovers are cleared so the next read is clean.
        Err(e) => Verdict::Redirect {
            clear: true,
            reason: e.into(),
        },
        Ok(session) if session.identity.role.known() == Some(required) => Verdict::Admit(session.identity),
        Ok(session) => Verdict::Redirect {
            clear: true,
            reason: GateError::RoleMismatch {
                required: required.to_string(),
                found: session.identity.role.to_string(),
            },
        },
    }
}

pub struct Guard {
    required: KnownRole,
    login_url: String,
    sessions: SessionManager,
    navigator: Arc<dyn Navigator>,
    handoff: Option<Arc<dyn JwtValidator>>,
    state: GuardState,
}

impl Guard {
    pub fn new(
        required: KnownRole,
        login_url: impl Into<String>,
        sessions: SessionManager,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            required,
            login_url: login_url.into(),
            sessions,
            navigator,
            handoff: None,
            state: GuardState::Checking,
        }
    }

    /// Accept signed handoff tokens addressed to this service.
    pub fn with_handoff_validator(mut self, validator: Arc<dyn JwtValidator>) -> Self {
        self.handoff = Some(validator);
        self
    }

    pub fn required_role(&self) -> KnownRole {
        self.required
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            GuardState::Authorized { identity } => Some(identity),
            _ => None,
        }
    }

    pub fn view(&self) -> GuardView<'_> {
        match self.identity() {
            Some(identity) => GuardView::Children(identity),
            None => GuardView::Loading,
        }
    }

    /// Evaluate the rule against this origin's session store.
    ///
    /// Only the first call has an effect; later calls return the settled
    /// state. A new mount needs a new guard.
    pub fn mount(&mut self) -> &GuardState {
        if self.state != GuardState::Checking {
            return &self.state;
        }

        let verdict = decide(self.required, self.sessions.load());
        self.settle(verdict)
    }

    /// Like [`Guard::mount`], but first consume a handoff token.
    ///
    /// A valid token seeds this origin's store with the identity it carries
    /// (the token itself becomes the local credential). An invalid token is
    /// ignored and the local store decides alone.
    pub fn mount_with_handoff(&mut self, token: &str, now: DateTime<Utc>) -> &GuardState {
        if self.state != GuardState::Checking {
            return &self.state;
        }

        match &self.handoff {
            Some(validator) => match validator.validate(token, now) {
                Ok(claims) => {
                    let session = Session::new(claims.identity, token);
                    if let Err(e) = self.sessions.set(&session) {
                        tracing::warn!("failed to store handed-off session: {e}");
                    }
                }
                Err(e) => tracing::warn!(required = %self.required, "ignoring handoff token: {e}"),
            },
            None => tracing::warn!(required = %self.required, "handoff token presented but no validator configured"),
        }

        self.mount()
    }

    /// Event for the login flow state machine, once settled.
    pub fn flow_event(&self) -> Option<FlowEvent> {
        match &self.state {
            GuardState::Checking => None,
            GuardState::Authorized { .. } => Some(FlowEvent::Admit),
            GuardState::Redirecting {
                reason: GateError::RoleMismatch { .. },
                ..
            } => Some(FlowEvent::Deny(DenyReason::RoleMismatch)),
            GuardState::Redirecting { .. } => Some(FlowEvent::Logout),
        }
    }

    fn settle(&mut self, verdict: Verdict) -> &GuardState {
        self.state = match verdict {
            Verdict::Admit(identity) => {
                tracing::debug!(required = %self.required, user = %identity.username, "guard authorized");
                GuardState::Authorized { identity }
            }
            Verdict::Redirect { clear, reason } => {
                if clear {
                    if let Err(e) = self.sessions.clear() {
                        tracing::warn!("failed to clear session during eviction: {e}");
                    }
                }
                tracing::info!(required = %self.required, cleared = clear, "guard redirecting to login: {reason}");

                self.navigator.navigate(&self.login_url);
                GuardState::Redirecting {
                    target: self.login_url.clone(),
                    cleared: clear,
                    reason,
                }
            }
        };
        &self.state
    }
}

impl core::fmt::Debug for Guard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Guard")
            .field("required", &self.required)
            .field("login_url", &self.login_url)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use proptest::prelude::*;

    use hotelgate_auth::{HandoffIssuer, Hs256JwtValidator, Role};
    use hotelgate_core::{OriginUrl, UserId};
    use hotelgate_session::{IDENTITY_KEY, InMemoryStorage, StorageBackend, TOKEN_KEY};

    use super::*;
    use crate::navigator::RecordingNavigator;

    const LOGIN: &str = "http://localhost:8080/login";

    fn identity(role: &str) -> Identity {
        Identity {
            id: UserId::new(7),
            username: "sam".into(),
            email: "sam@hotel.com".into(),
            role: Role::new(role.to_string()),
            first_name: "Sam".into(),
            last_name: "Porter".into(),
        }
    }

    fn guard_over(
        required: KnownRole,
        storage: Arc<InMemoryStorage>,
    ) -> (Guard, Arc<RecordingNavigator>, SessionManager) {
        let navigator = Arc::new(RecordingNavigator::new());
        let sessions = SessionManager::from_arc(storage);
        let guard = Guard::new(required, LOGIN, sessions.clone(), navigator.clone());
        (guard, navigator, sessions)
    }

    #[test]
    fn matching_role_renders_children() {
        let storage = Arc::new(InMemoryStorage::new());
        let (mut guard, nav, sessions) = guard_over(KnownRole::FrontDesk, storage);
        sessions.set(&Session::new(identity("FRONT_DESK"), "tok")).unwrap();

        assert_eq!(guard.view(), GuardView::Loading);
        guard.mount();

        assert_eq!(guard.view(), GuardView::Children(&identity("FRONT_DESK")));
        assert_eq!(nav.count(), 0);
        assert!(sessions.is_present());
    }

    #[test]
    fn absent_session_redirects_without_clearing() {
        let storage = Arc::new(InMemoryStorage::with_entries([("other-app", "x")]));
        let (mut guard, nav, _) = guard_over(KnownRole::Admin, storage.clone());

        let state = guard.mount().clone();
        assert_eq!(
            state,
            GuardState::Redirecting {
                target: LOGIN.into(),
                cleared: false,
                reason: GateError::SessionAbsent,
            }
        );
        assert_eq!(nav.visits(), vec![LOGIN.to_string()]);
        assert_eq!(storage.len(), 1);
        assert_eq!(guard.view(), GuardView::Loading);
    }

    #[test]
    fn role_mismatch_evicts_and_redirects() {
        let storage = Arc::new(InMemoryStorage::new());
        let (mut guard, nav, sessions) = guard_over(KnownRole::Admin, storage);
        sessions.set(&Session::new(identity("STOCK_MANAGER"), "tok")).unwrap();

        let state = guard.mount().clone();
        assert!(matches!(
            state,
            GuardState::Redirecting {
                cleared: true,
                reason: GateError::RoleMismatch { .. },
                ..
            }
        ));
        assert!(!sessions.is_present());
        assert_eq!(nav.count(), 1);
        assert_eq!(guard.flow_event(), Some(FlowEvent::Deny(DenyReason::RoleMismatch)));
    }

    #[test]
    fn unparsable_identity_redirects_to_login() {
        let storage = Arc::new(InMemoryStorage::with_entries([
            (IDENTITY_KEY, "{{{"),
            (TOKEN_KEY, "tok"),
        ]));
        let (mut guard, nav, sessions) = guard_over(KnownRole::StockManager, storage.clone());
        assert_eq!(sessions.get(), None);

        let state = guard.mount().clone();
        assert!(matches!(
            state,
            GuardState::Redirecting {
                reason: GateError::SessionMalformed(_),
                ..
            }
        ));
        assert_eq!(nav.last().as_deref(), Some(LOGIN));
        assert!(storage.is_empty());
    }

    #[test]
    fn mount_is_evaluated_once() {
        let storage = Arc::new(InMemoryStorage::new());
        let (mut guard, nav, sessions) = guard_over(KnownRole::Admin, storage);

        guard.mount();
        // A session written after the mount is not picked up by this instance.
        sessions.set(&Session::new(identity("ADMIN"), "tok")).unwrap();
        guard.mount();

        assert!(matches!(guard.state(), GuardState::Redirecting { .. }));
        assert_eq!(nav.count(), 1);
    }

    #[test]
    fn handoff_token_seeds_the_local_store() {
        let login = OriginUrl::parse("http://localhost:8080").unwrap();
        let me = OriginUrl::parse("http://localhost:3000").unwrap();
        let issuer = HandoffIssuer::new(b"k", &login, Duration::seconds(60));
        let validator = Arc::new(Hs256JwtValidator::new(b"k", &login, &me));

        let storage = Arc::new(InMemoryStorage::new());
        let (guard, nav, sessions) = guard_over(KnownRole::Admin, storage);
        let mut guard = guard.with_handoff_validator(validator);

        let now = Utc::now();
        let token = issuer.issue(&identity("ADMIN"), &me, now).unwrap();
        guard.mount_with_handoff(&token, now);

        assert_eq!(guard.identity(), Some(&identity("ADMIN")));
        assert_eq!(sessions.get().unwrap().token, token);
        assert_eq!(nav.count(), 0);
    }

    #[test]
    fn invalid_handoff_falls_back_to_local_store() {
        let login = OriginUrl::parse("http://localhost:8080").unwrap();
        let me = OriginUrl::parse("http://localhost:3000").unwrap();
        let validator = Arc::new(Hs256JwtValidator::new(b"k", &login, &me));

        let storage = Arc::new(InMemoryStorage::new());
        let (guard, nav, _) = guard_over(KnownRole::Admin, storage);
        let mut guard = guard.with_handoff_validator(validator);

        guard.mount_with_handoff("not-a-jwt", Utc::now());
        assert!(matches!(
            guard.state(),
            GuardState::Redirecting {
                reason: GateError::SessionAbsent,
                ..
            }
        ));
        assert_eq!(nav.count(), 1);
    }

    fn arb_role() -> impl Strategy<Value = KnownRole> {
        prop::sample::select(KnownRole::ALL.to_vec())
    }

    fn arb_stored_role() -> impl Strategy<Value = Option<String>> {
        prop::option::of(prop::sample::select(vec![
            "ADMIN".to_string(),
            "FRONT_DESK".to_string(),
            "STOCK_MANAGER".to_string(),
            "GUEST".to_string(),
            "admin".to_string(),
        ]))
    }

    proptest! {
        /// Children render iff the stored role equals the service role;
        /// otherwise the store ends up empty and a redirect is issued.
        #[test]
        fn renders_iff_role_matches(required in arb_role(), stored in arb_stored_role()) {
            let storage = Arc::new(InMemoryStorage::new());
            let (mut guard, nav, sessions) = guard_over(required, storage.clone());
            if let Some(role) = &stored {
                sessions.set(&Session::new(identity(role), "tok")).unwrap();
            }

            guard.mount();

            let matches = stored.as_deref() == Some(required.as_wire());
            prop_assert_eq!(guard.identity().is_some(), matches);
            if matches {
                prop_assert_eq!(nav.count(), 0);
                prop_assert!(sessions.is_present());
            } else {
                prop_assert_eq!(nav.visits(), vec![LOGIN.to_string()]);
                prop_assert!(storage.get_item(IDENTITY_KEY).unwrap().is_none());
                prop_assert!(storage.get_item(TOKEN_KEY).unwrap().is_none());
            }
        }
    }
}
