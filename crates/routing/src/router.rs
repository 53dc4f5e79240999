//! Post-login role router.
//!
//! Reads the session just written by the login flow, maps its role to a
//! destination origin, checks that the destination answers and then
//! navigates there exactly once. If the destination does not answer, no
//! navigation happens; the caller gets direct links instead.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use hotelgate_auth::{HandoffIssuer, Identity, KnownRole};
use hotelgate_core::{GateError, OriginUrl};
use hotelgate_session::SessionManager;

use crate::config::LinkScope;
use crate::flow::{DenyReason, FlowEvent};
use crate::navigator::Navigator;
use crate::probe::{ProbePolicy, ReachabilityProbe, probe_with_policy};
use crate::route_map::RoleRouteMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Wait between a successful probe and the navigation.
    pub settle: Duration,
    /// Wait before an automatic re-check after a failed probe.
    pub cooldown: Duration,
    /// Automatic re-checks performed by [`RoleRouter::run`].
    pub rechecks: u32,
    pub link_scope: LinkScope,
    pub probe_policy: ProbePolicy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(1_000),
            cooldown: Duration::from_millis(2_000),
            rechecks: 1,
            link_scope: LinkScope::CurrentRole,
            probe_policy: ProbePolicy::default(),
        }
    }
}

/// A direct link to a role-service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceLink {
    pub role: KnownRole,
    pub label: String,
    pub href: String,
}

impl ServiceLink {
    fn new(role: KnownRole, href: String) -> Self {
        Self {
            role,
            label: format!("Go to {} Dashboard", role.service_label()),
            href,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoutingOutcome {
    Navigated {
        role: KnownRole,
        target: String,
    },
    Fallback {
        role: KnownRole,
        links: Vec<ServiceLink>,
        retry_after_ms: u64,
        reason: String,
    },
    /// The session role has no destination; the session is left as is.
    ManualChoice {
        role: String,
        links: Vec<ServiceLink>,
    },
    SignedOut {
        target: String,
    },
}

impl RoutingOutcome {
    pub fn error(&self) -> Option<GateError> {
        match self {
            RoutingOutcome::Navigated { .. } => None,
            RoutingOutcome::Fallback { reason, .. } => Some(GateError::unreachable(reason.clone())),
            RoutingOutcome::ManualChoice { role, .. } => Some(GateError::UnknownRole(role.clone())),
            RoutingOutcome::SignedOut { .. } => Some(GateError::SessionAbsent),
        }
    }

    pub fn flow_event(&self) -> FlowEvent {
        match self {
            RoutingOutcome::Navigated { target, .. } => FlowEvent::Navigate(target.clone()),
            RoutingOutcome::Fallback { reason, .. } => FlowEvent::Deny(DenyReason::Unreachable(reason.clone())),
            RoutingOutcome::ManualChoice { role, .. } => FlowEvent::Deny(DenyReason::UnknownRole(role.clone())),
            RoutingOutcome::SignedOut { .. } => FlowEvent::Logout,
        }
    }

    pub fn links(&self) -> &[ServiceLink] {
        match self {
            RoutingOutcome::Fallback { links, .. } | RoutingOutcome::ManualChoice { links, .. } => links,
            _ => &[],
        }
    }
}

pub struct RoleRouter {
    sessions: SessionManager,
    routes: RoleRouteMap,
    login_url: String,
    probe: Arc<dyn ReachabilityProbe>,
    navigator: Arc<dyn Navigator>,
    config: RouterConfig,
    handoff: Option<HandoffIssuer>,
}

impl RoleRouter {
    pub fn new(
        sessions: SessionManager,
        routes: RoleRouteMap,
        login_url: impl Into<String>,
        probe: Arc<dyn ReachabilityProbe>,
        navigator: Arc<dyn Navigator>,
        config: RouterConfig,
    ) -> Self {
        Self {
            sessions,
            routes,
            login_url: login_url.into(),
            probe,
            navigator,
            config,
            handoff: None,
        }
    }

    /// Attach a signed handoff token to every navigation towards the
    /// user's own destination.
    pub fn with_handoff(mut self, issuer: HandoffIssuer) -> Self {
        self.handoff = Some(issuer);
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// One routing decision: probe, settle, navigate; or fall back.
    pub async fn route(&self) -> RoutingOutcome {
        let Some(session) = self.sessions.get() else {
            tracing::info!("no session to route; sending to login");
            self.navigator.navigate(&self.login_url);
            return RoutingOutcome::SignedOut {
                target: self.login_url.clone(),
            };
        };
        let identity = session.identity;

        let Some((role, origin)) = self.routes.resolve(&identity.role) else {
            tracing::warn!(role = %identity.role, user = %identity.username, "no destination for role");
            return RoutingOutcome::ManualChoice {
                role: identity.role.to_string(),
                links: self.links(None, &identity),
            };
        };

        if let Err(e) = probe_with_policy(self.probe.as_ref(), origin, &self.config.probe_policy).await {
            tracing::warn!(%role, origin = %origin, "destination unreachable: {e}");
            return RoutingOutcome::Fallback {
                role,
                links: self.links(Some(role), &identity),
                retry_after_ms: u64::try_from(self.config.cooldown.as_millis()).unwrap_or(u64::MAX),
                reason: e.to_string(),
            };
        }

        tokio::time::sleep(self.config.settle).await;

        let target = self.target_for(&identity, role, origin);
        tracing::info!(%role, origin = %origin, user = %identity.username, "routing to destination");
        self.navigator.navigate(&target);
        RoutingOutcome::Navigated { role, target }
    }

    /// [`RoleRouter::route`], re-checked after the cooldown while the
    /// destination stays unreachable, up to `rechecks` times.
    pub async fn run(&self) -> RoutingOutcome {
        let mut outcome = self.route().await;
        let mut remaining = self.config.rechecks;

        while remaining > 0 && matches!(outcome, RoutingOutcome::Fallback { .. }) {
            tokio::time::sleep(self.config.cooldown).await;
            remaining -= 1;
            tracing::info!(remaining, "re-checking destination after cooldown");
            outcome = self.route().await;
        }

        outcome
    }

    fn links(&self, current: Option<KnownRole>, identity: &Identity) -> Vec<ServiceLink> {
        self.routes
            .iter()
            .filter(|(role, _)| match (self.config.link_scope, current) {
                (LinkScope::CurrentRole, Some(current)) => *role == current,
                _ => true,
            })
            .map(|(role, origin)| ServiceLink::new(role, self.target_for(identity, role, origin)))
            .collect()
    }

    /// Navigation target for `role`. Carries a handoff token only when the
    /// destination serves the user's own role.
    fn target_for(&self, identity: &Identity, role: KnownRole, origin: &OriginUrl) -> String {
        let issuer = match &self.handoff {
            Some(issuer) if identity.role.known() == Some(role) => issuer,
            _ => return origin.as_str().to_string(),
        };

        match issuer.issue(identity, origin, Utc::now()) {
            Ok(token) => origin.with_query("handoff", &token),
            Err(e) => {
                tracing::warn!(%role, "navigating without handoff token: {e}");
                origin.as_str().to_string()
            }
        }
    }
}

impl core::fmt::Debug for RoleRouter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RoleRouter")
            .field("routes", &self.routes)
            .field("login_url", &self.login_url)
            .field("config", &self.config)
            .field("handoff", &self.handoff.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;

    use hotelgate_auth::{Hs256JwtValidator, JwtValidator, Role, Session};
    use hotelgate_core::UserId;
    use hotelgate_session::InMemoryStorage;

    use super::*;
    use crate::navigator::RecordingNavigator;
    use crate::probe::ProbeError;

    const LOGIN: &str = "http://localhost:8080/login";

    /// Fails the first `failures` probes, then answers.
    struct ScriptedProbe {
        failures: u32,
        calls: AtomicU32,
    }

    impl ScriptedProbe {
        fn up() -> Arc<Self> {
            Self::failing(0)
        }

        fn failing(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReachabilityProbe for ScriptedProbe {
        async fn probe(&self, _target: &OriginUrl) -> Result<(), ProbeError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(ProbeError::Network("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    fn origin(s: &str) -> OriginUrl {
        OriginUrl::parse(s).unwrap()
    }

    fn routes() -> RoleRouteMap {
        RoleRouteMap::new()
            .with_route(KnownRole::Admin, origin("http://localhost:3000"))
            .with_route(KnownRole::StockManager, origin("http://localhost:3002"))
            .with_route(KnownRole::FrontDesk, origin("http://localhost:3003"))
    }

    fn identity(role: &str) -> Identity {
        Identity {
            id: UserId::new(2),
            username: "inspector".into(),
            email: "inspector@hotel.com".into(),
            role: Role::new(role.to_string()),
            first_name: "Stock".into(),
            last_name: "Inspector".into(),
        }
    }

    struct Harness {
        router: RoleRouter,
        nav: Arc<RecordingNavigator>,
        storage: Arc<InMemoryStorage>,
    }

    fn harness(role: Option<&str>, probe: Arc<ScriptedProbe>, config: RouterConfig) -> Harness {
        let storage = Arc::new(InMemoryStorage::new());
        let sessions = SessionManager::from_arc(storage.clone());
        if let Some(role) = role {
            sessions.set(&Session::new(identity(role), "tok-2")).unwrap();
        }
        let nav = Arc::new(RecordingNavigator::new());
        let router = RoleRouter::new(sessions, routes(), LOGIN, probe, nav.clone(), config);
        Harness { router, nav, storage }
    }

    #[tokio::test(start_paused = true)]
    async fn reachable_destination_is_navigated_once_after_settle() {
        let h = harness(Some("ADMIN"), ScriptedProbe::up(), RouterConfig::default());

        let started = tokio::time::Instant::now();
        let outcome = h.router.route().await;

        assert_eq!(
            outcome,
            RoutingOutcome::Navigated {
                role: KnownRole::Admin,
                target: "http://localhost:3000".into()
            }
        );
        assert_eq!(started.elapsed(), Duration::from_millis(1_000));
        assert_eq!(h.nav.visits(), vec!["http://localhost:3000".to_string()]);
        assert_eq!(outcome.flow_event(), FlowEvent::Navigate("http://localhost:3000".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_does_not_happen_before_settle_elapses() {
        let h = harness(Some("ADMIN"), ScriptedProbe::up(), RouterConfig::default());
        let router = Arc::new(h.router);

        let task = tokio::spawn({
            let router = router.clone();
            async move { router.route().await }
        });

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(h.nav.count(), 0);

        task.await.unwrap();
        assert_eq!(h.nav.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_destination_offers_its_own_link() {
        let probe = ScriptedProbe::failing(u32::MAX);
        let h = harness(Some("STOCK_MANAGER"), probe.clone(), RouterConfig::default());

        let outcome = h.router.route().await;

        let RoutingOutcome::Fallback {
            role,
            links,
            retry_after_ms,
            ..
        } = &outcome
        else {
            panic!("expected fallback, got {outcome:?}");
        };
        assert_eq!(*role, KnownRole::StockManager);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "http://localhost:3002");
        assert_eq!(links[0].label, "Go to Inspector Dashboard");
        assert_eq!(*retry_after_ms, 2_000);
        assert_eq!(h.nav.count(), 0);
        assert_eq!(probe.calls(), 1);
        assert!(matches!(outcome.error(), Some(GateError::ServiceUnreachable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_can_list_every_service() {
        let config = RouterConfig {
            link_scope: LinkScope::All,
            ..RouterConfig::default()
        };
        let h = harness(Some("FRONT_DESK"), ScriptedProbe::failing(u32::MAX), config);

        let outcome = h.router.route().await;
        let hrefs: Vec<&str> = outcome.links().iter().map(|l| l.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec!["http://localhost:3000", "http://localhost:3003", "http://localhost:3002"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_role_stops_without_touching_the_session() {
        let probe = ScriptedProbe::up();
        let h = harness(Some("NIGHT_AUDITOR"), probe.clone(), RouterConfig::default());
        let before = h.storage.len();

        let outcome = h.router.route().await;

        assert!(matches!(&outcome, RoutingOutcome::ManualChoice { role, links } if role == "NIGHT_AUDITOR" && links.len() == 3));
        assert_eq!(h.nav.count(), 0);
        assert_eq!(probe.calls(), 0);
        assert_eq!(h.storage.len(), before);
        assert!(h.router.sessions.is_present());
        assert_eq!(outcome.error(), Some(GateError::UnknownRole("NIGHT_AUDITOR".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_session_goes_to_login() {
        let h = harness(None, ScriptedProbe::up(), RouterConfig::default());

        let outcome = h.router.route().await;

        assert_eq!(outcome, RoutingOutcome::SignedOut { target: LOGIN.into() });
        assert_eq!(h.nav.visits(), vec![LOGIN.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn run_rechecks_once_after_cooldown() {
        let probe = ScriptedProbe::failing(1);
        let h = harness(Some("STOCK_MANAGER"), probe.clone(), RouterConfig::default());

        let started = tokio::time::Instant::now();
        let outcome = h.router.run().await;

        assert!(matches!(outcome, RoutingOutcome::Navigated { role: KnownRole::StockManager, .. }));
        // cooldown, then settle
        assert_eq!(started.elapsed(), Duration::from_millis(3_000));
        assert_eq!(probe.calls(), 2);
        assert_eq!(h.nav.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_gives_up_after_configured_rechecks() {
        let probe = ScriptedProbe::failing(u32::MAX);
        let h = harness(Some("ADMIN"), probe.clone(), RouterConfig::default());

        let outcome = h.router.run().await;

        assert!(matches!(outcome, RoutingOutcome::Fallback { .. }));
        assert_eq!(probe.calls(), 2);
        assert_eq!(h.nav.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn handoff_token_is_addressed_to_the_destination() {
        let login = origin("http://localhost:8080");
        let issuer = HandoffIssuer::new(b"shared", &login, ChronoDuration::seconds(60));
        let h = harness(Some("FRONT_DESK"), ScriptedProbe::up(), RouterConfig::default());
        let router = h.router.with_handoff(issuer);

        let RoutingOutcome::Navigated { target, .. } = router.route().await else {
            panic!("expected navigation");
        };

        let token = target
            .strip_prefix("http://localhost:3003?handoff=")
            .expect("handoff query");
        let validator = Hs256JwtValidator::new(b"shared", &login, &origin("http://localhost:3003"));
        let claims = validator.validate(token, Utc::now()).unwrap();
        assert_eq!(claims.identity, identity("FRONT_DESK"));
        assert_eq!(h.nav.last(), Some(target.clone()));
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let outcome = RoutingOutcome::SignedOut { target: LOGIN.into() };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "signed_out");
    }
}
