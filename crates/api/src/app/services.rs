//! Shared collaborators of every handler.

use std::sync::Arc;

use hotelgate_auth::{CredentialExchange, StaticDirectory, TokenRevoker};
use hotelgate_routing::{GateConfig, Navigator, ReachabilityProbe, RoleRouter};
use hotelgate_session::SessionManager;
use hotelgate_shell::{ShellComposer, ShellTable};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    pub exchange: Arc<dyn CredentialExchange>,
    pub revoker: Option<Arc<dyn TokenRevoker>>,
    pub probe: Arc<dyn ReachabilityProbe>,
    pub shell: Arc<ShellComposer>,
}

impl AppState {
    /// Wire the demo directory as both credential exchange and revoker.
    pub fn new(config: GateConfig, shell: ShellTable) -> Self {
        let directory = Arc::new(StaticDirectory::demo());
        Self {
            probe: config.probe(),
            config: Arc::new(config),
            exchange: directory.clone(),
            revoker: Some(directory),
            shell: Arc::new(ShellComposer::new(shell).mounted_at("/shell")),
        }
    }

    pub fn with_exchange(
        mut self,
        exchange: Arc<dyn CredentialExchange>,
        revoker: Option<Arc<dyn TokenRevoker>>,
    ) -> Self {
        self.exchange = exchange;
        self.revoker = revoker;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn ReachabilityProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn login_url(&self) -> String {
        self.config.login_url()
    }

    /// A router over `sessions` for one request.
    pub fn role_router(&self, sessions: SessionManager, navigator: Arc<dyn Navigator>) -> RoleRouter {
        let router = RoleRouter::new(
            sessions,
            self.config.routes.clone(),
            self.login_url(),
            self.probe.clone(),
            navigator,
            self.config.router_config(),
        );
        match self.config.handoff_issuer() {
            Some(issuer) => router.with_handoff(issuer),
            None => router,
        }
    }
}
