use std::collections::BTreeMap;

use hotelgate_auth::{KnownRole, Role};
use hotelgate_core::OriginUrl;

/// Role → destination mapping, loaded once at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleRouteMap {
    routes: BTreeMap<KnownRole, OriginUrl>,
}

impl RoleRouteMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, role: KnownRole, origin: OriginUrl) -> Self {
        self.routes.insert(role, origin);
        self
    }

    pub fn insert(&mut self, role: KnownRole, origin: OriginUrl) {
        self.routes.insert(role, origin);
    }

    pub fn destination(&self, role: KnownRole) -> Option<&OriginUrl> {
        self.routes.get(&role)
    }

    /// Resolve a session role. `None` for roles this build does not know and
    /// for known roles without a configured destination.
    pub fn resolve(&self, role: &Role) -> Option<(KnownRole, &OriginUrl)> {
        let known = role.known()?;
        self.routes.get(&known).map(|origin| (known, origin))
    }

    pub fn iter(&self) -> impl Iterator<Item = (KnownRole, &OriginUrl)> {
        self.routes.iter().map(|(role, origin)| (*role, origin))
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
