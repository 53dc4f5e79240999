use hotelgate_auth::{Identity, KnownRole};

/// Identity admitted by a service guard.
///
/// Present on every request that reached a guarded handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    service: KnownRole,
    identity: Identity,
}

impl IdentityContext {
    pub fn new(service: KnownRole, identity: Identity) -> Self {
        Self { service, identity }
    }

    pub fn service(&self) -> KnownRole {
        self.service
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
