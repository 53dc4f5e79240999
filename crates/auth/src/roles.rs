use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role string as it travels in a session.
///
/// Roles stay opaque at this layer so that a session carrying a role this
/// build does not know still loads; callers resolve it with [`Role::known`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn known(&self) -> Option<KnownRole> {
        KnownRole::from_wire(self.as_str())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<KnownRole> for Role {
    fn from(value: KnownRole) -> Self {
        Role::new(value.as_wire())
    }
}

/// The roles that own a deployed service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KnownRole {
    Admin,
    FrontDesk,
    /// Served by the service labelled "inspector".
    StockManager,
}

impl KnownRole {
    pub const ALL: [KnownRole; 3] = [KnownRole::Admin, KnownRole::FrontDesk, KnownRole::StockManager];

    pub fn as_wire(&self) -> &'static str {
        match self {
            KnownRole::Admin => "ADMIN",
            KnownRole::FrontDesk => "FRONT_DESK",
            KnownRole::StockManager => "STOCK_MANAGER",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(KnownRole::Admin),
            "FRONT_DESK" => Some(KnownRole::FrontDesk),
            "STOCK_MANAGER" => Some(KnownRole::StockManager),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            KnownRole::Admin => "Administrator",
            KnownRole::FrontDesk => "Front Desk",
            KnownRole::StockManager => "Stock Manager",
        }
    }

    /// Label of the service that serves this role.
    pub fn service_label(&self) -> &'static str {
        match self {
            KnownRole::Admin => "Admin",
            KnownRole::FrontDesk => "Front Desk",
            KnownRole::StockManager => "Inspector",
        }
    }

    /// Role hierarchy for UI gating inside a service.
    ///
    /// Service guards compare roles strictly; this is only for deciding which
    /// in-app affordances to show.
    pub fn grants(&self, required: KnownRole) -> bool {
        match self {
            KnownRole::Admin => true,
            KnownRole::FrontDesk => matches!(required, KnownRole::FrontDesk | KnownRole::StockManager),
            KnownRole::StockManager => required == KnownRole::StockManager,
        }
    }
}

impl core::fmt::Display for KnownRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_wire())
    }
}
