//! Environment-driven gate configuration.
//!
//! Read once at start-up. Every delay, attempt count and destination is
//! configuration. Defaults: one probe, 1s settle, 2s cooldown, one
//! re-check and one fallback link for the user's own role.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use hotelgate_auth::{DEFAULT_HANDOFF_TTL_SECS, HandoffIssuer, Hs256JwtValidator, KnownRole};
use hotelgate_core::{OriginError, OriginUrl};

use crate::probe::{HealthProbe, OpaqueProbe, ProbePolicy, ReachabilityProbe};
use crate::route_map::RoleRouteMap;
use crate::router::RouterConfig;

pub const ENV_LOGIN_ORIGIN: &str = "HOTELGATE_LOGIN_ORIGIN";
pub const ENV_ADMIN_ORIGIN: &str = "HOTELGATE_ADMIN_ORIGIN";
pub const ENV_FRONT_DESK_ORIGIN: &str = "HOTELGATE_FRONT_DESK_ORIGIN";
pub const ENV_STOCK_MANAGER_ORIGIN: &str = "HOTELGATE_STOCK_MANAGER_ORIGIN";
pub const ENV_PROBE: &str = "HOTELGATE_PROBE";
pub const ENV_PROBE_ATTEMPTS: &str = "HOTELGATE_PROBE_ATTEMPTS";
pub const ENV_PROBE_TIMEOUT_MS: &str = "HOTELGATE_PROBE_TIMEOUT_MS";
pub const ENV_PROBE_BACKOFF_MS: &str = "HOTELGATE_PROBE_BACKOFF_MS";
pub const ENV_SETTLE_MS: &str = "HOTELGATE_SETTLE_MS";
pub const ENV_COOLDOWN_MS: &str = "HOTELGATE_COOLDOWN_MS";
pub const ENV_RECHECKS: &str = "HOTELGATE_RECHECKS";
pub const ENV_FALLBACK_LINKS: &str = "HOTELGATE_FALLBACK_LINKS";
pub const ENV_HANDOFF_SECRET: &str = "HOTELGATE_HANDOFF_SECRET";
pub const ENV_HANDOFF_TTL_SECS: &str = "HOTELGATE_HANDOFF_TTL_SECS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: {source}")]
    InvalidOrigin { key: &'static str, source: OriginError },

    #[error("{key}: '{value}' is not a non-negative integer")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key}: '{value}' is not one of {expected}")]
    InvalidChoice {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ProbeKind {
    #[default]
    Opaque,
    Health,
}

/// Which direct links the routing fallback offers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LinkScope {
    #[default]
    CurrentRole,
    All,
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub login_origin: OriginUrl,
    pub routes: RoleRouteMap,
    pub probe_kind: ProbeKind,
    pub probe_policy: ProbePolicy,
    pub settle: Duration,
    pub cooldown: Duration,
    pub rechecks: u32,
    pub link_scope: LinkScope,
    pub handoff_secret: Option<String>,
    pub handoff_ttl: chrono::Duration,
}

impl GateConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let origin = |key: &'static str, default: &str| -> Result<OriginUrl, ConfigError> {
            let raw = get(key).unwrap_or_else(|| {
                tracing::warn!("{key} not set; using dev default {default}");
                default.to_string()
            });
            OriginUrl::parse(&raw).map_err(|source| ConfigError::InvalidOrigin { key, source })
        };

        let number = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match get(key) {
                None => Ok(default),
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber { key, value }),
            }
        };

        let login_origin = origin(ENV_LOGIN_ORIGIN, "http://localhost:8080")?;
        let routes = RoleRouteMap::new()
            .with_route(KnownRole::Admin, origin(ENV_ADMIN_ORIGIN, "http://localhost:3000")?)
            .with_route(KnownRole::StockManager, origin(ENV_STOCK_MANAGER_ORIGIN, "http://localhost:3002")?)
            .with_route(KnownRole::FrontDesk, origin(ENV_FRONT_DESK_ORIGIN, "http://localhost:3003")?);

        let probe_kind = match get(ENV_PROBE).as_deref().map(str::trim) {
            None | Some("opaque") => ProbeKind::Opaque,
            Some("health") => ProbeKind::Health,
            Some(other) => {
                return Err(ConfigError::InvalidChoice {
                    key: ENV_PROBE,
                    value: other.to_string(),
                    expected: "opaque, health",
                });
            }
        };

        let attempts = number(ENV_PROBE_ATTEMPTS, 1)?.clamp(1, u32::MAX as u64) as u32;
        let timeout = Duration::from_millis(number(ENV_PROBE_TIMEOUT_MS, 3_000)?);
        let probe_policy = if attempts == 1 {
            ProbePolicy::single(timeout)
        } else {
            ProbePolicy::exponential(attempts, timeout, Duration::from_millis(number(ENV_PROBE_BACKOFF_MS, 250)?))
        };

        let link_scope = match get(ENV_FALLBACK_LINKS).as_deref().map(str::trim) {
            None | Some("role") => LinkScope::CurrentRole,
            Some("all") => LinkScope::All,
            Some(other) => {
                return Err(ConfigError::InvalidChoice {
                    key: ENV_FALLBACK_LINKS,
                    value: other.to_string(),
                    expected: "role, all",
                });
            }
        };

        let handoff_ttl_secs = number(ENV_HANDOFF_TTL_SECS, DEFAULT_HANDOFF_TTL_SECS as u64)?;
        let handoff_ttl = i64::try_from(handoff_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| ConfigError::InvalidNumber {
                key: ENV_HANDOFF_TTL_SECS,
                value: handoff_ttl_secs.to_string(),
            })?;

        Ok(Self {
            login_origin,
            routes,
            probe_kind,
            probe_policy,
            settle: Duration::from_millis(number(ENV_SETTLE_MS, 1_000)?),
            cooldown: Duration::from_millis(number(ENV_COOLDOWN_MS, 2_000)?),
            rechecks: number(ENV_RECHECKS, 1)?.min(u32::MAX as u64) as u32,
            link_scope,
            handoff_secret: get(ENV_HANDOFF_SECRET),
            handoff_ttl,
        })
    }

    /// Where guards and logout send users: the login page.
    pub fn login_url(&self) -> String {
        self.login_origin.join("/login")
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            settle: self.settle,
            cooldown: self.cooldown,
            rechecks: self.rechecks,
            link_scope: self.link_scope,
            probe_policy: self.probe_policy,
        }
    }

    pub fn probe(&self) -> Arc<dyn ReachabilityProbe> {
        match self.probe_kind {
            ProbeKind::Opaque => Arc::new(OpaqueProbe::new()),
            ProbeKind::Health => Arc::new(HealthProbe::new()),
        }
    }

    pub fn handoff_issuer(&self) -> Option<HandoffIssuer> {
        self.handoff_secret
            .as_ref()
            .map(|secret| HandoffIssuer::new(secret.as_bytes(), &self.login_origin, self.handoff_ttl))
    }

    /// Validator for tokens addressed to `audience` (a destination origin).
    pub fn handoff_validator(&self, audience: &OriginUrl) -> Option<Hs256JwtValidator> {
        self.handoff_secret
            .as_ref()
            .map(|secret| Hs256JwtValidator::new(secret.as_bytes(), &self.login_origin, audience))
    }
}
