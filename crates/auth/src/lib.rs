//! `hotelgate-auth`: identity, roles and credential contracts.
//!
//! This crate is decoupled from HTTP serving and from session storage.

pub mod claims;
pub mod identity;
pub mod login;
pub mod roles;
pub mod token;

pub use claims::{HandoffClaims, TokenValidationError, validate_claims};
pub use identity::{Identity, Session};
pub use login::{
    CredentialExchange, Credentials, HttpCredentialExchange, LoginError, StaticDirectory, TokenRevoker,
};
pub use roles::{KnownRole, Role};
pub use token::{DEFAULT_HANDOFF_TTL_SECS, HandoffIssuer, Hs256JwtValidator, JwtValidator, TokenError};
