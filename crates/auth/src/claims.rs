use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::Identity;

/// Claims of a handoff token (transport-agnostic).
///
/// A handoff token is minted by the login origin for exactly one destination
/// origin and carries the identity the destination should seed its own
/// session with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffClaims {
    /// Issuer: the login origin.
    pub iss: String,

    /// Audience: the destination origin the token was minted for.
    pub aud: String,

    /// Subject: the user id.
    pub sub: String,

    /// Token id, unique per handoff.
    pub jti: Uuid,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,

    pub identity: Identity,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("subject does not match the embedded identity")]
    SubjectMismatch,
}

/// Deterministically validate handoff claims.
///
/// Signature, issuer and audience are checked by the decoder; this covers
/// the time window and the subject/identity pairing.
pub fn validate_claims(claims: &HandoffClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    if claims.sub != claims.identity.id.to_string() {
        return Err(TokenValidationError::SubjectMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use hotelgate_core::UserId;

    use super::*;
    use crate::Role;

    fn claims_at(iat: DateTime<Utc>, ttl: Duration) -> HandoffClaims {
        HandoffClaims {
            iss: "http://login".into(),
            aud: "http://admin".into(),
            sub: "1".into(),
            jti: Uuid::now_v7(),
            iat,
            exp: iat + ttl,
            identity: Identity {
                id: UserId::new(1),
                username: "admin".into(),
                email: "admin@hotel.com".into(),
                role: Role::new("ADMIN"),
                first_name: "Admin".into(),
                last_name: "User".into(),
            },
        }
    }

    #[test]
    fn window_is_enforced() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::seconds(60));

        assert_eq!(validate_claims(&claims, t0), Ok(()));
        assert_eq!(
            validate_claims(&claims, t0 - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&claims, t0 + Duration::seconds(60)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::zero());
        assert_eq!(
            validate_claims(&claims, t0),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn subject_must_match_identity() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let mut claims = claims_at(t0, Duration::seconds(60));
        claims.sub = "2".into();
        assert_eq!(
            validate_claims(&claims, t0),
            Err(TokenValidationError::SubjectMismatch)
        );
    }
}
