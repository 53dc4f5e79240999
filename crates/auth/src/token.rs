//! Signed handoff tokens (HS256).
//!
//! The login origin mints one token per navigation; the destination verifies
//! signature, issuer, audience and expiry before trusting the identity inside.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use hotelgate_core::OriginUrl;

use crate::Identity;
use crate::claims::{HandoffClaims, TokenValidationError, validate_claims};

/// Default lifetime of a handoff token.
pub const DEFAULT_HANDOFF_TTL_SECS: i64 = 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("failed to encode handoff token: {0}")]
    Encode(String),

    #[error("handoff token rejected: {0}")]
    Decode(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("handoff token was already used")]
    Replayed,
}

/// Verifies handoff tokens presented to a destination.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<HandoffClaims, TokenError>;
}

/// Mints handoff tokens on the login origin.
#[derive(Clone)]
pub struct HandoffIssuer {
    key: EncodingKey,
    issuer: String,
    ttl: Duration,
}

impl HandoffIssuer {
    pub fn new(secret: &[u8], issuer: &OriginUrl, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
            issuer: issuer.as_str().to_string(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(
        &self,
        identity: &Identity,
        audience: &OriginUrl,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Encode(format!("expiry out of range (ttl {})", self.ttl)))?;

        let claims = HandoffClaims {
            iss: self.issuer.clone(),
            aud: audience.as_str().to_string(),
            sub: identity.id.to_string(),
            jti: Uuid::now_v7(),
            iat: now,
            exp,
            identity: identity.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}

impl core::fmt::Debug for HandoffIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandoffIssuer")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// HS256 validator bound to one issuer and one audience (this origin).
///
/// Each token is accepted once: its `jti` is remembered until the token
/// expires. Clones share that memory.
#[derive(Clone)]
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
    used: Arc<Mutex<HashMap<Uuid, DateTime<Utc>>>>,
}

impl Hs256JwtValidator {
    pub fn new(secret: &[u8], issuer: &OriginUrl, audience: &OriginUrl) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        // Time window is checked against an injected clock in `validate_claims`.
        validation.validate_exp = false;

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
            used: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<HandoffClaims, TokenError> {
        let data = jsonwebtoken::decode::<HandoffClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenError::Decode(e.to_string()))?;
        validate_claims(&data.claims, now)?;

        let mut used = self
            .used
            .lock()
            .map_err(|_| TokenError::Decode("used-token set poisoned".to_string()))?;
        used.retain(|_, exp| *exp > now);
        if used.insert(data.claims.jti, data.claims.exp).is_some() {
            return Err(TokenError::Replayed);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use hotelgate_core::UserId;

    use super::*;
    use crate::Role;

    fn origin(s: &str) -> OriginUrl {
        OriginUrl::parse(s).unwrap()
    }

    fn frontdesk() -> Identity {
        Identity {
            id: UserId::new(3),
            username: "frontdesk".into(),
            email: "frontdesk@hotel.com".into(),
            role: Role::new("FRONT_DESK"),
            first_name: "Front".into(),
            last_name: "Desk".into(),
        }
    }

    #[test]
    fn issued_token_verifies_at_its_audience() {
        let login = origin("http://localhost:8080");
        let dest = origin("http://localhost:3003");
        let issuer = HandoffIssuer::new(b"secret", &login, Duration::seconds(60));
        let validator = Hs256JwtValidator::new(b"secret", &login, &dest);

        let now = Utc::now();
        let token = issuer.issue(&frontdesk(), &dest, now).unwrap();
        let claims = validator.validate(&token, now).unwrap();

        assert_eq!(claims.identity, frontdesk());
        assert_eq!(claims.aud, "http://localhost:3003");
    }

    #[test]
    fn token_for_another_origin_is_rejected() {
        let login = origin("http://localhost:8080");
        let issuer = HandoffIssuer::new(b"secret", &login, Duration::seconds(60));
        let validator = Hs256JwtValidator::new(b"secret", &login, &origin("http://localhost:3000"));

        let now = Utc::now();
        let token = issuer
            .issue(&frontdesk(), &origin("http://localhost:3003"), now)
            .unwrap();

        assert!(matches!(validator.validate(&token, now), Err(TokenError::Decode(_))));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let login = origin("http://localhost:8080");
        let dest = origin("http://localhost:3003");
        let issuer = HandoffIssuer::new(b"secret", &login, Duration::seconds(60));
        let validator = Hs256JwtValidator::new(b"other", &login, &dest);

        let now = Utc::now();
        let token = issuer.issue(&frontdesk(), &dest, now).unwrap();
        assert!(matches!(validator.validate(&token, now), Err(TokenError::Decode(_))));
    }

    #[test]
    fn expiry_is_enforced() {
        let login = origin("http://localhost:8080");
        let dest = origin("http://localhost:3003");
        let issuer = HandoffIssuer::new(b"secret", &login, Duration::seconds(60));
        let validator = Hs256JwtValidator::new(b"secret", &login, &dest);

        let now = Utc::now();
        let token = issuer.issue(&frontdesk(), &dest, now).unwrap();
        let later = now + Duration::seconds(120);

        assert_eq!(
            validator.validate(&token, later),
            Err(TokenError::Claims(TokenValidationError::Expired))
        );
    }

    #[test]
    fn a_token_is_accepted_once() {
        let login = origin("http://localhost:8080");
        let dest = origin("http://localhost:3003");
        let issuer = HandoffIssuer::new(b"secret", &login, Duration::seconds(60));
        let validator = Hs256JwtValidator::new(b"secret", &login, &dest);

        let now = Utc::now();
        let token = issuer.issue(&frontdesk(), &dest, now).unwrap();
        validator.validate(&token, now).unwrap();

        assert_eq!(validator.clone().validate(&token, now), Err(TokenError::Replayed));

        let fresh = issuer.issue(&frontdesk(), &dest, now).unwrap();
        assert!(validator.validate(&fresh, now).is_ok());
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let login = origin("http://localhost:8080");
        let dest = origin("http://localhost:3003");
        let issuer = HandoffIssuer::new(b"secret", &login, Duration::try_days(1_000_000_000).unwrap());

        let err = issuer.issue(&frontdesk(), &dest, Utc::now()).unwrap_err();
        assert!(matches!(err, TokenError::Encode(_)));
    }
}
