//! Credential exchange contract consumed by the login flow.
//!
//! The gate does not care how credentials are checked; it only needs
//! something that turns a username/password pair into a [`Session`] or a
//! rejection.

use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use hotelgate_core::{GateError, OriginUrl, UserId};

use crate::{Identity, KnownRole, Role, Session};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-blank before an exchange is attempted.
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("{0}")]
    Rejected(String),

    #[error("username and password are required")]
    Incomplete,

    #[error("login service unavailable: {0}")]
    Transport(String),

    #[error("unexpected login response: {0}")]
    Protocol(String),

    #[error("failed to store session: {0}")]
    Persist(String),
}

impl LoginError {
    pub fn invalid_credentials() -> Self {
        Self::Rejected("Invalid credentials".to_string())
    }

    /// Message shown next to the login form.
    pub fn inline_message(&self) -> String {
        match self {
            LoginError::Rejected(msg) => msg.clone(),
            LoginError::Incomplete => self.to_string(),
            LoginError::Transport(_) | LoginError::Protocol(_) | LoginError::Persist(_) => {
                "Login failed".to_string()
            }
        }
    }
}

impl From<LoginError> for GateError {
    fn from(value: LoginError) -> Self {
        GateError::rejected(value.inline_message())
    }
}

/// Turns credentials into a session.
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    async fn exchange(&self, credentials: &Credentials) -> Result<Session, LoginError>;
}

/// Server-side token revocation, always best-effort from the client's side.
#[async_trait]
pub trait TokenRevoker: Send + Sync {
    async fn revoke(&self, token: &str) -> Result<(), LoginError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Static directory
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct DirectoryEntry {
    identity: Identity,
    password: String,
}

/// Fixed user directory with opaque tokens (dev/demo deployments, tests).
#[derive(Debug)]
pub struct StaticDirectory {
    entries: Vec<DirectoryEntry>,
    issued: RwLock<HashSet<String>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            issued: RwLock::new(HashSet::new()),
        }
    }

    /// The three demo accounts, one per service.
    pub fn demo() -> Self {
        Self::new()
            .with_user(demo_identity(1, "admin", KnownRole::Admin, "Admin", "User"), "admin123")
            .with_user(
                demo_identity(2, "inspector", KnownRole::StockManager, "Stock", "Inspector"),
                "inspector123",
            )
            .with_user(
                demo_identity(3, "frontdesk", KnownRole::FrontDesk, "Front", "Desk"),
                "frontdesk123",
            )
    }

    pub fn with_user(mut self, identity: Identity, password: impl Into<String>) -> Self {
        self.entries.push(DirectoryEntry {
            identity,
            password: password.into(),
        });
        self
    }

    pub fn is_active(&self, token: &str) -> bool {
        self.issued
            .read()
            .map(|set| set.contains(token))
            .unwrap_or(false)
    }
}

impl Default for StaticDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn demo_identity(id: u64, username: &str, role: KnownRole, first: &str, last: &str) -> Identity {
    Identity {
        id: UserId::new(id),
        username: username.to_string(),
        email: format!("{username}@hotel.com"),
        role: Role::from(role),
        first_name: first.to_string(),
        last_name: last.to_string(),
    }
}

#[async_trait]
impl CredentialExchange for StaticDirectory {
    async fn exchange(&self, credentials: &Credentials) -> Result<Session, LoginError> {
        if !credentials.is_complete() {
            return Err(LoginError::Incomplete);
        }

        let entry = self
            .entries
            .iter()
            .find(|e| e.identity.username == credentials.username && e.password == credentials.password)
            .ok_or_else(LoginError::invalid_credentials)?;

        let token = format!("tok-{}-{}", entry.identity.id, Uuid::now_v7().simple());
        if let Ok(mut issued) = self.issued.write() {
            issued.insert(token.clone());
        }

        Ok(Session::new(entry.identity.clone(), token))
    }
}

#[async_trait]
impl TokenRevoker for StaticDirectory {
    async fn revoke(&self, token: &str) -> Result<(), LoginError> {
        if let Ok(mut issued) = self.issued.write() {
            issued.remove(token);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP exchange
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LoginResponse {
    identity: Identity,
    token: String,
}

/// Exchange against a remote login API (`POST {base}/api/auth/login`).
#[derive(Debug, Clone)]
pub struct HttpCredentialExchange {
    base: OriginUrl,
    client: reqwest::Client,
}

impl HttpCredentialExchange {
    pub fn new(base: OriginUrl) -> Self {
        Self {
            base,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(base: OriginUrl, client: reqwest::Client) -> Self {
        Self { base, client }
    }
}

#[async_trait]
impl CredentialExchange for HttpCredentialExchange {
    async fn exchange(&self, credentials: &Credentials) -> Result<Session, LoginError> {
        if !credentials.is_complete() {
            return Err(LoginError::Incomplete);
        }

        let res = self
            .client
            .post(self.base.join("/api/auth/login"))
            .json(credentials)
            .send()
            .await
            .map_err(|e| LoginError::Transport(e.to_string()))?;

        let status = res.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LoginError::invalid_credentials());
        }
        if !status.is_success() {
            return Err(LoginError::Transport(format!("status {status}")));
        }

        let body: LoginResponse = res
            .json()
            .await
            .map_err(|e| LoginError::Protocol(e.to_string()))?;

        if body.token.is_empty() {
            return Err(LoginError::Protocol("empty token".to_string()));
        }

        Ok(Session::new(body.identity, body.token))
    }
}

#[async_trait]
impl TokenRevoker for HttpCredentialExchange {
    async fn revoke(&self, token: &str) -> Result<(), LoginError> {
        let res = self
            .client
            .post(self.base.join("/api/auth/logout"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| LoginError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            return Err(LoginError::Transport(format!("status {}", res.status())));
        }
        Ok(())
    }
}
