//! Cookie-backed session storage.
//!
//! Each request gets a [`CookieStorage`] seeded from its `Cookie` header.
//! Writes are recorded and turned into `Set-Cookie` headers on the response,
//! so the browser's cookie jar plays the part of per-origin storage.

use std::collections::BTreeMap;
use std::sync::Mutex;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;

use hotelgate_session::{StorageBackend, StorageError};

/// Namespace and path of one storage origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieScope {
    prefix: String,
    path: String,
}

impl CookieScope {
    /// The login origin's store.
    pub fn root() -> Self {
        Self {
            prefix: String::new(),
            path: "/".to_string(),
        }
    }

    /// A store private to the service mounted at `path`.
    pub fn service(name: &str, path: &str) -> Self {
        Self {
            prefix: format!("{name}-"),
            path: path.to_string(),
        }
    }

    pub fn cookie_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug)]
pub struct CookieStorage {
    scope: CookieScope,
    jar: Mutex<BTreeMap<String, String>>,
    /// `None` marks a removal.
    changes: Mutex<BTreeMap<String, Option<String>>>,
}

impl CookieStorage {
    pub fn from_headers(headers: &HeaderMap, scope: CookieScope) -> Self {
        let mut jar = BTreeMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else { continue };
            for pair in raw.split(';') {
                let Some((name, value)) = pair.trim().split_once('=') else {
                    continue;
                };
                let value = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                jar.insert(name.to_string(), value);
            }
        }

        Self {
            scope,
            jar: Mutex::new(jar),
            changes: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn scope(&self) -> &CookieScope {
        &self.scope
    }

    /// `Set-Cookie` values for every write made through this storage.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        let Ok(changes) = self.changes.lock() else {
            return Vec::new();
        };
        changes
            .iter()
            .map(|(name, value)| match value {
                Some(value) => format!(
                    "{name}={}; Path={}; HttpOnly; SameSite=Lax",
                    urlencoding::encode(value),
                    self.scope.path
                ),
                None => format!("{name}=; Path={}; Max-Age=0; HttpOnly; SameSite=Lax", self.scope.path),
            })
            .collect()
    }

    /// Append the recorded writes to `response`.
    pub fn apply(&self, response: &mut Response) {
        for cookie in self.set_cookie_headers() {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => tracing::warn!("dropping unencodable cookie: {e}"),
            }
        }
    }
}

impl StorageBackend for CookieStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let jar = self.jar.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(jar.get(&self.scope.cookie_name(key)).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let name = self.scope.cookie_name(key);
        let mut jar = self.jar.lock().map_err(|_| StorageError::Poisoned)?;
        let mut changes = self.changes.lock().map_err(|_| StorageError::Poisoned)?;
        jar.insert(name.clone(), value.to_string());
        changes.insert(name, Some(value.to_string()));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let name = self.scope.cookie_name(key);
        let mut jar = self.jar.lock().map_err(|_| StorageError::Poisoned)?;
        let mut changes = self.changes.lock().map_err(|_| StorageError::Poisoned)?;
        // Only expire cookies the browser actually sent or we set earlier.
        if jar.remove(&name).is_some() || changes.contains_key(&name) {
            changes.insert(name, None);
        }
        Ok(())
    }
}
