//! Origin URLs of independently deployed services.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base URL of a deployed service: `scheme://host[:port][/base/path]`.
///
/// Stored without a trailing slash, without query and without fragment, so
/// that [`OriginUrl::join`] can append paths predictably.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OriginUrl(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OriginError {
    #[error("origin url is empty")]
    Empty,

    #[error("origin url '{0}' must start with http:// or https://")]
    UnsupportedScheme(String),

    #[error("origin url '{0}' has no host")]
    MissingHost(String),

    #[error("origin url '{0}' must not carry a query or fragment")]
    HasQuery(String),
}

impl OriginUrl {
    pub fn parse(raw: &str) -> Result<Self, OriginError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(OriginError::Empty);
        }

        let rest = raw
            .strip_prefix("http://")
            .or_else(|| raw.strip_prefix("https://"))
            .ok_or_else(|| OriginError::UnsupportedScheme(raw.to_string()))?;

        if rest.contains('?') || rest.contains('#') {
            return Err(OriginError::HasQuery(raw.to_string()));
        }

        let host = rest.split('/').next().unwrap_or_default();
        if host.is_empty() || host.starts_with(':') {
            return Err(OriginError::MissingHost(raw.to_string()));
        }

        Ok(Self(raw.trim_end_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a path below the base URL.
    pub fn join(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.0.clone()
        } else {
            format!("{}/{}", self.0, path)
        }
    }

    /// The base URL with a single query parameter attached (value is
    /// percent-encoded).
    pub fn with_query(&self, key: &str, value: &str) -> String {
        format!("{}?{}={}", self.0, key, urlencoding::encode(value))
    }
}

impl core::fmt::Display for OriginUrl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OriginUrl {
    type Err = OriginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OriginUrl {
    type Error = OriginError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OriginUrl> for String {
    fn from(value: OriginUrl) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalised() {
        let url = OriginUrl::parse("http://localhost:3000/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000");
        assert_eq!(url.join("/login"), "http://localhost:3000/login");
        assert_eq!(url.join(""), "http://localhost:3000");
    }

    #[test]
    fn base_path_is_kept() {
        let url = OriginUrl::parse("https://gate.example/app/admin").unwrap();
        assert_eq!(url.as_str(), "https://gate.example/app/admin");
        assert_eq!(url.join("health"), "https://gate.example/app/admin/health");
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!(OriginUrl::parse("  "), Err(OriginError::Empty));
        assert!(matches!(
            OriginUrl::parse("ftp://x"),
            Err(OriginError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            OriginUrl::parse("http://"),
            Err(OriginError::MissingHost(_))
        ));
        assert!(matches!(
            OriginUrl::parse("http://x/?a=b"),
            Err(OriginError::HasQuery(_))
        ));
    }

    #[test]
    fn query_value_is_encoded() {
        let url = OriginUrl::parse("http://localhost:3002").unwrap();
        assert_eq!(
            url.with_query("handoff", "a b&c"),
            "http://localhost:3002?handoff=a%20b%26c"
        );
    }
}
