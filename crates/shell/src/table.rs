//! Static route table of the shell.

use thiserror::Error;

use hotelgate_core::{OriginError, OriginUrl};

pub const ENV_SHELL_ADMIN_ORIGIN: &str = "HOTELGATE_SHELL_ADMIN_ORIGIN";
pub const ENV_SHELL_FRONTDESK_ORIGIN: &str = "HOTELGATE_SHELL_FRONTDESK_ORIGIN";
pub const ENV_SHELL_INSPECTOR_ORIGIN: &str = "HOTELGATE_SHELL_INSPECTOR_ORIGIN";
pub const ENV_SHELL_USERS_ORIGIN: &str = "HOTELGATE_SHELL_USERS_ORIGIN";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShellConfigError {
    #[error("{key}: {source}")]
    InvalidOrigin { key: &'static str, source: OriginError },

    #[error("route '{0}' must start with '/' and must not be the home route")]
    InvalidRoute(String),
}

/// One embedded service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellEntry {
    pub route: String,
    pub origin: OriginUrl,
    pub title: String,
    /// Text of the navigation link.
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellTable {
    entries: Vec<ShellEntry>,
}

impl ShellTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self, ShellConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The four development services, each overridable by its variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ShellConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = [
            ("/admin", ENV_SHELL_ADMIN_ORIGIN, "http://localhost:3001", "Admin Service", "Admin"),
            ("/frontdesk", ENV_SHELL_FRONTDESK_ORIGIN, "http://localhost:3003", "Frontdesk Service", "Frontdesk"),
            ("/inspector", ENV_SHELL_INSPECTOR_ORIGIN, "http://localhost:3004", "Inspector Service", "Inspector"),
            ("/users", ENV_SHELL_USERS_ORIGIN, "http://localhost:3000", "User Service", "Users"),
        ];

        let mut table = Self::new();
        for (route, key, default, title, label) in defaults {
            let raw = lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string());
            let origin =
                OriginUrl::parse(&raw).map_err(|source| ShellConfigError::InvalidOrigin { key, source })?;
            table = table.with_entry(route, origin, title, label)?;
        }
        Ok(table)
    }

    pub fn with_entry(
        mut self,
        route: &str,
        origin: OriginUrl,
        title: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Self, ShellConfigError> {
        let route = route.trim_end_matches('/');
        if !route.starts_with('/') || route.is_empty() {
            return Err(ShellConfigError::InvalidRoute(route.to_string()));
        }

        let entry = ShellEntry {
            route: route.to_string(),
            origin,
            title: title.into(),
            label: label.into(),
        };
        match self.entries.iter_mut().find(|e| e.route == entry.route) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        Ok(self)
    }

    /// Exact match; a trailing slash is ignored.
    pub fn find(&self, route: &str) -> Option<&ShellEntry> {
        let route = route.trim_end_matches('/');
        self.entries.iter().find(|e| e.route == route)
    }

    pub fn entries(&self) -> &[ShellEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_development_ports() {
        let table = ShellTable::from_lookup(|_| None).unwrap();

        let routes: Vec<(&str, &str)> = table
            .entries()
            .iter()
            .map(|e| (e.route.as_str(), e.origin.as_str()))
            .collect();
        assert_eq!(
            routes,
            vec![
                ("/admin", "http://localhost:3001"),
                ("/frontdesk", "http://localhost:3003"),
                ("/inspector", "http://localhost:3004"),
                ("/users", "http://localhost:3000"),
            ]
        );
    }

    #[test]
    fn origins_are_overridable() {
        let table = ShellTable::from_lookup(|key| {
            (key == ENV_SHELL_INSPECTOR_ORIGIN).then(|| "https://inspector.hotel.test".to_string())
        })
        .unwrap();

        assert_eq!(
            table.find("/inspector/").unwrap().origin.as_str(),
            "https://inspector.hotel.test"
        );
    }

    #[test]
    fn bad_origin_names_its_variable() {
        let err = ShellTable::from_lookup(|key| (key == ENV_SHELL_USERS_ORIGIN).then(|| "ftp://x".to_string()))
            .unwrap_err();
        assert!(matches!(err, ShellConfigError::InvalidOrigin { key: ENV_SHELL_USERS_ORIGIN, .. }));
    }

    #[test]
    fn home_route_cannot_be_embedded() {
        let origin = OriginUrl::parse("http://localhost:1").unwrap();
        assert!(ShellTable::new().with_entry("/", origin.clone(), "Home", "Home").is_err());
        assert!(ShellTable::new().with_entry("admin", origin, "Admin", "Admin").is_err());
    }
}
