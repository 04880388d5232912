use std::env;

use crate::error::{Result, ChromaError};

pub const DEFAULT_URI: &str = "http://localhost:8000/api/v2/";
pub const DEFAULT_TENANT: &str = "default_tenant";
pub const DEFAULT_DATABASE: &str = "default_database";
/// Header carrying the static auth token.
pub const TOKEN_HEADER: &str = "X-Chroma-Token";

/// Connection configuration for a Chroma server.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub uri: String,
    pub tenant: Option<String>,
    pub database: Option<String>,
    pub token: Option<String>,
}

impl ClientConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            tenant: None,
            database: None,
            token: None,
        }
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Build configuration from environment variables:
    /// `CHROMA_URI` (optional, default [`DEFAULT_URI`]), `CHROMA_TENANT`,
    /// `CHROMA_DATABASE`, `CHROMA_TOKEN` (all optional).
    pub fn from_env() -> Result<Self> {
        let uri = optional_env("CHROMA_URI").unwrap_or_else(|| DEFAULT_URI.to_string());
        if !uri.starts_with("http://") && !uri.starts_with("https://") {
            return Err(ChromaError::Config(format!(
                "CHROMA_URI must be an http(s) url, got {uri:?}"
            )));
        }

        Ok(Self {
            uri,
            tenant: optional_env("CHROMA_TENANT"),
            database: optional_env("CHROMA_DATABASE"),
            token: optional_env("CHROMA_TOKEN"),
        })
    }

    /// Tenant in effect, falling back to [`DEFAULT_TENANT`] when unset or empty.
    pub fn effective_tenant(&self) -> &str {
        resolve_or_default(self.tenant.as_deref(), DEFAULT_TENANT)
    }

    /// Database in effect, falling back to [`DEFAULT_DATABASE`] when unset or empty.
    pub fn effective_database(&self) -> &str {
        resolve_or_default(self.database.as_deref(), DEFAULT_DATABASE)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URI)
    }
}

/// Resolve an optional, possibly empty identifier against a fallback.
pub(crate) fn resolve_or_default<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_identifiers_fall_back_to_defaults() {
        let cfg = ClientConfig::new(DEFAULT_URI)
            .with_tenant("")
            .with_database("");
        assert_eq!(cfg.effective_tenant(), DEFAULT_TENANT);
        assert_eq!(cfg.effective_database(), DEFAULT_DATABASE);
    }

    #[test]
    fn test_explicit_identifiers_win() {
        let cfg = ClientConfig::default()
            .with_tenant("acme")
            .with_database("prod");
        assert_eq!(cfg.effective_tenant(), "acme");
        assert_eq!(cfg.effective_database(), "prod");
    }
}
