//! Configuration Types
//!
//! Session manager configuration, loaded once at process start and immutable
//! thereafter.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Refresh safety skew subtracted from every declared token lifetime, so a
/// token judged fresh here is never already expired by the time it reaches
/// the authorization server.
pub const DEFAULT_REFRESH_SKEW: Duration = Duration::from_millis(60_000);

/// Lifetime assumed when the server omits `expires_in`/`expires_at`.
pub const DEFAULT_FALLBACK_LIFETIME: Duration = Duration::from_secs(60);

/// Default outbound HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Session manager configuration.
#[derive(Clone)]
pub struct SessionConfig {
    /// Authorization server endpoints.
    pub provider: ProviderEndpoints,
    /// Client credentials.
    pub credentials: ClientCredentials,
    /// Scopes requested at sign-in.
    pub scopes: Vec<String>,
    /// PKCE challenge method.
    pub pkce_method: PkceMethod,
    /// Outbound HTTP timeout.
    pub timeout: Duration,
    /// Refresh safety skew subtracted from declared expiries.
    pub refresh_skew: Duration,
    /// Assumed lifetime when the server omits one.
    pub fallback_token_lifetime: Duration,
}

impl SessionConfig {
    /// Scopes joined into the space-delimited form the wire expects.
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            provider: ProviderEndpoints::default(),
            credentials: ClientCredentials::default(),
            scopes: Vec::new(),
            pkce_method: PkceMethod::S256,
            timeout: DEFAULT_TIMEOUT,
            refresh_skew: DEFAULT_REFRESH_SKEW,
            fallback_token_lifetime: DEFAULT_FALLBACK_LIFETIME,
        }
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("provider", &self.provider)
            .field("credentials", &self.credentials)
            .field("scopes", &self.scopes)
            .field("pkce_method", &self.pkce_method)
            .field("timeout", &self.timeout)
            .field("refresh_skew", &self.refresh_skew)
            .field("fallback_token_lifetime", &self.fallback_token_lifetime)
            .finish()
    }
}

/// Authorization server endpoint configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProviderEndpoints {
    /// Authorization endpoint URL.
    pub authorization_endpoint: String,
    /// Token endpoint URL.
    pub token_endpoint: String,
    /// Token revocation endpoint (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_endpoint: Option<String>,
    /// OIDC userinfo endpoint (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
}

/// Client credentials for authenticating to the authorization server.
#[derive(Clone, Default)]
pub struct ClientCredentials {
    /// Client identifier.
    pub client_id: String,
    /// Client secret (confidential clients).
    pub client_secret: Option<SecretString>,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// PKCE challenge method (RFC 7636).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PkceMethod {
    /// SHA-256 hash (recommended).
    #[default]
    #[serde(rename = "S256")]
    S256,
    /// Plain text (not recommended).
    #[serde(rename = "plain")]
    Plain,
}

impl PkceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S256 => "S256",
            Self::Plain => "plain",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.refresh_skew, Duration::from_millis(60_000));
        assert_eq!(config.fallback_token_lifetime, Duration::from_secs(60));
        assert_eq!(config.pkce_method, PkceMethod::S256);
    }

    #[test]
    fn test_scope_string() {
        let config = SessionConfig {
            scopes: vec![
                "general".to_string(),
                "chat:read".to_string(),
                "chat:write".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(config.scope_string(), "general chat:read chat:write");
    }

    #[test]
    fn test_pkce_method_as_str() {
        assert_eq!(PkceMethod::S256.as_str(), "S256");
        assert_eq!(PkceMethod::Plain.as_str(), "plain");
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = ClientCredentials {
            client_id: "client".to_string(),
            client_secret: Some(SecretString::new("hunter2".to_string())),
        };
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
