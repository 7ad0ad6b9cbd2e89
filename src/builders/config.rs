//! Configuration Builder
//!
//! Fluent builder for [`SessionConfig`]. Validation happens once at build
//! time; the resulting configuration is immutable for the life of the
//! process.

use secrecy::SecretString;
use std::time::Duration;
use url::Url;

use crate::error::{AuthError, ConfigurationError};
use crate::types::{
    ClientCredentials, PkceMethod, ProviderEndpoints, SessionConfig, DEFAULT_FALLBACK_LIFETIME,
    DEFAULT_REFRESH_SKEW, DEFAULT_TIMEOUT,
};

/// Session configuration builder.
#[derive(Default)]
pub struct SessionConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    authorization_endpoint: Option<String>,
    token_endpoint: Option<String>,
    revocation_endpoint: Option<String>,
    userinfo_endpoint: Option<String>,
    scopes: Vec<String>,
    pkce_method: PkceMethod,
    timeout: Option<Duration>,
    refresh_skew: Option<Duration>,
    fallback_token_lifetime: Option<Duration>,
}

impl SessionConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set authorization endpoint.
    pub fn authorization_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.authorization_endpoint = Some(endpoint.into());
        self
    }

    /// Set token endpoint.
    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    /// Set revocation endpoint.
    pub fn revocation_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.revocation_endpoint = Some(endpoint.into());
        self
    }

    /// Set userinfo endpoint.
    pub fn userinfo_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.userinfo_endpoint = Some(endpoint.into());
        self
    }

    /// Set requested scopes.
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Add a requested scope.
    pub fn add_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    /// Set PKCE challenge method (default S256).
    pub fn pkce_method(mut self, method: PkceMethod) -> Self {
        self.pkce_method = method;
        self
    }

    /// Set outbound HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set refresh safety skew.
    pub fn refresh_skew(mut self, skew: Duration) -> Self {
        self.refresh_skew = Some(skew);
        self
    }

    /// Set the lifetime assumed when the server omits one.
    pub fn fallback_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.fallback_token_lifetime = Some(lifetime);
        self
    }

    /// Build the configuration, validating required fields and URLs.
    pub fn build(self) -> Result<SessionConfig, AuthError> {
        let client_id = require(self.client_id, "client_id")?;
        let authorization_endpoint =
            validate_url(require(self.authorization_endpoint, "authorization_endpoint")?)?;
        let token_endpoint = validate_url(require(self.token_endpoint, "token_endpoint")?)?;
        let revocation_endpoint = self.revocation_endpoint.map(validate_url).transpose()?;
        let userinfo_endpoint = self.userinfo_endpoint.map(validate_url).transpose()?;

        Ok(SessionConfig {
            provider: ProviderEndpoints {
                authorization_endpoint,
                token_endpoint,
                revocation_endpoint,
                userinfo_endpoint,
            },
            credentials: ClientCredentials {
                client_id,
                client_secret: self.client_secret,
            },
            scopes: self.scopes,
            pkce_method: self.pkce_method,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            refresh_skew: self.refresh_skew.unwrap_or(DEFAULT_REFRESH_SKEW),
            fallback_token_lifetime: self
                .fallback_token_lifetime
                .unwrap_or(DEFAULT_FALLBACK_LIFETIME),
        })
    }
}

fn require(field: Option<String>, name: &str) -> Result<String, AuthError> {
    field.ok_or_else(|| {
        AuthError::Configuration(ConfigurationError::MissingRequired {
            field: name.to_string(),
        })
    })
}

fn validate_url(url: String) -> Result<String, AuthError> {
    Url::parse(&url)
        .map_err(|_| AuthError::Configuration(ConfigurationError::InvalidEndpoint { url: url.clone() }))?;
    Ok(url)
}

/// Create a new session configuration builder.
pub fn session_config() -> SessionConfigBuilder {
    SessionConfigBuilder::new()
}
