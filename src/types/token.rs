//! Token Wire Types
//!
//! Types exchanged with the authorization server's token and revocation
//! endpoints.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token response from the authorization server (RFC 6749 Section 5.1).
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type (usually "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Refresh token. Servers that do not rotate refresh tokens omit this
    /// on refresh responses.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Granted scopes (space-delimited).
    #[serde(default)]
    pub scope: Option<String>,
    /// Additional fields.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Authorization-code exchange request (RFC 6749 Section 4.1.3).
#[derive(Clone)]
pub struct CodeExchange {
    /// Authorization code from the callback.
    pub code: String,
    /// PKCE code verifier matching the challenge sent at authorization.
    pub code_verifier: String,
    /// Redirect URI used in the authorization request.
    pub redirect_uri: String,
}

impl std::fmt::Debug for CodeExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeExchange")
            .field("code", &"[REDACTED]")
            .field("code_verifier", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Token type hint for revocation (RFC 7009 Section 2.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTypeHint {
    AccessToken,
    RefreshToken,
}

impl TokenTypeHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }
}
