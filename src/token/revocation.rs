//! Token Revocation
//!
//! RFC 7009 revocation exchange. Revoking the refresh token (preferred when
//! one is cached) transitively invalidates the access tokens derived from
//! it; otherwise the access token itself is revoked.
//!
//! The revoker never clears local session state. On success it tells the
//! caller the record should be cleared; acting on that is the session
//! adapter's job.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{HttpRequest, HttpTransport};
use crate::error::{AuthError, AuthResult, ConfigurationError};
use crate::token::endpoint::encode_form;
use crate::types::{CredentialRecord, SessionConfig, TokenTypeHint};
use secrecy::ExposeSecret;

/// Result of a successful revocation exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevocationOutcome {
    /// HTTP status the server answered with (any 2xx; the body may be empty
    /// per RFC 7009).
    pub status: u16,
    /// The local credential record is now invalid and the session should be
    /// ended by whoever owns the record.
    pub should_sign_out: bool,
}

/// Token revoker interface.
#[async_trait]
pub trait TokenRevoker: Send + Sync {
    /// Revoke the record's credential. Fails with
    /// [`AuthError::NoCredential`] before any network call when the record
    /// holds no access token; non-2xx responses surface as
    /// [`AuthError::Upstream`] with status and raw body.
    async fn revoke(&self, record: &CredentialRecord) -> AuthResult<RevocationOutcome>;
}

/// Revoker speaking to a real authorization server.
pub struct HttpTokenRevoker<T: HttpTransport> {
    config: SessionConfig,
    transport: Arc<T>,
}

impl<T: HttpTransport> HttpTokenRevoker<T> {
    /// Create new token revoker.
    pub fn new(config: SessionConfig, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    fn build_body(&self, token: &str, hint: TokenTypeHint) -> String {
        let mut params = vec![
            ("token", token.to_string()),
            ("token_type_hint", hint.as_str().to_string()),
            ("client_id", self.config.credentials.client_id.clone()),
        ];
        if let Some(secret) = &self.config.credentials.client_secret {
            params.push(("client_secret", secret.expose_secret().to_string()));
        }
        encode_form(&params)
    }
}

#[async_trait]
impl<T: HttpTransport> TokenRevoker for HttpTokenRevoker<T> {
    async fn revoke(&self, record: &CredentialRecord) -> AuthResult<RevocationOutcome> {
        // Fail fast on a session that never signed in.
        let access_token = record.access_token.as_deref().ok_or(AuthError::NoCredential {
            operation: "token revocation",
        })?;

        let endpoint = self
            .config
            .provider
            .revocation_endpoint
            .as_ref()
            .ok_or_else(|| {
                AuthError::Configuration(ConfigurationError::MissingRequired {
                    field: "revocation_endpoint".to_string(),
                })
            })?;

        // Prefer the refresh token: revoking it invalidates derived access
        // tokens in one exchange.
        let (token, hint) = match record.refresh_token.as_deref() {
            Some(refresh_token) => (refresh_token, TokenTypeHint::RefreshToken),
            None => (access_token, TokenTypeHint::AccessToken),
        };

        let request = HttpRequest::form_post(
            endpoint.clone(),
            self.build_body(token, hint),
            self.config.timeout,
        );

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            warn!(status = response.status, "token revocation rejected");
            return Err(AuthError::upstream(response.status, response.body));
        }

        debug!(hint = hint.as_str(), "token revoked");
        Ok(RevocationOutcome {
            status: response.status,
            should_sign_out: true,
        })
    }
}

/// Mock token revoker for testing.
#[derive(Default)]
pub struct MockTokenRevoker {
    revoke_history: std::sync::Mutex<Vec<CredentialRecord>>,
    next_result: std::sync::Mutex<Option<AuthResult<RevocationOutcome>>>,
}

impl MockTokenRevoker {
    /// Create new mock revoker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set next revocation result.
    pub fn set_next_result(&self, result: AuthResult<RevocationOutcome>) -> &Self {
        *self.next_result.lock().unwrap() = Some(result);
        self
    }

    /// Records passed to revoke, in call order.
    pub fn get_revoke_history(&self) -> Vec<CredentialRecord> {
        self.revoke_history.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenRevoker for MockTokenRevoker {
    async fn revoke(&self, record: &CredentialRecord) -> AuthResult<RevocationOutcome> {
        if record.access_token.is_none() {
            return Err(AuthError::NoCredential {
                operation: "token revocation",
            });
        }

        self.revoke_history.lock().unwrap().push(record.clone());

        if let Some(result) = self.next_result.lock().unwrap().take() {
            return result;
        }

        Ok(RevocationOutcome {
            status: 200,
            should_sign_out: true,
        })
    }
}
