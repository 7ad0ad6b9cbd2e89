//! Token Endpoint Client
//!
//! The two outbound exchanges against the authorization server's token
//! endpoint: authorization-code exchange (RFC 6749 Section 4.1.3, with the
//! PKCE verifier) and refresh-token exchange (Section 6).
//!
//! Neither exchange retries. Retry policy belongs to the caller: the next
//! demand-driven request re-enters the lifecycle decision and retries
//! naturally while the token is still judged stale.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{HttpRequest, HttpTransport};
use crate::error::{describe_upstream_failure, AuthError, AuthResult, ProtocolError};
use crate::token::expiry;
use crate::types::{CodeExchange, CredentialRecord, RefreshFailure, SessionConfig, TokenResponse};

/// Token endpoint client interface.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Exchange an authorization code (plus PKCE verifier) for tokens.
    /// One-shot: any failure surfaces as an error without touching prior
    /// session state.
    async fn exchange_code(&self, exchange: CodeExchange) -> AuthResult<TokenResponse>;

    /// Refresh the record's access token. Always returns a record: failures
    /// are encoded in [`CredentialRecord::error`] with every other field
    /// preserved, so a still-cached token survives a failed refresh.
    async fn refresh(&self, record: &CredentialRecord) -> CredentialRecord;
}

/// Token endpoint client speaking to a real authorization server.
pub struct HttpTokenEndpoint<T: HttpTransport> {
    config: SessionConfig,
    transport: Arc<T>,
}

impl<T: HttpTransport> HttpTokenEndpoint<T> {
    /// Create new token endpoint client.
    pub fn new(config: SessionConfig, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    fn client_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![(
            "client_id",
            self.config.credentials.client_id.clone(),
        )];
        if let Some(secret) = &self.config.credentials.client_secret {
            params.push(("client_secret", secret.expose_secret().to_string()));
        }
        params
    }

    fn build_refresh_body(&self, record: &CredentialRecord) -> String {
        let mut params = vec![("grant_type", "refresh_token".to_string())];
        params.extend(self.client_params());
        // Empty string when absent: the server rejects it and the failure is
        // recorded on the credential like any other non-2xx.
        params.push((
            "refresh_token",
            record.refresh_token.clone().unwrap_or_default(),
        ));
        encode_form(&params)
    }

    fn build_exchange_body(&self, exchange: &CodeExchange) -> String {
        let mut params = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", exchange.code.clone()),
            ("redirect_uri", exchange.redirect_uri.clone()),
            ("code_verifier", exchange.code_verifier.clone()),
        ];
        params.extend(self.client_params());
        encode_form(&params)
    }

    fn record_from_response(
        &self,
        previous: &CredentialRecord,
        response: TokenResponse,
    ) -> CredentialRecord {
        let expires_at = expiry::expires_at_from_lifetime(
            expiry::now_ms(),
            response.expires_in,
            self.config.fallback_token_lifetime,
            self.config.refresh_skew,
        );

        CredentialRecord {
            access_token: Some(response.access_token),
            // Rotation is optional per server policy: keep the old refresh
            // token unless the response carried a new one.
            refresh_token: response
                .refresh_token
                .or_else(|| previous.refresh_token.clone()),
            access_token_expires_at: Some(expires_at),
            error: None,
        }
    }
}

#[async_trait]
impl<T: HttpTransport> TokenEndpoint for HttpTokenEndpoint<T> {
    async fn exchange_code(&self, exchange: CodeExchange) -> AuthResult<TokenResponse> {
        let body = self.build_exchange_body(&exchange);
        let request = HttpRequest::form_post(
            self.config.provider.token_endpoint.clone(),
            body,
            self.config.timeout,
        );

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            warn!(
                status = response.status,
                detail = %describe_upstream_failure(response.status, &response.body),
                "authorization-code exchange rejected"
            );
            return Err(AuthError::upstream(response.status, response.body));
        }

        let token_response: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| {
                AuthError::Protocol(ProtocolError::InvalidJson {
                    message: e.to_string(),
                })
            })?;

        debug!("authorization-code exchange succeeded");
        Ok(token_response)
    }

    async fn refresh(&self, record: &CredentialRecord) -> CredentialRecord {
        let body = self.build_refresh_body(record);
        let request = HttpRequest::form_post(
            self.config.provider.token_endpoint.clone(),
            body,
            self.config.timeout,
        );

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "token refresh transport failure");
                return record.with_error(RefreshFailure::Unexpected);
            }
        };

        if !response.is_success() {
            warn!(
                status = response.status,
                detail = %describe_upstream_failure(response.status, &response.body),
                "token refresh rejected"
            );
            return record.with_error(RefreshFailure::Fetch);
        }

        match serde_json::from_str::<TokenResponse>(&response.body) {
            Ok(token_response) => {
                debug!("token refresh succeeded");
                self.record_from_response(record, token_response)
            }
            Err(e) => {
                warn!(error = %e, "token refresh returned unparseable body");
                record.with_error(RefreshFailure::Unexpected)
            }
        }
    }
}

/// Encode key/value pairs as `application/x-www-form-urlencoded`.
pub(crate) fn encode_form(params: &[(&str, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Mock token endpoint for testing the lifecycle manager.
#[derive(Default)]
pub struct MockTokenEndpoint {
    exchange_history: std::sync::Mutex<Vec<CodeExchange>>,
    refresh_history: std::sync::Mutex<Vec<CredentialRecord>>,
    next_exchange_response: std::sync::Mutex<Option<AuthResult<TokenResponse>>>,
    next_refresh_record: std::sync::Mutex<Option<CredentialRecord>>,
}

impl MockTokenEndpoint {
    /// Create new mock token endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set next exchange result.
    pub fn set_next_exchange_response(&self, response: AuthResult<TokenResponse>) -> &Self {
        *self.next_exchange_response.lock().unwrap() = Some(response);
        self
    }

    /// Set the record the next refresh returns.
    pub fn set_next_refresh_record(&self, record: CredentialRecord) -> &Self {
        *self.next_refresh_record.lock().unwrap() = Some(record);
        self
    }

    /// Get exchange history.
    pub fn get_exchange_history(&self) -> Vec<CodeExchange> {
        self.exchange_history.lock().unwrap().clone()
    }

    /// Records passed to refresh, in call order.
    pub fn get_refresh_history(&self) -> Vec<CredentialRecord> {
        self.refresh_history.lock().unwrap().clone()
    }

    /// Number of refresh exchanges performed.
    pub fn refresh_count(&self) -> usize {
        self.refresh_history.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenEndpoint for MockTokenEndpoint {
    async fn exchange_code(&self, exchange: CodeExchange) -> AuthResult<TokenResponse> {
        self.exchange_history.lock().unwrap().push(exchange);

        if let Some(response) = self.next_exchange_response.lock().unwrap().take() {
            return response;
        }

        Ok(TokenResponse {
            access_token: "mock-access-token".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: Some(3_600),
            refresh_token: Some("mock-refresh-token".to_string()),
            scope: None,
            extra: Default::default(),
        })
    }

    async fn refresh(&self, record: &CredentialRecord) -> CredentialRecord {
        self.refresh_history.lock().unwrap().push(record.clone());

        if let Some(next) = self.next_refresh_record.lock().unwrap().take() {
            return next;
        }

        CredentialRecord {
            access_token: Some("refreshed-access-token".to_string()),
            refresh_token: record.refresh_token.clone(),
            access_token_expires_at: Some(expiry::now_ms() + 3_540_000),
            error: None,
        }
    }
}
