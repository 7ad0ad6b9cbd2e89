//! Session Client
//!
//! High-level facade wiring the lifecycle manager, token endpoint client,
//! and revocation client to a transport and a session store. This is the
//! piece a web framework integrates against: sign-in URL construction,
//! callback completion, per-request token access, userinfo, and sign-out.

use std::sync::Arc;

use crate::core::{self, HttpRequest, HttpTransport, ReqwestHttpTransport};
use crate::error::{AuthError, AuthResult, ConfigurationError, ProtocolError};
use crate::session::{InMemorySessionStore, LifecycleManager, SessionStore};
use crate::token::{
    HttpTokenEndpoint, HttpTokenRevoker, RevocationOutcome, TokenEndpoint, TokenRevoker,
};
use crate::types::{CodeExchange, CredentialRecord, GrantAccount, SessionConfig};

use base64::Engine;
use rand::RngCore;

/// Everything the caller needs to send the principal to the authorization
/// server: the URL to redirect to, plus the state and PKCE verifier that
/// must survive until the callback.
#[derive(Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: String,
    /// State parameter for CSRF validation at the callback.
    pub state: String,
    /// PKCE code verifier; required for the token exchange.
    pub code_verifier: String,
}

impl std::fmt::Debug for AuthorizationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationRequest")
            .field("url", &self.url)
            .field("state", &self.state)
            .field("code_verifier", &"[REDACTED]")
            .finish()
    }
}

/// Session manager facade.
pub struct SessionClient<T: HttpTransport = ReqwestHttpTransport, S: SessionStore = InMemorySessionStore>
{
    config: SessionConfig,
    transport: Arc<T>,
    store: Arc<S>,
}

impl SessionClient<ReqwestHttpTransport, InMemorySessionStore> {
    /// Create a client with the default reqwest transport and an in-memory
    /// session store.
    pub fn new(config: SessionConfig) -> Self {
        let timeout = config.timeout;
        Self {
            config,
            transport: Arc::new(ReqwestHttpTransport::with_timeout(timeout)),
            store: Arc::new(InMemorySessionStore::new()),
        }
    }
}

impl<T: HttpTransport, S: SessionStore> SessionClient<T, S> {
    /// Create a client with custom transport and session store.
    pub fn with_components(config: SessionConfig, transport: T, store: S) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
            store: Arc::new(store),
        }
    }

    /// Get the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn lifecycle(&self) -> LifecycleManager<HttpTokenEndpoint<T>, S> {
        LifecycleManager::new(
            self.config.clone(),
            Arc::new(HttpTokenEndpoint::new(
                self.config.clone(),
                self.transport.clone(),
            )),
            self.store.clone(),
        )
    }

    /// Build the authorization URL that starts a sign-in, with a fresh state
    /// and PKCE challenge. The caller keeps the returned state and verifier
    /// until the callback arrives.
    pub fn begin_authorization(&self, redirect_uri: &str) -> AuthResult<AuthorizationRequest> {
        let pkce = core::generate_pkce(self.config.pkce_method);
        let state = random_state();

        let mut url = url::Url::parse(&self.config.provider.authorization_endpoint)
            .map_err(|_| {
                AuthError::Configuration(ConfigurationError::InvalidEndpoint {
                    url: self.config.provider.authorization_endpoint.clone(),
                })
            })?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.credentials.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &self.config.scope_string())
            .append_pair("state", &state)
            .append_pair("code_challenge", &pkce.code_challenge)
            .append_pair("code_challenge_method", pkce.code_challenge_method.as_str());

        Ok(AuthorizationRequest {
            url: url.to_string(),
            state,
            code_verifier: pkce.code_verifier,
        })
    }

    /// Complete a sign-in: exchange the authorization code and record the
    /// grant for the session. State validation against
    /// [`AuthorizationRequest::state`] is the framework boundary's job and
    /// happens before this call.
    pub async fn complete_sign_in(
        &self,
        session_id: &str,
        exchange: CodeExchange,
    ) -> AuthResult<CredentialRecord> {
        let endpoint = HttpTokenEndpoint::new(self.config.clone(), self.transport.clone());
        let response = endpoint.exchange_code(exchange).await?;
        self.lifecycle()
            .record_token_response(session_id, &response)
            .await
    }

    /// Record an externally observed grant (e.g. a framework that performed
    /// its own code exchange).
    pub async fn record_grant(
        &self,
        session_id: &str,
        account: GrantAccount,
    ) -> AuthResult<CredentialRecord> {
        self.lifecycle().record_grant(session_id, account).await
    }

    /// Return a usable credential record, refreshing lazily when stale.
    pub async fn get_valid_token(&self, session_id: &str) -> AuthResult<CredentialRecord> {
        self.lifecycle().get_valid_token(session_id).await
    }

    /// Revoke the session's credential at the authorization server and, on
    /// success, clear the local record and end the session.
    pub async fn revoke(&self, session_id: &str) -> AuthResult<RevocationOutcome> {
        let record = self
            .store
            .load(session_id)
            .await?
            .ok_or(AuthError::NoCredential {
                operation: "token revocation",
            })?;

        let revoker = HttpTokenRevoker::new(self.config.clone(), self.transport.clone());
        let outcome = revoker.revoke(&record).await?;

        if outcome.should_sign_out {
            self.store.delete(session_id).await?;
        }
        Ok(outcome)
    }

    /// End the session locally without contacting the authorization server.
    pub async fn sign_out(&self, session_id: &str) -> AuthResult<bool> {
        self.lifecycle().sign_out(session_id).await
    }

    /// Fetch the userinfo document with the session's bearer token,
    /// refreshing it first if stale. A record in the errored state still
    /// attempts the call with its cached token; the server's 401 is the
    /// authoritative answer.
    pub async fn userinfo(&self, session_id: &str) -> AuthResult<serde_json::Value> {
        let endpoint = self
            .config
            .provider
            .userinfo_endpoint
            .as_ref()
            .ok_or_else(|| {
                AuthError::Configuration(ConfigurationError::MissingRequired {
                    field: "userinfo_endpoint".to_string(),
                })
            })?
            .clone();

        let record = self.get_valid_token(session_id).await?;
        let access_token = record.access_token.as_deref().ok_or(AuthError::NoCredential {
            operation: "userinfo",
        })?;

        let request = HttpRequest::bearer_get(endpoint, access_token, self.config.timeout);
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(AuthError::upstream(response.status, response.body));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            AuthError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })
    }
}

fn random_state() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
