//! Lifecycle Manager
//!
//! The token-lifecycle state machine. On every "needs valid token" request
//! it decides whether the cached access token is still usable, must be
//! refreshed via the refresh token, or the session must fail — evaluated
//! strictly in that order. Refresh is purely demand-driven: no timers, no
//! polling, no retry loop. A failed refresh is surfaced once through the
//! record's `error` field; the next request finds the token still stale and
//! retries naturally.

use std::sync::Arc;
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::session::SessionStore;
use crate::token::{expiry, TokenEndpoint};
use crate::types::{CredentialRecord, GrantAccount, SessionConfig, TokenResponse};

/// Conceptual state of a session's credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No credential has ever been recorded.
    Unauthenticated,
    /// Cached access token is usable without a network call.
    Fresh,
    /// Access token absent or past its skew-adjusted expiry.
    Stale,
    /// Last refresh attempt failed; a stale token may still be cached.
    Errored,
}

/// Classify a record at the given instant (epoch milliseconds).
pub fn session_state(record: &CredentialRecord, now_ms: u64) -> SessionState {
    if record.is_fresh(now_ms) {
        SessionState::Fresh
    } else if record.error.is_some() {
        SessionState::Errored
    } else if record.access_token.is_some() || record.refresh_token.is_some() {
        SessionState::Stale
    } else {
        SessionState::Unauthenticated
    }
}

/// Lifecycle manager: owns the refresh decision, nothing else. Credential
/// records live in the [`SessionStore`]; exchanges go through the
/// [`TokenEndpoint`].
pub struct LifecycleManager<E: TokenEndpoint, S: SessionStore> {
    config: SessionConfig,
    endpoint: Arc<E>,
    store: Arc<S>,
}

impl<E: TokenEndpoint, S: SessionStore> LifecycleManager<E, S> {
    /// Create new lifecycle manager.
    pub fn new(config: SessionConfig, endpoint: Arc<E>, store: Arc<S>) -> Self {
        Self {
            config,
            endpoint,
            store,
        }
    }

    /// Record a successful authorization-code grant for a session,
    /// transitioning it to Fresh.
    ///
    /// Expiry is the server-declared instant when provided, otherwise
    /// `now + fallback_token_lifetime`; the refresh skew is subtracted
    /// either way, so the token reads as stale before the server would
    /// reject it.
    pub async fn record_grant(
        &self,
        session_id: &str,
        account: GrantAccount,
    ) -> AuthResult<CredentialRecord> {
        let expires_at = expiry::expires_at_from_grant(
            expiry::now_ms(),
            account.expires_at,
            self.config.fallback_token_lifetime,
            self.config.refresh_skew,
        );

        let record = CredentialRecord {
            access_token: Some(account.access_token),
            refresh_token: account.refresh_token,
            access_token_expires_at: Some(expires_at),
            error: None,
        };

        self.store.save(session_id, record.clone()).await?;
        debug!(session_id, expires_at, "grant recorded");
        Ok(record)
    }

    /// Record the response of an authorization-code exchange for a session,
    /// transitioning it to Fresh.
    ///
    /// The expiry comes straight from the response's relative `expires_in`,
    /// computed in milliseconds end to end; unlike [`Self::record_grant`]
    /// there is no second-resolution instant involved.
    pub async fn record_token_response(
        &self,
        session_id: &str,
        response: &TokenResponse,
    ) -> AuthResult<CredentialRecord> {
        let expires_at = expiry::expires_at_from_lifetime(
            expiry::now_ms(),
            response.expires_in,
            self.config.fallback_token_lifetime,
            self.config.refresh_skew,
        );

        let record = CredentialRecord {
            access_token: Some(response.access_token.clone()),
            refresh_token: response.refresh_token.clone(),
            access_token_expires_at: Some(expires_at),
            error: None,
        };

        self.store.save(session_id, record.clone()).await?;
        debug!(session_id, expires_at, "exchange recorded");
        Ok(record)
    }

    /// Return a usable credential record for the session, refreshing if the
    /// cached token is stale or absent.
    ///
    /// The fresh path performs zero network calls and does not mutate the
    /// record. The stale path performs exactly one refresh exchange and
    /// persists the outcome, success or error, last write wins. A refresh
    /// failure is not an `Err`: the returned record keeps the previous
    /// tokens and carries the failure in its `error` field so the caller
    /// chooses between using the stale token, prompting re-authentication,
    /// or surfacing the error.
    pub async fn get_valid_token(&self, session_id: &str) -> AuthResult<CredentialRecord> {
        let record = self
            .store
            .load(session_id)
            .await?
            .ok_or(AuthError::NoCredential {
                operation: "get_valid_token",
            })?;

        let now = expiry::now_ms();
        if record.is_fresh(now) {
            return Ok(record);
        }

        debug!(
            session_id,
            state = ?session_state(&record, now),
            "access token stale, refreshing"
        );
        let refreshed = self.endpoint.refresh(&record).await;
        self.store.save(session_id, refreshed.clone()).await?;
        Ok(refreshed)
    }

    /// End a session by deleting its record. Returns whether one existed.
    pub async fn sign_out(&self, session_id: &str) -> AuthResult<bool> {
        let existed = self.store.delete(session_id).await?;
        debug!(session_id, existed, "session signed out");
        Ok(existed)
    }
}
