//! Credential Record
//!
//! The per-session data entity the lifecycle state machine operates on: the
//! cached access token, the optional refresh token, the skew-adjusted expiry
//! instant, and the last refresh failure (if any).

use serde::{Deserialize, Serialize};

/// Failure classification recorded on a credential after a refresh attempt.
///
/// Serialized names match the values the session adapter exposes to the
/// consuming application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshFailure {
    /// The authorization server answered the refresh with a non-2xx status.
    #[serde(rename = "RefreshTokenFetchError")]
    Fetch,
    /// The refresh never produced a usable response: network failure,
    /// timeout, or an unparseable body.
    #[serde(rename = "RefreshTokenUnexpectedError")]
    Unexpected,
}

/// One credential record per authenticated principal/session.
///
/// The record is owned by the session adapter; the lifecycle manager only
/// ever receives a record, computes a new one, and hands it back. A failed
/// refresh sets `error` but keeps the previous tokens so a caller may elect
/// to try a possibly-still-valid cached token instead of being left with
/// nothing.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Current bearer credential; absent before first sign-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Long-lived credential used to mint new access tokens; absent when the
    /// server does not issue one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiry of `access_token` in epoch milliseconds, already
    /// adjusted by the refresh safety skew. Present whenever `access_token`
    /// is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<u64>,
    /// Last failure encountered while refreshing; cleared on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RefreshFailure>,
}

impl CredentialRecord {
    /// Empty record for a session that has never signed in.
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Check whether the cached access token can be returned without a
    /// network call at the given instant (epoch milliseconds).
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        match (&self.access_token, self.access_token_expires_at) {
            (Some(_), Some(expires_at)) => now_ms < expires_at,
            _ => false,
        }
    }

    /// Check whether any credential has ever been recorded.
    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Copy of this record with the refresh failure set and all credential
    /// fields preserved.
    pub fn with_error(&self, failure: RefreshFailure) -> Self {
        Self {
            error: Some(failure),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("access_token_expires_at", &self.access_token_expires_at)
            .field("error", &self.error)
            .finish()
    }
}

/// What the sign-in callback observes after a successful authorization-code
/// grant: the freshly issued tokens plus the server-declared expiry, if any.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GrantAccount {
    /// Access token issued by the grant.
    pub access_token: String,
    /// Refresh token issued by the grant, when the server rotates one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Server-declared expiry in epoch **seconds** (as providers report it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}
