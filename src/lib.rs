//! OAuth2 Session Manager
//!
//! Session-scoped OAuth2/OIDC credential management: acquire tokens through
//! the authorization-code grant, cache them per session, refresh them lazily
//! when a skewed expiry deadline passes, and revoke them at sign-out.
//!
//! # Features
//!
//! - Authorization Code grant with PKCE (RFC 6749 Section 4.1, RFC 7636)
//! - Token Refresh on demand (RFC 6749 Section 6)
//! - Token Revocation (RFC 7009)
//! - Per-session credential records with skew-adjusted expiry
//! - Stale-but-usable semantics: a failed refresh keeps the prior tokens
//!   and marks the record instead of discarding the session
//!
//! # Example
//!
//! ```rust,ignore
//! use oauth2_session::{session_config, SessionClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = session_config()
//!         .client_id("my-client-id")
//!         .client_secret("my-client-secret")
//!         .authorization_endpoint("https://provider.com/authorize")
//!         .token_endpoint("https://provider.com/token")
//!         .revocation_endpoint("https://provider.com/revoke")
//!         .add_scope("openid")
//!         .add_scope("profile")
//!         .build()?;
//!
//!     let client = SessionClient::new(config);
//!
//!     // Build the authorization URL with PKCE
//!     let request = client.begin_authorization("https://myapp.com/callback")?;
//!     println!("Redirect to: {}", request.url);
//!     // ... user signs in, callback delivers the code ...
//!
//!     // Every later read refreshes lazily when the token is stale
//!     let record = client.get_valid_token("session-1").await?;
//!     println!("Bearer token: {:?}", record.access_token);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: credential records, token wire types, configuration
//! - `error`: error hierarchy with upstream-response mapping
//! - `core`: HTTP transport seam and PKCE primitives
//! - `token`: token endpoint and revocation clients, expiry arithmetic
//! - `session`: session store seam and the credential lifecycle manager
//! - `builders`: fluent configuration builder
//! - `client`: high-level session client combining all functionality

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod session;
pub mod token;
pub mod types;

// Re-export main client
pub use client::{AuthorizationRequest, SessionClient};

// Re-export builders
pub use builders::{session_config, SessionConfigBuilder};

// Re-export errors
pub use error::{
    parse_error_response, AuthError, AuthResult, ConfigurationError, OAuth2ErrorResponse,
    ProtocolError, StoreError, TransportError,
};

// Re-export types
pub use types::{
    // Config
    ClientCredentials, PkceMethod, ProviderEndpoints, SessionConfig, DEFAULT_FALLBACK_LIFETIME,
    DEFAULT_REFRESH_SKEW,
    // Credential
    CredentialRecord, GrantAccount, RefreshFailure,
    // Token wire types
    CodeExchange, TokenResponse, TokenTypeHint,
};

// Re-export core components
pub use crate::core::{
    // Transport
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport, ReqwestHttpTransport,
    // PKCE
    compute_challenge, generate_pkce, generate_verifier, is_valid_verifier, PkceParams,
};

// Re-export token clients
pub use token::{
    HttpTokenEndpoint, HttpTokenRevoker, MockTokenEndpoint, MockTokenRevoker, RevocationOutcome,
    TokenEndpoint, TokenRevoker,
};

// Re-export session management
pub use session::{
    session_state, InMemorySessionStore, LifecycleManager, MockSessionStore, SessionState,
    SessionStore,
};
