//! Data Types
//!
//! Session manager data structures and configuration types.

mod config;
mod credential;
mod token;

pub use config::{
    ClientCredentials, PkceMethod, ProviderEndpoints, SessionConfig, DEFAULT_FALLBACK_LIFETIME,
    DEFAULT_REFRESH_SKEW, DEFAULT_TIMEOUT,
};
pub use credential::{CredentialRecord, GrantAccount, RefreshFailure};
pub use token::{CodeExchange, TokenResponse, TokenTypeHint};
