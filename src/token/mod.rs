//! Token Protocol Clients
//!
//! The outbound exchanges (authorization-code, refresh, revocation) and the
//! skewed expiry arithmetic they share.

pub mod endpoint;
pub mod expiry;
pub mod revocation;

pub use endpoint::{HttpTokenEndpoint, MockTokenEndpoint, TokenEndpoint};
pub use expiry::{expires_at_from_grant, expires_at_from_lifetime, now_ms};
pub use revocation::{HttpTokenRevoker, MockTokenRevoker, RevocationOutcome, TokenRevoker};
