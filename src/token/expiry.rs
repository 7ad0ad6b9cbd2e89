//! Expiry Arithmetic
//!
//! Computes the skew-adjusted absolute expiry stored on a credential record.
//! The same computation serves the initial grant and every refresh: a token
//! is treated as stale `skew` before the server would actually reject it, to
//! absorb clock drift and request latency.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current instant in epoch milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Expiry for a token endpoint response carrying `expires_in` seconds.
///
/// `expires_at = now + expires_in * 1000 - skew`; when `expires_in` is
/// absent the fallback lifetime substitutes for it, which with the default
/// 60 s fallback and 60 s skew makes the token immediately stale.
pub fn expires_at_from_lifetime(
    now_ms: u64,
    expires_in_secs: Option<u64>,
    fallback_lifetime: Duration,
    skew: Duration,
) -> u64 {
    let lifetime_ms = match expires_in_secs {
        Some(secs) => secs.saturating_mul(1_000),
        None => fallback_lifetime.as_millis() as u64,
    };
    now_ms
        .saturating_add(lifetime_ms)
        .saturating_sub(skew.as_millis() as u64)
}

/// Expiry for a sign-in grant, where providers declare an absolute
/// `expires_at` in epoch **seconds** instead of a relative lifetime.
///
/// Prefers the server-declared instant; falls back to `now + fallback` when
/// absent. The skew is subtracted either way.
pub fn expires_at_from_grant(
    now_ms: u64,
    server_expires_at_secs: Option<u64>,
    fallback_lifetime: Duration,
    skew: Duration,
) -> u64 {
    let absolute_ms = match server_expires_at_secs {
        Some(secs) => secs.saturating_mul(1_000),
        None => now_ms.saturating_add(fallback_lifetime.as_millis() as u64),
    };
    absolute_ms.saturating_sub(skew.as_millis() as u64)
}
