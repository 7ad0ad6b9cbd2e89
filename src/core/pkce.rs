//! PKCE
//!
//! RFC 7636 Proof Key for Code Exchange: verifier generation and challenge
//! computation.

use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::types::PkceMethod;

/// Default verifier length (RFC 7636 allows 43..=128).
pub const DEFAULT_VERIFIER_LENGTH: usize = 64;

/// PKCE verifier/challenge pair.
#[derive(Clone)]
pub struct PkceParams {
    /// Code verifier (keep secret until the token exchange).
    pub code_verifier: String,
    /// Code challenge (sent in the authorization URL).
    pub code_challenge: String,
    /// Challenge method used.
    pub code_challenge_method: PkceMethod,
}

impl std::fmt::Debug for PkceParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceParams")
            .field("code_verifier", &"[REDACTED]")
            .field("code_challenge", &self.code_challenge)
            .field("code_challenge_method", &self.code_challenge_method)
            .finish()
    }
}

/// Generate PKCE parameters with the default verifier length.
pub fn generate_pkce(method: PkceMethod) -> PkceParams {
    let code_verifier = generate_verifier(DEFAULT_VERIFIER_LENGTH);
    let code_challenge = compute_challenge(&code_verifier, method);

    PkceParams {
        code_verifier,
        code_challenge,
        code_challenge_method: method,
    }
}

/// Generate a random code verifier of the given length.
///
/// # Panics
/// Panics if length is not between 43 and 128 (RFC 7636 requirement).
pub fn generate_verifier(length: usize) -> String {
    assert!(
        (43..=128).contains(&length),
        "PKCE verifier length must be between 43 and 128"
    );

    let mut rng = rand::thread_rng();
    let bytes_needed = (length * 3 + 3) / 4;
    let random_bytes: Vec<u8> = (0..bytes_needed).map(|_| rng.gen()).collect();

    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&random_bytes);
    encoded[..length].to_string()
}

/// Compute the challenge for a verifier.
pub fn compute_challenge(verifier: &str, method: PkceMethod) -> String {
    match method {
        PkceMethod::Plain => verifier.to_string(),
        PkceMethod::S256 => {
            // S256: BASE64URL(SHA256(code_verifier))
            let hash = Sha256::digest(verifier.as_bytes());
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash)
        }
    }
}

/// Validate PKCE verifier format.
pub fn is_valid_verifier(verifier: &str) -> bool {
    let len = verifier.len();
    if !(43..=128).contains(&len) {
        return false;
    }

    // Unreserved characters only: [A-Z] / [a-z] / [0-9] / "-" / "." / "_" / "~"
    verifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~')
}
