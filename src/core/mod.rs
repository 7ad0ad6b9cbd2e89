//! Core Infrastructure
//!
//! HTTP transport seam and PKCE primitives shared by the protocol clients.

pub mod pkce;
pub mod transport;

pub use pkce::{
    compute_challenge, generate_pkce, generate_verifier, is_valid_verifier, PkceParams,
    DEFAULT_VERIFIER_LENGTH,
};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport, ReqwestHttpTransport,
};
