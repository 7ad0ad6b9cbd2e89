//! Session Lifecycle
//!
//! The credential-lifecycle state machine and the session adapter seam it
//! loads records through.

pub mod lifecycle;
pub mod store;

pub use lifecycle::{session_state, LifecycleManager, SessionState};
pub use store::{InMemorySessionStore, MockSessionStore, SessionStore};
