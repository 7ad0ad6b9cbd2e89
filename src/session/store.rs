//! Session Store
//!
//! The Session Adapter seam: whoever owns persistence and transport of the
//! per-session [`CredentialRecord`] implements this trait. The lifecycle
//! manager only ever loads a record, computes a new one, and saves it back;
//! it never holds hidden state of its own.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{AuthError, AuthResult};
use crate::types::CredentialRecord;

/// Credential record storage interface, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the record for a session, if one exists.
    async fn load(&self, session_id: &str) -> AuthResult<Option<CredentialRecord>>;

    /// Save a record, replacing any previous one (last write wins).
    async fn save(&self, session_id: &str, record: CredentialRecord) -> AuthResult<()>;

    /// Delete a session's record. Returns whether one existed.
    async fn delete(&self, session_id: &str) -> AuthResult<bool>;
}

/// In-memory session store. Suitable for single-process deployments and
/// tests; production session adapters typically wrap an external store.
#[derive(Default)]
pub struct InMemorySessionStore {
    records: Mutex<HashMap<String, CredentialRecord>>,
}

impl InMemorySessionStore {
    /// Create new in-memory session store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> AuthResult<Option<CredentialRecord>> {
        Ok(self.records.lock().unwrap().get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, record: CredentialRecord) -> AuthResult<()> {
        self.records
            .lock()
            .unwrap()
            .insert(session_id.to_string(), record);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> AuthResult<bool> {
        Ok(self.records.lock().unwrap().remove(session_id).is_some())
    }
}

/// Mock session store for testing.
#[derive(Default)]
pub struct MockSessionStore {
    records: Mutex<HashMap<String, CredentialRecord>>,
    save_history: Mutex<Vec<(String, CredentialRecord)>>,
    load_history: Mutex<Vec<String>>,
    next_error: Mutex<Option<AuthError>>,
}

impl MockSessionStore {
    /// Create new mock session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record.
    pub fn add_record(&self, session_id: &str, record: CredentialRecord) -> &Self {
        self.records
            .lock()
            .unwrap()
            .insert(session_id.to_string(), record);
        self
    }

    /// Set next error to return.
    pub fn set_next_error(&self, error: AuthError) -> &Self {
        *self.next_error.lock().unwrap() = Some(error);
        self
    }

    /// Get save history.
    pub fn get_save_history(&self) -> Vec<(String, CredentialRecord)> {
        self.save_history.lock().unwrap().clone()
    }

    /// Get load history.
    pub fn get_load_history(&self) -> Vec<String> {
        self.load_history.lock().unwrap().clone()
    }

    fn check_error(&self) -> AuthResult<()> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn load(&self, session_id: &str) -> AuthResult<Option<CredentialRecord>> {
        self.check_error()?;
        self.load_history.lock().unwrap().push(session_id.to_string());
        Ok(self.records.lock().unwrap().get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, record: CredentialRecord) -> AuthResult<()> {
        self.check_error()?;
        self.save_history
            .lock()
            .unwrap()
            .push((session_id.to_string(), record.clone()));
        self.records
            .lock()
            .unwrap()
            .insert(session_id.to_string(), record);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> AuthResult<bool> {
        self.check_error()?;
        Ok(self.records.lock().unwrap().remove(session_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record() -> CredentialRecord {
        CredentialRecord {
            access_token: Some("access".to_string()),
            refresh_token: Some("refresh".to_string()),
            access_token_expires_at: Some(1_700_000_000_000),
            error: None,
        }
    }

    #[tokio::test]
    async fn test_in_memory_save_load_delete() {
        let store = InMemorySessionStore::new();

        assert!(store.load("s1").await.unwrap().is_none());

        store.save("s1", test_record()).await.unwrap();
        let loaded = store.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("access"));

        assert!(store.delete("s1").await.unwrap());
        assert!(!store.delete("s1").await.unwrap());
        assert!(store.load("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_records_are_per_session() {
        let store = InMemorySessionStore::new();
        store.save("s1", test_record()).await.unwrap();

        let mut other = test_record();
        other.access_token = Some("other-access".to_string());
        store.save("s2", other).await.unwrap();

        assert_eq!(
            store.load("s1").await.unwrap().unwrap().access_token.as_deref(),
            Some("access")
        );
        assert_eq!(
            store.load("s2").await.unwrap().unwrap().access_token.as_deref(),
            Some("other-access")
        );
    }

    #[tokio::test]
    async fn test_in_memory_last_write_wins() {
        let store = InMemorySessionStore::new();
        store.save("s1", test_record()).await.unwrap();

        let mut updated = test_record();
        updated.access_token = Some("newer".to_string());
        store.save("s1", updated).await.unwrap();

        assert_eq!(
            store.load("s1").await.unwrap().unwrap().access_token.as_deref(),
            Some("newer")
        );
    }

    #[tokio::test]
    async fn test_mock_store_histories() {
        let store = MockSessionStore::new();
        store.add_record("s1", test_record());

        store.load("s1").await.unwrap();
        store.save("s1", test_record()).await.unwrap();

        assert_eq!(store.get_load_history(), vec!["s1".to_string()]);
        assert_eq!(store.get_save_history().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_store_error_injection() {
        let store = MockSessionStore::new();
        store.set_next_error(AuthError::Store(crate::error::StoreError::ReadFailed {
            message: "boom".to_string(),
        }));

        assert!(store.load("s1").await.is_err());
        // Error is consumed; next call succeeds.
        assert!(store.load("s1").await.is_ok());
    }
}
