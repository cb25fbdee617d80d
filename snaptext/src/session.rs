use std::collections::HashMap;

use chrono::{DateTime, Utc};
use nanoid::nanoid;
use tokio::sync::RwLock;

use crate::error::{Result, SnaptextError};
use crate::extract::LanguageSelection;

/// Per-session context: at most the last extraction result and the last
/// language selection. Lifecycle is tied to the session, nothing survives
/// a process restart.
#[derive(Debug, Clone)]
pub struct Session {
    pub result: Option<String>,
    pub languages: Option<LanguageSelection>,
    created_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self {
            result: None,
            languages: None,
            created_at: Utc::now(),
        }
    }
}

/// In-memory store of session contexts, keyed by nanoid. Capacity-bounded:
/// creating a session past capacity evicts the oldest one.
pub struct SessionStore {
    inner: RwLock<HashMap<String, Session>>,
    capacity: usize,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub async fn create(&self) -> String {
        let mut sessions = self.inner.write().await;
        if sessions.len() >= self.capacity {
            if let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, s)| s.created_at)
                .map(|(id, _)| id.clone())
            {
                sessions.remove(&oldest);
            }
        }
        let id = nanoid!();
        sessions.insert(id.clone(), Session::new());
        id
    }

    pub async fn get(&self, id: &str) -> Result<Session> {
        self.inner
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SnaptextError::NotFound(format!("Session {id} not found")))
    }

    /// Cache an extraction result (success or mapped error string) and,
    /// for local extractions, the language selection it used. Overwrites
    /// any prior result.
    pub async fn store_result(
        &self,
        id: &str,
        result: String,
        languages: Option<LanguageSelection>,
    ) -> Result<()> {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SnaptextError::NotFound(format!("Session {id} not found")))?;
        session.result = Some(result);
        if let Some(selection) = languages {
            session.languages = Some(selection);
        }
        Ok(())
    }

    /// Remove the cached result and selection, reverting the session to
    /// its pre-extraction state. Returns whether anything was cleared.
    pub async fn clear_result(&self, id: &str) -> Result<bool> {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SnaptextError::NotFound(format!("Session {id} not found")))?;
        let cleared = session.result.is_some();
        session.result = None;
        session.languages = None;
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_and_get() {
        let store = SessionStore::new(8);
        let id = store.create().await;
        let session = store.get(&id).await.unwrap();
        assert!(session.result.is_none());
        assert!(session.languages.is_none());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = SessionStore::new(8);
        assert!(store.get("missing").await.is_err());
        assert!(store.store_result("missing", "x".into(), None).await.is_err());
        assert!(store.clear_result("missing").await.is_err());
    }

    #[tokio::test]
    async fn result_is_cached_and_overwritten() {
        let store = SessionStore::new(8);
        let id = store.create().await;

        store.store_result(&id, "first".into(), None).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().result.as_deref(), Some("first"));

        store.store_result(&id, "second".into(), None).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().result.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn languages_are_cached_with_local_results() {
        let store = SessionStore::new(8);
        let id = store.create().await;
        let selection = LanguageSelection::new(["en", "ja"]).unwrap();

        store
            .store_result(&id, "text".into(), Some(selection.clone()))
            .await
            .unwrap();

        let session = store.get(&id).await.unwrap();
        assert_eq!(session.languages, Some(selection));
    }

    #[tokio::test]
    async fn clear_removes_cached_result() {
        let store = SessionStore::new(8);
        let id = store.create().await;
        store.store_result(&id, "text".into(), None).await.unwrap();

        assert!(store.clear_result(&id).await.unwrap());
        let session = store.get(&id).await.unwrap();
        assert!(session.result.is_none());
        assert!(session.languages.is_none());

        // Clearing again reports nothing to clear.
        assert!(!store.clear_result(&id).await.unwrap());
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_session() {
        let store = SessionStore::new(2);
        let first = store.create().await;
        // Created-at has millisecond resolution in practice; force ordering.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create().await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let third = store.create().await;

        assert!(store.get(&first).await.is_err());
        assert!(store.get(&second).await.is_ok());
        assert!(store.get(&third).await.is_ok());
    }
}
