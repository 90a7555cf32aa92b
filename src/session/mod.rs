//! Session history: a TTL-bounded, append-only log of conversation turns.
//!
//! Each session is one ordered list in an external key-value store, keyed
//! `session:{id}`, with every element a JSON-serialized [`Turn`]. The whole
//! list expires after a fixed TTL measured from the last write; every append
//! refreshes it. Turns are never mutated, reordered or truncated after
//! insertion.

mod redis;

pub use self::redis::RedisListStore;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::errors::PipelineError;

const SESSION_KEY_PREFIX: &str = "session:";
const ID_SUFFIX_LEN: usize = 9;

/// A citation retained with an assistant turn, so history replay can show
/// prior sources without re-querying the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub link: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceRef>>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now().timestamp_millis(),
            sources: None,
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<SourceRef>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now().timestamp_millis(),
            sources: Some(sources),
        }
    }
}

/// Seam over the backing key-ordered-list store.
///
/// `push` must apply the element append and the TTL refresh atomically:
/// a successful write never leaves the list without an expiry.
#[async_trait]
pub trait ListStore: Send + Sync {
    async fn push(&self, key: &str, element: String, ttl: Duration) -> Result<(), PipelineError>;

    async fn elements(&self, key: &str) -> Result<Vec<String>, PipelineError>;

    async fn remove(&self, key: &str) -> Result<(), PipelineError>;

    /// Reachability probe. Never errors.
    async fn ping(&self) -> bool;
}

/// Per-session append-only message log over a [`ListStore`] backend.
///
/// Holds no in-process session content; every read and write round-trips to
/// the backend. Concurrent appends to the same session are not sequenced
/// here beyond the backend's atomic list-append (each one refreshes the TTL).
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn ListStore>,
    ttl: Duration,
    max_turn_bytes: usize,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn ListStore>, ttl: Duration, max_turn_bytes: usize) -> Self {
        Self {
            backend,
            ttl,
            max_turn_bytes,
        }
    }

    /// Produce a fresh session identifier: millisecond timestamp plus a
    /// random alphanumeric suffix. Pure, no I/O.
    pub fn generate_id() -> String {
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(ID_SUFFIX_LEN)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect();
        format!("session_{}_{}", Utc::now().timestamp_millis(), suffix)
    }

    /// Append a turn to the session log and refresh the log's TTL.
    ///
    /// Rejects malformed ids, empty content and turns whose serialized form
    /// exceeds the size cap; an oversized turn is refused outright, never
    /// truncated. Backend failures surface: silently losing a turn would
    /// break the append-only guarantee.
    pub async fn append(&self, session_id: &str, turn: &Turn) -> Result<(), PipelineError> {
        let key = session_key(session_id)?;

        if turn.content.trim().is_empty() {
            return Err(PipelineError::Validation(
                "turn content must not be empty".to_string(),
            ));
        }

        let payload = serde_json::to_string(turn)
            .map_err(|e| PipelineError::Store(format!("failed to serialize turn: {}", e)))?;
        if payload.len() > self.max_turn_bytes {
            return Err(PipelineError::Validation(format!(
                "turn exceeds maximum size of {} bytes",
                self.max_turn_bytes
            )));
        }

        self.backend.push(&key, payload, self.ttl).await
    }

    /// Read the full ordered turn sequence for a session.
    ///
    /// A missing or expired session yields an empty sequence, as does an
    /// unreachable backend (reads degrade, writes do not). Entries that fail
    /// to deserialize are dropped individually.
    pub async fn history(&self, session_id: &str) -> Result<Vec<Turn>, PipelineError> {
        let key = session_key(session_id)?;

        let raw = match self.backend.elements(&key).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("session history read degraded to empty: {}", err);
                return Ok(Vec::new());
            }
        };

        let turns = raw
            .iter()
            .filter_map(|entry| match serde_json::from_str::<Turn>(entry) {
                Ok(turn) => Some(turn),
                Err(err) => {
                    tracing::warn!("dropping corrupt history entry: {}", err);
                    None
                }
            })
            .collect();

        Ok(turns)
    }

    /// Delete a session log. Clearing a non-existent session is not an error.
    pub async fn clear(&self, session_id: &str) -> Result<(), PipelineError> {
        let key = session_key(session_id)?;
        self.backend.remove(&key).await
    }

    /// Lightweight backend reachability probe. Never errors.
    pub async fn check_liveness(&self) -> bool {
        self.backend.ping().await
    }
}

fn session_key(session_id: &str) -> Result<String, PipelineError> {
    if session_id.trim().is_empty() {
        return Err(PipelineError::Validation(
            "session id must not be empty".to_string(),
        ));
    }
    Ok(format!("{}{}", SESSION_KEY_PREFIX, session_id))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory list store standing in for the external backend.
    pub struct InMemoryListStore {
        pub lists: Mutex<HashMap<String, (Vec<String>, Duration)>>,
        pub reachable: bool,
    }

    impl InMemoryListStore {
        pub fn new() -> Self {
            Self {
                lists: Mutex::new(HashMap::new()),
                reachable: true,
            }
        }

        pub fn unreachable() -> Self {
            Self {
                lists: Mutex::new(HashMap::new()),
                reachable: false,
            }
        }

        pub fn write_count(&self) -> usize {
            self.lists
                .lock()
                .unwrap()
                .values()
                .map(|(items, _)| items.len())
                .sum()
        }
    }

    #[async_trait]
    impl ListStore for InMemoryListStore {
        async fn push(
            &self,
            key: &str,
            element: String,
            ttl: Duration,
        ) -> Result<(), PipelineError> {
            if !self.reachable {
                return Err(PipelineError::Store("connection refused".to_string()));
            }
            let mut lists = self.lists.lock().unwrap();
            let entry = lists
                .entry(key.to_string())
                .or_insert_with(|| (Vec::new(), Duration::ZERO));
            entry.0.push(element);
            entry.1 = ttl;
            Ok(())
        }

        async fn elements(&self, key: &str) -> Result<Vec<String>, PipelineError> {
            if !self.reachable {
                return Err(PipelineError::Store("connection refused".to_string()));
            }
            let lists = self.lists.lock().unwrap();
            Ok(lists
                .get(key)
                .map(|(items, _)| items.clone())
                .unwrap_or_default())
        }

        async fn remove(&self, key: &str) -> Result<(), PipelineError> {
            if !self.reachable {
                return Err(PipelineError::Store("connection refused".to_string()));
            }
            self.lists.lock().unwrap().remove(key);
            Ok(())
        }

        async fn ping(&self) -> bool {
            self.reachable
        }
    }

    fn store_with(backend: Arc<InMemoryListStore>) -> SessionStore {
        SessionStore::new(backend, Duration::from_secs(3600), 10_000)
    }

    #[tokio::test]
    async fn append_then_history_preserves_order_and_fields() {
        let backend = Arc::new(InMemoryListStore::new());
        let store = store_with(backend);

        let user = Turn::user("what happened today?");
        let assistant = Turn::assistant(
            "markets rallied",
            vec![SourceRef {
                title: "Markets rally".to_string(),
                link: "https://example.com/a".to_string(),
                score: 0.91,
            }],
        );

        store.append("s1", &user).await.unwrap();
        store.append("s1", &assistant).await.unwrap();

        let history = store.history("s1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], user);
        assert_eq!(history[1], assistant);
    }

    #[tokio::test]
    async fn round_trip_is_field_for_field_equal() {
        let backend = Arc::new(InMemoryListStore::new());
        let store = store_with(backend);

        let turn = Turn {
            role: Role::Assistant,
            content: "done".to_string(),
            timestamp: 1_700_000_000_123,
            sources: Some(vec![SourceRef {
                title: "T".to_string(),
                link: "https://example.com".to_string(),
                score: 0.5,
            }]),
        };
        store.append("s1", &turn).await.unwrap();

        let read_back = &store.history("s1").await.unwrap()[0];
        assert_eq!(read_back, &turn);
        assert_eq!(
            serde_json::to_string(read_back).unwrap(),
            serde_json::to_string(&turn).unwrap()
        );
    }

    #[tokio::test]
    async fn history_of_unknown_or_cleared_session_is_empty() {
        let backend = Arc::new(InMemoryListStore::new());
        let store = store_with(backend);

        assert!(store.history("never-created").await.unwrap().is_empty());

        store.append("s1", &Turn::user("hi")).await.unwrap();
        store.clear("s1").await.unwrap();
        assert!(store.history("s1").await.unwrap().is_empty());

        // Clearing again is not an error.
        store.clear("s1").await.unwrap();
    }

    #[tokio::test]
    async fn rejects_empty_id_empty_content_and_oversized_turns() {
        let backend = Arc::new(InMemoryListStore::new());
        let store = store_with(backend.clone());

        let err = store.append("  ", &Turn::user("hi")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));

        let err = store.append("s1", &Turn::user("   ")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));

        let big = Turn::user("x".repeat(10_001));
        let err = store.append("s1", &big).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));

        // None of the rejected turns reached the backend.
        assert_eq!(backend.write_count(), 0);
    }

    #[tokio::test]
    async fn corrupt_entries_are_dropped_not_fatal() {
        let backend = Arc::new(InMemoryListStore::new());
        backend
            .push("session:s1", "{not json".to_string(), Duration::from_secs(1))
            .await
            .unwrap();
        let store = store_with(backend.clone());
        store.append("s1", &Turn::user("hello")).await.unwrap();

        let history = store.history("s1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "hello");
    }

    #[tokio::test]
    async fn every_append_refreshes_the_ttl() {
        let backend = Arc::new(InMemoryListStore::new());
        let store = SessionStore::new(backend.clone(), Duration::from_secs(1234), 10_000);

        store.append("s1", &Turn::user("one")).await.unwrap();
        store.append("s1", &Turn::user("two")).await.unwrap();

        let lists = backend.lists.lock().unwrap();
        let (items, ttl) = lists.get("session:s1").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(*ttl, Duration::from_secs(1234));
    }

    #[tokio::test]
    async fn reads_degrade_to_empty_but_writes_surface() {
        let backend = Arc::new(InMemoryListStore::unreachable());
        let store = store_with(backend);

        assert!(store.history("s1").await.unwrap().is_empty());
        assert!(!store.check_liveness().await);

        let err = store.append("s1", &Turn::user("hi")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Store(_)));
    }

    #[test]
    fn generated_ids_have_expected_shape_and_do_not_collide() {
        let a = SessionStore::generate_id();
        let b = SessionStore::generate_id();
        assert!(a.starts_with("session_"));
        assert_ne!(a, b);
        let suffix = a.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
    }

    #[test]
    fn turn_wire_shape_omits_absent_sources() {
        let json = serde_json::to_value(Turn {
            role: Role::User,
            content: "q".to_string(),
            timestamp: 1,
            sources: None,
        })
        .unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("sources").is_none());
    }
}
