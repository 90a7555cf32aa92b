//! Redis implementation of the session list backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::ListStore;
use crate::core::errors::PipelineError;

/// Key-ordered-list store over a shared Redis instance.
///
/// The connection manager reconnects on its own; individual command failures
/// still surface to the caller.
#[derive(Clone)]
pub struct RedisListStore {
    manager: ConnectionManager,
}

impl RedisListStore {
    pub async fn connect(url: &str) -> Result<Self, PipelineError> {
        let client = redis::Client::open(url)
            .map_err(|e| PipelineError::Store(format!("invalid redis url: {}", e)))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| PipelineError::Store(format!("redis connect failed: {}", e)))?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl ListStore for RedisListStore {
    async fn push(&self, key: &str, element: String, ttl: Duration) -> Result<(), PipelineError> {
        let mut conn = self.manager.clone();
        // RPUSH + EXPIRE in one MULTI/EXEC block: the list never exists
        // without a fresh TTL after a successful write.
        redis::pipe()
            .atomic()
            .rpush(key, element)
            .ignore()
            .expire(key, ttl.as_secs() as i64)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| PipelineError::Store(format!("append failed: {}", e)))
    }

    async fn elements(&self, key: &str) -> Result<Vec<String>, PipelineError> {
        let mut conn = self.manager.clone();
        conn.lrange::<_, Vec<String>>(key, 0, -1)
            .await
            .map_err(|e| PipelineError::Store(format!("range read failed: {}", e)))
    }

    async fn remove(&self, key: &str) -> Result<(), PipelineError> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| PipelineError::Store(format!("delete failed: {}", e)))
    }

    async fn ping(&self) -> bool {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }
}
