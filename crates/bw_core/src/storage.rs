use std::time::Duration;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use crate::Result;

/// Shared, time-bounded key-value store.
///
/// Values are opaque JSON documents. Each operation is atomic for its key;
/// there is no cross-key coordination.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Return the value for `key` unless it is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value`, expiring after `ttl` or the store's default when `None`.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()>;
}

/// Typed read. A value that no longer decodes is reported as a miss.
pub async fn load<T: DeserializeOwned>(cache: &dyn CacheStore, key: &str) -> Result<Option<T>> {
    let Some(value) = cache.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_value(value) {
        Ok(decoded) => Ok(Some(decoded)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
            Ok(None)
        }
    }
}

pub async fn store<T: Serialize + Sync>(
    cache: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> Result<()> {
    cache.set(key, serde_json::to_value(value)?, ttl).await
}
