pub mod memory;
pub mod redis_cache;

pub use self::memory::MemoryCache;
pub use self::redis_cache::RedisCache;

use std::time::Duration;

use async_trait::async_trait;

/// String key/value store with expiry. Callers treat every error as a miss.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> anyhow::Result<()>;
}
