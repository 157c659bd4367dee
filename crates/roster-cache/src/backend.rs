//! [`CacheBackend`]: runtime choice between Redis and the in-process cache.

use std::time::Duration;

use roster_core::cache::Cache;

use crate::{MemoryCache, RedisCache, Result};

#[derive(Clone)]
pub enum CacheBackend {
  Redis(RedisCache),
  Memory(MemoryCache),
}

impl CacheBackend {
  /// Connect to Redis at `url`, or fall back to an in-process cache when no
  /// URL is configured.
  pub async fn connect(
    url: Option<&str>,
    ttl: Option<Duration>,
    deadline: Duration,
  ) -> Result<Self> {
    match url {
      Some(url) => Ok(Self::Redis(RedisCache::connect(url, ttl, deadline).await?)),
      None => {
        tracing::warn!("no cache url configured; using an in-process cache");
        Ok(Self::Memory(match ttl {
          Some(ttl) => MemoryCache::with_ttl(ttl),
          None => MemoryCache::new(),
        }))
      }
    }
  }
}

impl Cache for CacheBackend {
  type Error = crate::Error;

  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
    match self {
      Self::Redis(c) => c.get(key).await,
      Self::Memory(c) => c.get(key).await,
    }
  }

  async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
    match self {
      Self::Redis(c) => c.set(key, value).await,
      Self::Memory(c) => c.set(key, value).await,
    }
  }

  async fn delete(&self, key: &str) -> Result<()> {
    match self {
      Self::Redis(c) => c.delete(key).await,
      Self::Memory(c) => c.delete(key).await,
    }
  }
}
