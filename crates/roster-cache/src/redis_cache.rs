//! [`RedisCache`]: the Redis implementation of [`Cache`].

use std::time::Duration;

use redis::{AsyncCommands as _, aio::ConnectionManager};
use roster_core::cache::Cache;

use crate::{Error, Result};

/// A cache backed by a Redis server.
///
/// The connection manager multiplexes every request over one reconnecting
/// connection, so clones share it and no external locking is needed.
#[derive(Clone)]
pub struct RedisCache {
  manager: ConnectionManager,
  ttl:     Option<Duration>,
}

impl RedisCache {
  /// Connect to `url` (e.g. `redis://127.0.0.1:6379/0`), giving up once
  /// `deadline` has elapsed. Every write expires after `ttl` when set.
  pub async fn connect(
    url: &str,
    ttl: Option<Duration>,
    deadline: Duration,
  ) -> Result<Self> {
    // Zero means no expiry, matching `MemoryCache::with_ttl`.
    let ttl = ttl.filter(|t| !t.is_zero());
    let client = redis::Client::open(url)?;
    let manager = tokio::time::timeout(deadline, ConnectionManager::new(client))
      .await
      .map_err(|_| Error::ConnectTimeout(deadline))??;
    tracing::info!(ttl = ?ttl, "connected to redis cache");
    Ok(Self { manager, ttl })
  }
}

impl Cache for RedisCache {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
    let mut conn = self.manager.clone();
    Ok(conn.get(key).await?)
  }

  async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
    let mut conn = self.manager.clone();
    let _: () = match self.ttl {
      Some(ttl) => conn.set_ex(key, value, ttl.as_secs().max(1)).await?,
      None => conn.set(key, value).await?,
    };
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<()> {
    let mut conn = self.manager.clone();
    let _: i64 = conn.del(key).await?;
    Ok(())
  }
}
