//! [`MemoryCache`]: an in-process implementation of [`Cache`].

use std::{collections::HashMap, sync::Arc, time::Duration};

use roster_core::cache::Cache;
use tokio::{sync::RwLock, time::Instant};

use crate::Result;

struct Entry {
  value:      Vec<u8>,
  expires_at: Option<Instant>,
}

impl Entry {
  fn is_live(&self, now: Instant) -> bool {
    self.expires_at.is_none_or(|at| now < at)
  }
}

/// A cache held in a `HashMap` behind an async `RwLock`.
///
/// Cloning is cheap and clones share the same entries.
#[derive(Clone, Default)]
pub struct MemoryCache {
  entries: Arc<RwLock<HashMap<String, Entry>>>,
  ttl:     Option<Duration>,
}

impl MemoryCache {
  pub fn new() -> Self { Self::default() }

  /// A cache whose entries expire `ttl` after they are written. A zero `ttl`
  /// means entries never expire.
  pub fn with_ttl(ttl: Duration) -> Self {
    Self { ttl: Some(ttl).filter(|t| !t.is_zero()), ..Self::default() }
  }

  /// Whether `key` currently holds a live entry.
  pub async fn contains(&self, key: &str) -> bool {
    let now = Instant::now();
    self
      .entries
      .read()
      .await
      .get(key)
      .is_some_and(|e| e.is_live(now))
  }

  /// Number of live entries.
  pub async fn len(&self) -> usize {
    let now = Instant::now();
    self.entries.read().await.values().filter(|e| e.is_live(now)).count()
  }

  pub async fn is_empty(&self) -> bool { self.len().await == 0 }
}

impl Cache for MemoryCache {
  type Error = crate::Error;

  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
    let now = Instant::now();
    {
      let entries = self.entries.read().await;
      match entries.get(key) {
        None => return Ok(None),
        Some(e) if e.is_live(now) => return Ok(Some(e.value.clone())),
        Some(_) => {}
      }
    }
    // Expired: evict lazily.
    let mut entries = self.entries.write().await;
    if entries.get(key).is_some_and(|e| !e.is_live(now)) {
      entries.remove(key);
    }
    Ok(None)
  }

  async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
    let expires_at = self.ttl.map(|ttl| Instant::now() + ttl);
    self
      .entries
      .write()
      .await
      .insert(key.to_owned(), Entry { value, expires_at });
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<()> {
    self.entries.write().await.remove(key);
    Ok(())
  }
}
