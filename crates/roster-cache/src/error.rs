//! Error type for `roster-cache`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("redis error: {0}")]
  Redis(#[from] redis::RedisError),

  #[error("timed out connecting to cache after {0:?}")]
  ConnectTimeout(Duration),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
