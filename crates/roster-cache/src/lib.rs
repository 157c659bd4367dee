//! Cache backends for the Roster contact service.
//!
//! [`RedisCache`] is the production backend; [`MemoryCache`] keeps entries in
//! process and serves tests and single-node deployments. [`CacheBackend`]
//! picks one at runtime from configuration.

mod backend;
mod memory;
mod redis_cache;

pub mod error;

pub use backend::CacheBackend;
pub use error::{Error, Result};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
