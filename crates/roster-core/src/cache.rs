//! The `Cache` trait: a byte-oriented key/value contract.
//!
//! The cache holds only derived data; the document store is the single source
//! of truth. A missing key is reported as `Ok(None)`, never as an error, so
//! callers can tell a miss from a connectivity failure.

use std::future::Future;

/// Abstraction over a key/value cache backend.
///
/// Implementations provide their own connection pooling and must be safe for
/// concurrent use without external locking.
pub trait Cache: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + 'a;

  fn set<'a>(
    &'a self,
    key: &'a str,
    value: Vec<u8>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove `key`. Deleting an absent key is not an error.
  fn delete<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
