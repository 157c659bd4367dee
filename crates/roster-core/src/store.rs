//! The `DocumentStore` trait: the minimal contract the repository needs from
//! a document database.
//!
//! Implemented by storage backends (e.g. `roster-store-sqlite`). Documents are
//! JSON objects grouped into named collections; matching is by equality on a
//! single top-level string field.

use std::future::Future;

/// A stored document: a JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Collection holding one document per contact.
pub const CONTACTS: &str = "contacts";

/// Collection mapping API keys to the contact they authenticate as.
pub const API_KEYS: &str = "api_keys";

/// Errors raised by a [`DocumentStore`].
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// Whether a write was rejected by a uniqueness constraint.
  fn is_conflict(&self) -> bool { false }
}

/// Abstraction over a document store backend.
///
/// Implementations must be safe for concurrent use by many in-flight requests
/// without external locking.
pub trait DocumentStore: Send + Sync {
  type Error: StoreError;

  /// Return the first document in `collection` whose `key` field equals
  /// `value`. `None` is the not-found outcome.
  fn find_one<'a>(
    &'a self,
    collection: &'a str,
    key: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Insert a new document. Fails if it violates a uniqueness constraint.
  fn insert_one<'a>(
    &'a self,
    collection: &'a str,
    document: Document,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Upsert: overwrite the top-level fields of the document whose `key`
  /// field equals `value` with those of `document`, or insert `document` if
  /// there is no match.
  fn update_one<'a>(
    &'a self,
    collection: &'a str,
    key: &'a str,
    value: &'a str,
    document: Document,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete the first matching document. Returns whether one was removed.
  fn delete_one<'a>(
    &'a self,
    collection: &'a str,
    key: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
