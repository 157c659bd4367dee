//! [`SqliteStore`]: the SQLite implementation of [`DocumentStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use roster_core::store::{Document, DocumentStore};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  encode::{decode_document, encode_document, encode_dt, json_path, merge_set},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Like [`SqliteStore::open`], giving up once `deadline` has elapsed.
  pub async fn open_with_deadline(
    path: impl AsRef<Path>,
    deadline: Duration,
  ) -> Result<Self> {
    tokio::time::timeout(deadline, Self::open(path))
      .await
      .map_err(|_| Error::ConnectTimeout(deadline))?
  }

  /// Open an in-memory store, for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of documents in `collection`.
  pub async fn count(&self, collection: &str) -> Result<usize> {
    let collection = collection.to_owned();
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM documents WHERE collection = ?1",
          rusqlite::params![collection],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(usize::try_from(n).unwrap_or_default())
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn find_one(
    &self,
    collection: &str,
    key: &str,
    value: &str,
  ) -> Result<Option<Document>> {
    let path       = json_path(key)?;
    let collection = collection.to_owned();
    let value      = value.to_owned();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT body FROM documents
             WHERE collection = ?1 AND json_extract(body, ?2) = ?3
             LIMIT 1",
            rusqlite::params![collection, path, value],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    body.as_deref().map(decode_document).transpose()
  }

  async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
    let doc_id     = Uuid::new_v4().hyphenated().to_string();
    let collection = collection.to_owned();
    let body       = encode_document(&document)?;
    let now        = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (doc_id, collection, body, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![doc_id, collection, body, now],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from_write)
  }

  async fn update_one(
    &self,
    collection: &str,
    key: &str,
    value: &str,
    document: Document,
  ) -> Result<()> {
    let path       = json_path(key)?;
    let collection = collection.to_owned();
    let value      = value.to_owned();
    let new_body   = encode_document(&document)?;
    let new_id     = Uuid::new_v4().hyphenated().to_string();
    let now        = encode_dt(Utc::now());

    let upserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<(String, String)> = tx
          .query_row(
            "SELECT doc_id, body FROM documents
             WHERE collection = ?1 AND json_extract(body, ?2) = ?3
             LIMIT 1",
            rusqlite::params![collection, path, value],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?;

        let inserted = match existing {
          Some((doc_id, body)) => {
            let merged = merge_set(&body, &document)
              .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            tx.execute(
              "UPDATE documents SET body = ?1, updated_at = ?2 WHERE doc_id = ?3",
              rusqlite::params![merged, now, doc_id],
            )?;
            false
          }
          None => {
            tx.execute(
              "INSERT INTO documents (doc_id, collection, body, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?4)",
              rusqlite::params![new_id, collection, new_body, now],
            )?;
            true
          }
        };

        tx.commit()?;
        Ok(inserted)
      })
      .await
      .map_err(Error::from_write)?;

    if upserted {
      tracing::debug!(key, "update_one matched nothing; inserted a new document");
    }
    Ok(())
  }

  async fn delete_one(&self, collection: &str, key: &str, value: &str) -> Result<bool> {
    let path       = json_path(key)?;
    let collection = collection.to_owned();
    let value      = value.to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE doc_id = (
             SELECT doc_id FROM documents
             WHERE collection = ?1 AND json_extract(body, ?2) = ?3
             LIMIT 1
           )",
          rusqlite::params![collection, path, value],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }
}
