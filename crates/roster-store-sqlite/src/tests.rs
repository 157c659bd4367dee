//! Integration tests for `SqliteStore` against an in-memory database.

use roster_core::store::{API_KEYS, CONTACTS, Document, DocumentStore};
use serde_json::{Value, json};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn doc(value: Value) -> Document {
  match value {
    Value::Object(map) => map,
    other => panic!("not an object: {other}"),
  }
}

fn contact_doc(email_index: &str, contactid_index: &str) -> Document {
  doc(json!({
    "email_index": email_index,
    "contactid_index": contactid_index,
    "FirstName": "Alice",
    "custom": { "Age": { "type": "integer", "value": 42 } },
  }))
}

// ─── Find / insert ───────────────────────────────────────────────────────────

#[tokio::test]
async fn find_missing_returns_none() {
  let s = store().await;
  let found = s.find_one(CONTACTS, "email_index", "nope").await.unwrap();
  assert!(found.is_none());
}

#[tokio::test]
async fn insert_and_find() {
  let s = store().await;
  s.insert_one(CONTACTS, contact_doc("e1", "c1")).await.unwrap();

  let by_email = s.find_one(CONTACTS, "email_index", "e1").await.unwrap().unwrap();
  let by_id = s.find_one(CONTACTS, "contactid_index", "c1").await.unwrap().unwrap();
  assert_eq!(by_email, by_id);
  assert_eq!(by_email["FirstName"], "Alice");
  assert_eq!(by_email["custom"]["Age"]["value"], 42);
}

#[tokio::test]
async fn collections_are_isolated() {
  let s = store().await;
  s.insert_one(API_KEYS, doc(json!({ "apikey_index": "k1", "contactid": "x" })))
    .await
    .unwrap();

  assert!(s.find_one(CONTACTS, "apikey_index", "k1").await.unwrap().is_none());
  assert!(s.find_one(API_KEYS, "apikey_index", "k1").await.unwrap().is_some());
  assert_eq!(s.count(API_KEYS).await.unwrap(), 1);
  assert_eq!(s.count(CONTACTS).await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_email_index_is_a_conflict() {
  let s = store().await;
  s.insert_one(CONTACTS, contact_doc("e1", "c1")).await.unwrap();

  let err = s.insert_one(CONTACTS, contact_doc("e1", "c2")).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)), "{err:?}");

  let err = s.insert_one(CONTACTS, contact_doc("e2", "c1")).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn duplicate_api_key_is_a_conflict() {
  let s = store().await;
  let key = || doc(json!({ "apikey_index": "k1", "contactid": "x" }));
  s.insert_one(API_KEYS, key()).await.unwrap();
  assert!(matches!(
    s.insert_one(API_KEYS, key()).await,
    Err(Error::Conflict(_))
  ));
}

#[tokio::test]
async fn field_names_must_be_identifiers() {
  let s = store().await;
  let err = s.find_one(CONTACTS, "email') OR 1=1 --", "x").await.unwrap_err();
  assert!(matches!(err, Error::InvalidField(_)));
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_without_match_inserts() {
  let s = store().await;
  s.update_one(CONTACTS, "email_index", "e1", contact_doc("e1", "c1"))
    .await
    .unwrap();

  assert_eq!(s.count(CONTACTS).await.unwrap(), 1);
  assert!(s.find_one(CONTACTS, "contactid_index", "c1").await.unwrap().is_some());
}

#[tokio::test]
async fn update_sets_top_level_fields() {
  let s = store().await;
  let mut original = contact_doc("e1", "c1");
  original.insert("Company".into(), json!("Acme"));
  s.insert_one(CONTACTS, original).await.unwrap();

  let patch = doc(json!({
    "email_index": "e1",
    "FirstName": "Alicia",
    "custom": { "Score": { "type": "float", "value": 1.5 } },
  }));
  s.update_one(CONTACTS, "email_index", "e1", patch).await.unwrap();

  let found = s.find_one(CONTACTS, "email_index", "e1").await.unwrap().unwrap();
  assert_eq!(found["FirstName"], "Alicia");
  // Untouched fields survive.
  assert_eq!(found["Company"], "Acme");
  assert_eq!(found["contactid_index"], "c1");
  // Nested values are replaced wholesale, not merged.
  assert!(found["custom"].get("Age").is_none());
  assert_eq!(found["custom"]["Score"]["value"], 1.5);
  assert_eq!(s.count(CONTACTS).await.unwrap(), 1);
}

#[tokio::test]
async fn update_into_a_taken_key_is_a_conflict() {
  let s = store().await;
  s.insert_one(CONTACTS, contact_doc("e1", "c1")).await.unwrap();
  s.insert_one(CONTACTS, contact_doc("e2", "c2")).await.unwrap();

  let patch = doc(json!({ "contactid_index": "c1" }));
  let err = s.update_one(CONTACTS, "email_index", "e2", patch).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)), "{err:?}");
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_reports_whether_anything_was_removed() {
  let s = store().await;
  s.insert_one(CONTACTS, contact_doc("e1", "c1")).await.unwrap();

  assert!(s.delete_one(CONTACTS, "email_index", "e1").await.unwrap());
  assert!(!s.delete_one(CONTACTS, "email_index", "e1").await.unwrap());
  assert!(s.find_one(CONTACTS, "contactid_index", "c1").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_removes_a_single_document() {
  let s = store().await;
  s.insert_one(API_KEYS, doc(json!({ "apikey_index": "k1", "contactid": "x" })))
    .await
    .unwrap();
  s.insert_one(API_KEYS, doc(json!({ "apikey_index": "k2", "contactid": "x" })))
    .await
    .unwrap();

  assert!(s.delete_one(API_KEYS, "contactid", "x").await.unwrap());
  assert_eq!(s.count(API_KEYS).await.unwrap(), 1);
}

#[tokio::test]
async fn reopening_a_file_keeps_documents() {
  let dir = std::env::temp_dir().join(format!("roster-{}", uuid::Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("store.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert_one(CONTACTS, contact_doc("e1", "c1")).await.unwrap();
  }
  let s = SqliteStore::open_with_deadline(&path, std::time::Duration::from_secs(5))
    .await
    .unwrap();
  assert!(s.find_one(CONTACTS, "email_index", "e1").await.unwrap().is_some());

  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}
