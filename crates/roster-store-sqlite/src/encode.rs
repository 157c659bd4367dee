//! Encoding helpers between documents and the text stored in SQLite columns.
//!
//! Bodies are compact JSON objects. Timestamps are RFC 3339 strings.

use chrono::{DateTime, Utc};
use roster_core::store::Document;
use serde_json::Value;

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn encode_document(doc: &Document) -> Result<String> {
  Ok(serde_json::to_string(doc)?)
}

pub fn decode_document(s: &str) -> Result<Document> {
  match serde_json::from_str(s)? {
    Value::Object(map) => Ok(map),
    _ => Err(Error::NotAnObject),
  }
}

/// Apply `$set` semantics: every top-level field of `patch` replaces the
/// field of the same name in `existing`; other fields are left alone.
pub fn merge_set(existing: &str, patch: &Document) -> Result<String> {
  let mut doc = decode_document(existing)?;
  for (k, v) in patch {
    doc.insert(k.clone(), v.clone());
  }
  encode_document(&doc)
}

/// Build the `json_extract` path for a top-level field, refusing anything
/// that is not a plain identifier.
pub fn json_path(field: &str) -> Result<String> {
  let valid = !field.is_empty()
    && field
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '_');
  if valid {
    Ok(format!("$.{field}"))
  } else {
    Err(Error::InvalidField(field.to_owned()))
  }
}
