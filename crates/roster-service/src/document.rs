//! Store-side shapes of contacts and API keys.
//!
//! Sensitive values are held twice: sealed (randomised ciphertext, base64)
//! for recovery, and as a blind index for equality lookups.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use roster_core::{
  Error, Result,
  contact::{Contact, ContactDetails, LookupKey},
  crypto::Cipher,
  custom::CustomValue,
  store::Document,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

pub const EMAIL_INDEX: &str = "email_index";
pub const CONTACT_ID_INDEX: &str = "contactid_index";
pub const API_KEY_INDEX: &str = "apikey_index";

/// The blind-index field that answers lookups by `key`.
pub fn index_field(key: LookupKey) -> &'static str {
  match key {
    LookupKey::ContactId => CONTACT_ID_INDEX,
    LookupKey::Email => EMAIL_INDEX,
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactDocument {
  pub contactid:       String,
  pub contactid_index: String,
  pub email:           String,
  pub email_index:     String,
  #[serde(flatten)]
  pub details:         ContactDetails,
  #[serde(default)]
  pub custom:          BTreeMap<String, CustomValue>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at:      Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at:      Option<DateTime<Utc>>,
}

impl ContactDocument {
  /// Encrypt and index the sensitive fields of `contact`.
  pub fn seal(contact: &Contact, cipher: &Cipher) -> Result<Self> {
    Ok(Self {
      contactid:       seal_field(cipher, "contactid", &contact.contact_id)?,
      contactid_index: cipher.blind_index(&contact.contact_id),
      email:           seal_field(cipher, "email", &contact.email)?,
      email_index:     cipher.blind_index(&contact.email),
      details:         contact.details.clone(),
      custom:          contact.custom.clone(),
      created_at:      contact.created_at,
      updated_at:      contact.updated_at,
    })
  }

  /// Decrypt the sensitive fields back into a plaintext [`Contact`].
  pub fn open(self, cipher: &Cipher) -> Result<Contact> {
    Ok(Contact {
      contact_id: open_field(cipher, "contactid", &self.contactid)?,
      email:      open_field(cipher, "email", &self.email)?,
      details:    self.details,
      custom:     self.custom,
      created_at: self.created_at,
      updated_at: self.updated_at,
    })
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiKeyDocument {
  pub apikey_index: String,
  /// Sealed contact id.
  pub contactid:    String,
  pub created_at:   DateTime<Utc>,
}

pub fn seal_field(cipher: &Cipher, field: &'static str, plaintext: &str) -> Result<String> {
  cipher
    .seal(plaintext)
    .map_err(|source| Error::Crypto { field, source })
}

pub fn open_field(cipher: &Cipher, field: &'static str, sealed: &str) -> Result<String> {
  cipher
    .open(sealed)
    .map_err(|source| Error::Crypto { field, source })
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
  match serde_json::to_value(value)? {
    Value::Object(map) => Ok(map),
    other => Err(Error::Serialization(serde::ser::Error::custom(format!(
      "expected a JSON object, got {other}"
    )))),
  }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
  Ok(serde_json::from_value(Value::Object(doc))?)
}
