//! The contact record and the keys it can be looked up by.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, custom::{CustomValue, coerce_custom_fields}};

/// Prefix of every generated contact identifier.
pub const CONTACT_ID_PREFIX: &str = "person_AP2-";

/// Generate a fresh, globally unique contact identifier.
pub fn generate_contact_id() -> String {
  format!("{CONTACT_ID_PREFIX}{}", Uuid::new_v4())
}

// ─── Lookup keys ─────────────────────────────────────────────────────────────

/// The two natural keys a contact is addressable by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKey {
  #[serde(rename = "contactid")]
  ContactId,
  Email,
}

impl LookupKey {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::ContactId => "contactid",
      Self::Email => "email",
    }
  }

  /// Decide which key a raw path token denotes: an email address, or the
  /// contact-id prefix followed by a UUID. Returns `None` for anything else.
  pub fn classify(token: &str) -> Option<Self> {
    if is_email_shaped(token) {
      return Some(Self::Email);
    }
    token
      .strip_prefix(CONTACT_ID_PREFIX)
      .and_then(|rest| Uuid::parse_str(rest).ok())
      .map(|_| Self::ContactId)
  }
}

impl FromStr for LookupKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "contactid" => Ok(Self::ContactId),
      "email" => Ok(Self::Email),
      other => Err(Error::InvalidKey(other.to_owned())),
    }
  }
}

impl fmt::Display for LookupKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

fn is_email_shaped(s: &str) -> bool {
  let Some((local, domain)) = s.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && domain.contains('.')
    && !domain.starts_with('.')
    && !domain.ends_with('.')
    && !domain.contains("..")
    && !s.chars().any(char::is_whitespace)
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// Descriptive attributes shared by the stored contact and the ingestion
/// payload. Field names on the wire follow the public contact API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ContactDetails {
  pub twitter:              String,
  pub first_name:           String,
  pub last_name:            String,
  pub salutation:           String,
  pub company:              String,
  pub number_of_employees:  String,
  pub title:                String,
  pub industry:             String,
  pub phone:                String,
  pub mobile_phone:         String,
  pub fax:                  String,
  pub website:              String,
  pub mailing_street:       String,
  pub mailing_city:         String,
  pub mailing_state:        String,
  pub mailing_postal_code:  String,
  pub mailing_country:      String,
  pub lead_source:          String,
  pub status:               String,
  pub linked_in:            String,
  #[serde(rename = "lists")]
  pub lists:                Vec<String>,
  #[serde(rename = "type")]
  pub kind:                 String,
  #[serde(rename = "owner_name")]
  pub owner_name:           String,
  #[serde(rename = "unsubscribed")]
  pub unsubscribed:         bool,
  #[serde(rename = "_autopilot_session_id")]
  pub autopilot_session_id: String,
  #[serde(rename = "_autopilot_list")]
  pub autopilot_list:       String,
  #[serde(rename = "notify")]
  pub notify:               String,
}

/// A contact as held by the service and returned to callers.
///
/// `contact_id` and `email` are each unique across the store; `email` is the
/// natural key used for existence checks on write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
  #[serde(rename = "contact_id", default)]
  pub contact_id: String,
  #[serde(rename = "Email", default)]
  pub email:      String,
  #[serde(flatten)]
  pub details:    ContactDetails,
  #[serde(default)]
  pub custom:     BTreeMap<String, CustomValue>,
  /// Assigned by the repository on first insert.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
  /// Assigned by the repository on every write.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

impl Contact {
  pub fn new(email: impl Into<String>) -> Self {
    Self { email: email.into(), ..Self::default() }
  }

  /// The value of this contact under the given key.
  pub fn key_value(&self, key: LookupKey) -> &str {
    match key {
      LookupKey::ContactId => &self.contact_id,
      LookupKey::Email => &self.email,
    }
  }
}

/// The ingestion shape of a contact: identical to [`Contact`] except that
/// custom fields are still raw, type-tagged strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPayload {
  #[serde(rename = "contact_id", default)]
  pub contact_id: String,
  #[serde(rename = "Email", default)]
  pub email:      String,
  #[serde(flatten)]
  pub details:    ContactDetails,
  #[serde(default)]
  pub custom:     BTreeMap<String, String>,
}

impl ContactPayload {
  /// Coerce the custom fields and produce a [`Contact`].
  pub fn into_contact(self) -> Result<Contact> {
    let custom = coerce_custom_fields(&self.custom)?;
    Ok(Contact {
      contact_id: self.contact_id,
      email: self.email,
      details: self.details,
      custom,
      created_at: None,
      updated_at: None,
    })
  }
}
