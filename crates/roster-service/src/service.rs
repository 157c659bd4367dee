//! [`ContactService`]: cache-aside resolution of contacts.
//!
//! Two derived relations live in the cache, both rebuildable from the store:
//!
//! | Key | Value |
//! |-----|-------|
//! | `contact:email:<email>` | the serialised [`Contact`] |
//! | `contact:id:<contact id>` | the contact's email |
//!
//! Reads try the cache first and fall back to the repository on a miss or on
//! any cache failure, then repopulate both relations best-effort. Writes go
//! to the repository and then delete both relations; a failed delete fails
//! the write, since the entry it leaves behind would be served stale.

use std::time::Duration;

use roster_core::{
  Error, Result,
  cache::Cache,
  contact::{Contact, LookupKey, generate_contact_id},
};

use crate::{bounded, repository::ContactRepository};

fn contact_key(email: &str) -> String { format!("contact:email:{email}") }

fn email_key(contact_id: &str) -> String { format!("contact:id:{contact_id}") }

pub struct ContactService<R, C> {
  repository: R,
  cache:      C,
  timeout:    Duration,
}

impl<R, C> ContactService<R, C>
where
  R: ContactRepository,
  C: Cache,
{
  /// `timeout` bounds every individual cache interaction.
  pub fn new(repository: R, cache: C, timeout: Duration) -> Self {
    Self { repository, cache, timeout }
  }

  pub fn repository(&self) -> &R { &self.repository }

  pub fn cache(&self) -> &C { &self.cache }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Resolve a contact by email or contact id.
  ///
  /// Store errors, including [`Error::NotFound`], are returned unchanged.
  /// Cache errors never are.
  pub async fn get_one_contact(&self, key: LookupKey, value: &str) -> Result<Contact> {
    if let Some(contact) = self.cached_contact(key, value).await {
      tracing::debug!(%key, "contact served from cache");
      return Ok(contact);
    }

    let contact = self.repository.get_one_contact(key, value).await?;
    self.repopulate(&contact).await;
    Ok(contact)
  }

  /// Resolve the contact id an API key authenticates as.
  ///
  /// An unknown key is [`Error::NotFound`]; callers should treat it as an
  /// authorization failure rather than a fault.
  pub async fn get_contact_id_by_api_key(&self, api_key: &str) -> Result<String> {
    self.repository.get_contact_id_by_api_key(api_key).await
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Insert `contact`, or update the stored contact with the same email.
  /// Returns the contact id.
  ///
  /// A stored contact keeps its id: an update carries over the id and
  /// creation time of the existing record.
  pub async fn add_or_update_contact(&self, mut contact: Contact) -> Result<String> {
    if contact.contact_id.is_empty() {
      contact.contact_id = generate_contact_id();
    }

    match self
      .repository
      .get_one_contact(LookupKey::Email, &contact.email)
      .await
    {
      Ok(existing) => self.update_existing(&mut contact, existing).await?,
      Err(e) => {
        if !e.is_not_found() {
          tracing::warn!(error = %e, "lookup before write failed; inserting");
        }
        match self.repository.insert_one_contact(&mut contact).await {
          Ok(()) => {}
          Err(e) if e.is_conflict() => {
            // Another writer stored the same email between lookup and insert.
            let Ok(existing) = self
              .repository
              .get_one_contact(LookupKey::Email, &contact.email)
              .await
            else {
              return Err(e);
            };
            tracing::debug!("insert lost a race for the email; updating instead");
            self.update_existing(&mut contact, existing).await?;
          }
          Err(e) => return Err(e),
        }
      }
    }

    self.invalidate(&contact).await?;
    Ok(contact.contact_id)
  }

  /// Update the stored `existing` record with `contact`, keeping the stored
  /// contact id and creation time.
  async fn update_existing(&self, contact: &mut Contact, existing: Contact) -> Result<()> {
    if existing.contact_id != contact.contact_id {
      tracing::debug!(
        contact_id = %existing.contact_id,
        "email already stored; keeping its contact id"
      );
      contact.contact_id = existing.contact_id;
    }
    contact.created_at = existing.created_at;
    self.repository.update_one_contact(contact).await
  }

  /// Delete the contact addressed by `key` and drop its cache entries.
  pub async fn delete_contact(&self, key: LookupKey, value: &str) -> Result<()> {
    let contact = self.repository.get_one_contact(key, value).await?;
    self
      .repository
      .delete_one_contact(LookupKey::Email, &contact.email)
      .await?;
    self.invalidate(&contact).await
  }

  // ── Cache plumbing ────────────────────────────────────────────────────────

  async fn cached_contact(&self, key: LookupKey, value: &str) -> Option<Contact> {
    let email = match key {
      LookupKey::Email => value.to_owned(),
      LookupKey::ContactId => {
        let raw = self.cache_get(&email_key(value)).await?;
        match String::from_utf8(raw) {
          Ok(email) => email,
          Err(_) => {
            tracing::warn!("cached email is not UTF-8; ignoring");
            return None;
          }
        }
      }
    };

    let raw = self.cache_get(&contact_key(&email)).await?;
    let contact: Contact = match serde_json::from_slice(&raw) {
      Ok(c) => c,
      Err(e) => {
        tracing::warn!(error = %e, "cached contact does not decode; ignoring");
        return None;
      }
    };

    // The two relations are written separately; never serve a pair that
    // disagrees.
    if contact.key_value(key) != value {
      tracing::debug!(%key, "cache relations disagree; ignoring");
      return None;
    }
    Some(contact)
  }

  /// A cache read where both a miss and a failure come back as `None`.
  async fn cache_get(&self, key: &str) -> Option<Vec<u8>> {
    let read = bounded("cache get", self.timeout, self.cache.get(key))
      .await
      .and_then(|r| r.map_err(Error::cache));
    match read {
      Ok(Some(hit)) => Some(hit),
      Ok(None) => {
        tracing::debug!(key, "cache miss");
        None
      }
      Err(e) => {
        tracing::warn!(key, error = %e, "cache read failed; falling back to store");
        None
      }
    }
  }

  async fn cache_set(&self, key: &str, value: Vec<u8>) -> Result<()> {
    bounded("cache set", self.timeout, self.cache.set(key, value))
      .await?
      .map_err(Error::cache)
  }

  async fn cache_delete(&self, key: &str) -> Result<()> {
    bounded("cache delete", self.timeout, self.cache.delete(key))
      .await?
      .map_err(Error::cache)
  }

  /// Best-effort: failures are logged and never change the outcome of the
  /// read that triggered them.
  async fn repopulate(&self, contact: &Contact) {
    match serde_json::to_vec(contact) {
      Ok(bytes) => {
        if let Err(e) = self.cache_set(&contact_key(&contact.email), bytes).await {
          tracing::error!(error = %e, "failed to cache contact");
        }
      }
      Err(e) => tracing::error!(error = %e, "failed to serialise contact for cache"),
    }

    if let Err(e) = self
      .cache_set(&email_key(&contact.contact_id), contact.email.clone().into_bytes())
      .await
    {
      tracing::error!(error = %e, "failed to cache contact id index");
    }
  }

  async fn invalidate(&self, contact: &Contact) -> Result<()> {
    for key in [contact_key(&contact.email), email_key(&contact.contact_id)] {
      if let Err(e) = self.cache_delete(&key).await {
        tracing::error!(key, error = %e, "cache invalidation failed");
        return Err(e);
      }
    }
    Ok(())
  }
}
