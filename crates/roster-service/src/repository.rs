//! The repository: maps contacts to and from store documents and owns the
//! encryption boundary.
//!
//! Nothing in plaintext is queried or written for sensitive fields. Lookups
//! go through the blind index of the value; writes seal the value first.
//! Contacts handed back to callers always hold plaintext.

use std::{future::Future, time::Duration};

use chrono::Utc;
use roster_core::{
  Error, Result,
  contact::{Contact, LookupKey},
  crypto::Cipher,
  store::{API_KEYS, CONTACTS, Document, DocumentStore},
};

use crate::{
  bounded,
  document::{
    API_KEY_INDEX, ApiKeyDocument, ContactDocument, EMAIL_INDEX, from_document,
    index_field, open_field, seal_field, to_document,
  },
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// The persistence seam the [`ContactService`](crate::ContactService) depends
/// on.
///
/// [`Error::NotFound`] is reserved for "no such document" so callers can tell
/// it apart from every other store failure.
pub trait ContactRepository: Send + Sync {
  /// Fetch the contact whose `key` equals `value`.
  fn get_one_contact<'a>(
    &'a self,
    key: LookupKey,
    value: &'a str,
  ) -> impl Future<Output = Result<Contact>> + Send + 'a;

  /// Persist a new contact. Stamps `created_at` and `updated_at`.
  fn insert_one_contact<'a>(
    &'a self,
    contact: &'a mut Contact,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Upsert the contact matched by its email. Stamps `updated_at`.
  fn update_one_contact<'a>(
    &'a self,
    contact: &'a mut Contact,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Remove the contact whose `key` equals `value`.
  fn delete_one_contact<'a>(
    &'a self,
    key: LookupKey,
    value: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Resolve the contact id an API key authenticates as.
  fn get_contact_id_by_api_key<'a>(
    &'a self,
    api_key: &'a str,
  ) -> impl Future<Output = Result<String>> + Send + 'a;

  /// Record a new API key for `contact_id`. Keys are write-once.
  fn provision_api_key<'a>(
    &'a self,
    api_key: &'a str,
    contact_id: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a;
}

// ─── Implementation ──────────────────────────────────────────────────────────

/// [`ContactRepository`] over any [`DocumentStore`].
///
/// Every store call is bounded by `timeout`.
pub struct Repository<S> {
  store:   S,
  cipher:  Cipher,
  timeout: Duration,
}

impl<S: DocumentStore> Repository<S> {
  pub fn new(store: S, cipher: Cipher, timeout: Duration) -> Self {
    Self { store, cipher, timeout }
  }

  pub fn store(&self) -> &S { &self.store }

  async fn find(&self, collection: &str, key: &str, value: &str) -> Result<Document> {
    bounded("store find", self.timeout, self.store.find_one(collection, key, value))
      .await?
      .map_err(Error::store)?
      .ok_or(Error::NotFound)
  }
}

impl<S: DocumentStore> ContactRepository for Repository<S> {
  async fn get_one_contact(&self, key: LookupKey, value: &str) -> Result<Contact> {
    let index = self.cipher.blind_index(value);
    let doc = self.find(CONTACTS, index_field(key), &index).await?;
    let contact = from_document::<ContactDocument>(doc)?.open(&self.cipher)?;
    tracing::debug!(%key, "contact read from store");
    Ok(contact)
  }

  async fn insert_one_contact(&self, contact: &mut Contact) -> Result<()> {
    let now = Utc::now();
    contact.created_at = Some(now);
    contact.updated_at = Some(now);

    let doc = to_document(&ContactDocument::seal(contact, &self.cipher)?)?;
    bounded("store insert", self.timeout, self.store.insert_one(CONTACTS, doc))
      .await?
      .map_err(Error::store)
  }

  async fn update_one_contact(&self, contact: &mut Contact) -> Result<()> {
    contact.updated_at = Some(Utc::now());

    let sealed = ContactDocument::seal(contact, &self.cipher)?;
    let email_index = sealed.email_index.clone();
    let doc = to_document(&sealed)?;
    bounded(
      "store update",
      self.timeout,
      self.store.update_one(CONTACTS, EMAIL_INDEX, &email_index, doc),
    )
    .await?
    .map_err(Error::store)
  }

  async fn delete_one_contact(&self, key: LookupKey, value: &str) -> Result<()> {
    let index = self.cipher.blind_index(value);
    let removed = bounded(
      "store delete",
      self.timeout,
      self.store.delete_one(CONTACTS, index_field(key), &index),
    )
    .await?
    .map_err(Error::store)?;

    if removed { Ok(()) } else { Err(Error::NotFound) }
  }

  async fn get_contact_id_by_api_key(&self, api_key: &str) -> Result<String> {
    let index = self.cipher.blind_index(api_key);
    let doc = self.find(API_KEYS, API_KEY_INDEX, &index).await?;
    let record: ApiKeyDocument = from_document(doc)?;
    open_field(&self.cipher, "contactid", &record.contactid)
  }

  async fn provision_api_key(&self, api_key: &str, contact_id: &str) -> Result<()> {
    let record = ApiKeyDocument {
      apikey_index: self.cipher.blind_index(api_key),
      contactid:    seal_field(&self.cipher, "contactid", contact_id)?,
      created_at:   Utc::now(),
    };
    let doc = to_document(&record)?;
    bounded("store insert", self.timeout, self.store.insert_one(API_KEYS, doc))
      .await?
      .map_err(Error::store)
  }
}
