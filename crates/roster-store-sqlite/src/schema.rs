//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// The unique expression indexes name the blind-index fields written by the
/// repository (`email_index`, `contactid_index`, `apikey_index`).
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS documents (
    doc_id      TEXT PRIMARY KEY,
    collection  TEXT NOT NULL,
    body        TEXT NOT NULL,   -- JSON object
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC
    updated_at  TEXT NOT NULL    -- RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents(collection);

CREATE UNIQUE INDEX IF NOT EXISTS contacts_email_idx
    ON documents(json_extract(body, '$.email_index'))
    WHERE collection = 'contacts';

CREATE UNIQUE INDEX IF NOT EXISTS contacts_contactid_idx
    ON documents(json_extract(body, '$.contactid_index'))
    WHERE collection = 'contacts';

CREATE UNIQUE INDEX IF NOT EXISTS api_keys_apikey_idx
    ON documents(json_extract(body, '$.apikey_index'))
    WHERE collection = 'api_keys';

PRAGMA user_version = 1;
";
