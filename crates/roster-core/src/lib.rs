//! Core types and trait definitions for the Roster contact service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it: the contact model, custom-field coercion,
//! the field-level crypto boundary, and the capability traits for the document
//! store and the cache live here.

pub mod cache;
pub mod contact;
pub mod crypto;
pub mod custom;
pub mod error;
pub mod store;

pub use error::{Error, Result};
