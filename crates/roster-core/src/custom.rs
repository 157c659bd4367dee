//! Typed custom fields and their ingestion-time coercion.
//!
//! Clients send custom fields as a flat string map whose keys carry the type:
//! `integer--Number--of--Pets` → `"3"`. Coercion strips the tag, turns the
//! remaining `--` separators into spaces and parses the value.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Separates the type tag from the field name, and the words of the name.
pub const SEPARATOR: &str = "--";

/// Layout of `date` custom fields, interpreted in the local time zone.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The typed value of a custom field. The variant name is the type tag used
/// on ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CustomValue {
  Integer(i64),
  Boolean(bool),
  Float(f32),
  Date(DateTime<FixedOffset>),
  String(String),
}

impl CustomValue {
  pub fn type_tag(&self) -> &'static str {
    match self {
      Self::Integer(_) => "integer",
      Self::Boolean(_) => "boolean",
      Self::Float(_) => "float",
      Self::Date(_) => "date",
      Self::String(_) => "string",
    }
  }
}

/// Coerce every entry of a raw custom-field map.
///
/// Fails on the first entry with an unknown tag or an unparsable value, and
/// when two keys normalise to the same field name.
pub fn coerce_custom_fields(
  raw: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, CustomValue>> {
  let mut fields = BTreeMap::new();
  for (key, value) in raw {
    let (name, typed) = coerce_field(key, value)?;
    if fields.insert(name.clone(), typed).is_some() {
      return Err(Error::DuplicateField(name));
    }
  }
  Ok(fields)
}

/// Coerce a single `<type>--<name>` entry into its field name and value.
pub fn coerce_field(key: &str, value: &str) -> Result<(String, CustomValue)> {
  let (tag, name) = key
    .split_once(SEPARATOR)
    .ok_or_else(|| Error::FieldType { key: key.to_owned() })?;

  let name = name.replace(SEPARATOR, " ");
  if name.trim().is_empty() {
    return Err(invalid(key, "empty field name"));
  }

  let typed = match tag {
    "integer" => CustomValue::Integer(
      value.parse().map_err(|e| invalid(key, format!("{e}: {value:?}")))?,
    ),
    "boolean" => CustomValue::Boolean(
      value.parse().map_err(|e| invalid(key, format!("{e}: {value:?}")))?,
    ),
    "float" => CustomValue::Float(parse_finite(key, value)?),
    "date" => CustomValue::Date(parse_local_date(key, value)?),
    "string" => CustomValue::String(value.to_owned()),
    _ => return Err(Error::FieldType { key: key.to_owned() }),
  };

  Ok((name, typed))
}

/// JSON has no representation for NaN or infinity, so neither is accepted.
fn parse_finite(key: &str, value: &str) -> Result<f32> {
  let f: f32 = value
    .parse()
    .map_err(|e| invalid(key, format!("{e}: {value:?}")))?;
  if f.is_finite() {
    Ok(f)
  } else {
    Err(invalid(key, format!("{value:?} is not a finite number")))
  }
}

fn parse_local_date(key: &str, value: &str) -> Result<DateTime<FixedOffset>> {
  let naive = NaiveDateTime::parse_from_str(value, DATE_FORMAT)
    .map_err(|e| invalid(key, format!("{e}: {value:?}")))?;
  naive
    .and_local_timezone(Local)
    .earliest()
    .map(|dt| dt.fixed_offset())
    .ok_or_else(|| invalid(key, format!("{value:?} does not exist in the local time zone")))
}

fn invalid(key: &str, reason: impl Into<String>) -> Error {
  Error::FieldValue { key: key.to_owned(), reason: reason.into() }
}
