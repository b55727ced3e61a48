//! Request-body field validation shared by the handlers.
//!
//! Bodies deserialise into structs of optional fields so that a missing or
//! empty value is reported by name instead of as a generic parse failure.

use chrono::{NaiveDate, NaiveTime};
use nsos_core::{Error, RecordId, Result};
use serde::Deserialize;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepted time formats, tried in order.
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// A record id as sent by a client: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdField {
  Number(RecordId),
  Text(String),
}

/// A present, non-blank string.
pub fn required(value: Option<String>, field: &'static str) -> Result<String> {
  match value {
    Some(v) if !v.trim().is_empty() => Ok(v),
    _ => Err(Error::MissingField(field)),
  }
}

pub fn optional_text(value: Option<String>) -> String { value.unwrap_or_default() }

/// An optional id. Blank strings count as absent.
pub fn optional_id(value: Option<IdField>, field: &'static str) -> Result<Option<RecordId>> {
  let id = match value {
    None => return Ok(None),
    Some(IdField::Number(n)) => n,
    Some(IdField::Text(s)) if s.trim().is_empty() => return Ok(None),
    Some(IdField::Text(s)) => s.trim().parse().map_err(|_| Error::InvalidField {
      field,
      reason: format!("{s:?} is not an id"),
    })?,
  };
  if id < 1 {
    return Err(Error::InvalidField { field, reason: "ids are positive".to_owned() });
  }
  Ok(Some(id))
}

pub fn required_id(value: Option<IdField>, field: &'static str) -> Result<RecordId> {
  optional_id(value, field)?.ok_or(Error::MissingField(field))
}

/// A `YYYY-MM-DD` date.
pub fn required_date(value: Option<String>, field: &'static str) -> Result<NaiveDate> {
  let raw = required(value, field)?;
  NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| Error::InvalidField {
    field,
    reason: "expected YYYY-MM-DD".to_owned(),
  })
}

/// An `HH:MM:SS` or `HH:MM` time.
pub fn required_time(value: Option<String>, field: &'static str) -> Result<NaiveTime> {
  let raw = required(value, field)?;
  TIME_FORMATS
    .iter()
    .find_map(|fmt| NaiveTime::parse_from_str(raw.trim(), fmt).ok())
    .ok_or_else(|| Error::InvalidField { field, reason: "expected HH:MM[:SS]".to_owned() })
}
