//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! width so that lexical order is chronological. Calendar dates are
//! `YYYY-MM-DD` and times of day `HH:MM:SS`, which sort the same way.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use nsos_core::{
  RecordId,
  audit::{AuditAction, AuditEntry, Table},
  records::{Case, CaseUpdate, Duty, Evidence},
};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveDate / NaiveTime ───────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_time(t: NaiveTime) -> String { t.format(TIME_FORMAT).to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, TIME_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Unicode lowercase; the same folding backs the `nsos_fold` SQL function.
pub fn fold_case(text: &str) -> String { text.to_lowercase() }

/// Fold `needle` and wrap it for an unanchored `LIKE … ESCAPE '\'` match
/// against `nsos_fold(column)`. Wildcard characters are escaped so they
/// match literally.
pub fn like_pattern(needle: &str) -> String {
  let mut out = String::with_capacity(needle.len() + 2);
  out.push('%');
  for ch in fold_case(needle).chars() {
    if matches!(ch, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(ch);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A `cases` row joined with officer and suspect names.
pub struct RawCase {
  pub case_id:      RecordId,
  pub case_number:  String,
  pub title:        String,
  pub description:  String,
  pub filed_date:   String,
  pub filed_by:     Option<RecordId>,
  pub officer_name: Option<String>,
  pub suspect_id:   Option<RecordId>,
  pub suspect_name: Option<String>,
  pub status:       String,
}

impl RawCase {
  pub fn into_case(self) -> Result<Case> {
    Ok(Case {
      case_id:      self.case_id,
      case_number:  self.case_number,
      title:        self.title,
      description:  self.description,
      filed_date:   decode_date(&self.filed_date)?,
      filed_by:     self.filed_by,
      officer_name: self.officer_name,
      suspect_id:   self.suspect_id,
      suspect_name: self.suspect_name,
      status:       self.status,
    })
  }
}

pub struct RawCaseUpdate {
  pub update_id:    RecordId,
  pub case_id:      RecordId,
  pub update_text:  String,
  pub update_date:  String,
  pub updated_by:   Option<RecordId>,
  pub officer_name: Option<String>,
}

impl RawCaseUpdate {
  pub fn into_case_update(self) -> Result<CaseUpdate> {
    Ok(CaseUpdate {
      update_id:    self.update_id,
      case_id:      self.case_id,
      update_text:  self.update_text,
      update_date:  decode_dt(&self.update_date)?,
      updated_by:   self.updated_by,
      officer_name: self.officer_name,
    })
  }
}

pub struct RawEvidence {
  pub evidence_id: RecordId,
  pub case_id:     RecordId,
  pub case_number: Option<String>,
  pub file_name:   String,
  pub description: String,
  pub upload_date: String,
}

impl RawEvidence {
  pub fn into_evidence(self) -> Result<Evidence> {
    Ok(Evidence {
      evidence_id: self.evidence_id,
      case_id:     self.case_id,
      case_number: self.case_number,
      file_name:   self.file_name,
      description: self.description,
      upload_date: decode_dt(&self.upload_date)?,
    })
  }
}

pub struct RawDuty {
  pub duty_id:      RecordId,
  pub officer_id:   Option<RecordId>,
  pub officer_name: Option<String>,
  pub duty_date:    String,
  pub duty_time:    String,
  pub location:     String,
}

impl RawDuty {
  pub fn into_duty(self) -> Result<Duty> {
    Ok(Duty {
      duty_id:      self.duty_id,
      officer_id:   self.officer_id,
      officer_name: self.officer_name,
      duty_date:    decode_date(&self.duty_date)?,
      duty_time:    decode_time(&self.duty_time)?,
      location:     self.location,
    })
  }
}

pub struct RawAuditEntry {
  pub log_id:      RecordId,
  pub action:      String,
  pub table_name:  String,
  pub record_id:   RecordId,
  pub action_date: String,
}

impl RawAuditEntry {
  pub fn into_entry(self) -> Result<AuditEntry> {
    Ok(AuditEntry {
      log_id:      self.log_id,
      action:      self.action.parse::<AuditAction>()?,
      table_name:  self.table_name.parse::<Table>()?,
      record_id:   self.record_id,
      action_date: decode_dt(&self.action_date)?,
    })
  }
}
