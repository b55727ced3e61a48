//! Record types for every table the backend manages.
//!
//! Each entity has a read model (what `list` and `get` return, including any
//! denormalized display fields resolved by left join) and, where the entity is
//! writable, a `New*` input type carrying only caller-supplied fields.
//! Identifiers and server-side timestamps are never accepted from callers.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RecordId;

/// Status assigned to a case when the caller does not supply one.
pub const DEFAULT_CASE_STATUS: &str = "Open";

// ─── Admin ───────────────────────────────────────────────────────────────────

/// An operator account. Never serialised: the hash must not leave the server.
#[derive(Debug, Clone)]
pub struct Admin {
  pub admin_id:      RecordId,
  pub username:      String,
  /// PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

// ─── Unit ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
  pub unit_id:   RecordId,
  pub unit_name: String,
}

// ─── Officer ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
  pub officer_id: RecordId,
  pub name:       String,
  pub address:    String,
  pub badge_no:   String,
  pub rank:       String,
  pub contact:    String,
  pub unit_id:    Option<RecordId>,
  /// Resolved from `unit_id`; `None` when unassigned or the unit is gone.
  pub unit_name:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOfficer {
  pub name:     String,
  pub address:  String,
  pub badge_no: String,
  pub rank:     String,
  pub contact:  String,
  pub unit_id:  Option<RecordId>,
}

impl NewOfficer {
  pub fn new(name: impl Into<String>, badge_no: impl Into<String>) -> Self {
    Self {
      name:     name.into(),
      address:  String::new(),
      badge_no: badge_no.into(),
      rank:     String::new(),
      contact:  String::new(),
      unit_id:  None,
    }
  }
}

// ─── Criminal ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criminal {
  pub criminal_id: RecordId,
  pub name:        String,
  pub address:     String,
  pub national_id: String,
  pub notes:       String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCriminal {
  pub name:        String,
  pub address:     String,
  pub national_id: String,
  pub notes:       String,
}

impl NewCriminal {
  pub fn new(name: impl Into<String>, national_id: impl Into<String>) -> Self {
    Self {
      name:        name.into(),
      address:     String::new(),
      national_id: national_id.into(),
      notes:       String::new(),
    }
  }
}

// ─── Case ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
  pub case_id:      RecordId,
  /// Human-facing key, e.g. `FIR-2024-001`.
  pub case_number:  String,
  pub title:        String,
  pub description:  String,
  pub filed_date:   NaiveDate,
  /// Filing officer. Becomes `None` if that officer is deleted.
  pub filed_by:     Option<RecordId>,
  pub officer_name: Option<String>,
  pub suspect_id:   Option<RecordId>,
  pub suspect_name: Option<String>,
  pub status:       String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCase {
  pub case_number: String,
  pub title:       String,
  pub description: String,
  pub filed_date:  NaiveDate,
  pub filed_by:    RecordId,
  pub suspect_id:  Option<RecordId>,
  pub status:      String,
}

impl NewCase {
  pub fn new(
    case_number: impl Into<String>,
    title: impl Into<String>,
    filed_date: NaiveDate,
    filed_by: RecordId,
  ) -> Self {
    Self {
      case_number: case_number.into(),
      title: title.into(),
      description: String::new(),
      filed_date,
      filed_by,
      suspect_id: None,
      status: DEFAULT_CASE_STATUS.to_owned(),
    }
  }
}

// ─── CaseUpdate ──────────────────────────────────────────────────────────────

/// A progress note on a case. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseUpdate {
  pub update_id:    RecordId,
  pub case_id:      RecordId,
  pub update_text:  String,
  /// Server-assigned.
  pub update_date:  DateTime<Utc>,
  pub updated_by:   Option<RecordId>,
  pub officer_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCaseUpdate {
  pub update_text: String,
  pub updated_by:  RecordId,
}

// ─── Evidence ────────────────────────────────────────────────────────────────

/// Metadata for an uploaded evidence file. The bytes live in the uploads
/// directory under `file_name`; no binary data is stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
  pub evidence_id: RecordId,
  pub case_id:     RecordId,
  pub case_number: Option<String>,
  pub file_name:   String,
  pub description: String,
  /// Server-assigned.
  pub upload_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvidence {
  pub case_id:     RecordId,
  pub file_name:   String,
  pub description: String,
}

// ─── Duty ────────────────────────────────────────────────────────────────────

/// A duty assignment. Created and deleted, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duty {
  pub duty_id:      RecordId,
  pub officer_id:   Option<RecordId>,
  pub officer_name: Option<String>,
  pub duty_date:    NaiveDate,
  pub duty_time:    NaiveTime,
  pub location:     String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDuty {
  pub officer_id: RecordId,
  pub duty_date:  NaiveDate,
  pub duty_time:  NaiveTime,
  pub location:   String,
}
