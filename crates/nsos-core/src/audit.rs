//! Audit trail types.
//!
//! Every successful create, update or delete appends exactly one
//! [`AuditEntry`] naming the action, the table and the affected id.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, RecordId};

/// Default number of entries returned by the audit listing.
pub const DEFAULT_AUDIT_LIMIT: u32 = 100;

/// Upper bound on a single audit listing.
pub const MAX_AUDIT_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
  Insert,
  Update,
  Delete,
}

impl AuditAction {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Insert => "INSERT",
      Self::Update => "UPDATE",
      Self::Delete => "DELETE",
    }
  }
}

impl fmt::Display for AuditAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for AuditAction {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "INSERT" => Ok(Self::Insert),
      "UPDATE" => Ok(Self::Update),
      "DELETE" => Ok(Self::Delete),
      other => Err(Error::UnknownAuditAction(other.to_owned())),
    }
  }
}

/// The audited tables. Serialises as the table name itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Table {
  Admin,
  Unit,
  Officer,
  Criminal,
  Case,
  CaseUpdate,
  Evidence,
  Duty,
}

impl Table {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "Admin",
      Self::Unit => "Unit",
      Self::Officer => "Officer",
      Self::Criminal => "Criminal",
      Self::Case => "Case",
      Self::CaseUpdate => "CaseUpdate",
      Self::Evidence => "Evidence",
      Self::Duty => "Duty",
    }
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Table {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Admin" => Ok(Self::Admin),
      "Unit" => Ok(Self::Unit),
      "Officer" => Ok(Self::Officer),
      "Criminal" => Ok(Self::Criminal),
      "Case" => Ok(Self::Case),
      "CaseUpdate" => Ok(Self::CaseUpdate),
      "Evidence" => Ok(Self::Evidence),
      "Duty" => Ok(Self::Duty),
      other => Err(Error::UnknownTable(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
  pub log_id:      RecordId,
  pub action:      AuditAction,
  pub table_name:  Table,
  pub record_id:   RecordId,
  pub action_date: DateTime<Utc>,
}

/// How the audit row relates to the write it describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditMode {
  /// Write and audit row commit in one transaction, or neither does.
  #[default]
  Atomic,
  /// The audit row is written after the write commits; a failure is logged
  /// and otherwise ignored.
  BestEffort,
}
