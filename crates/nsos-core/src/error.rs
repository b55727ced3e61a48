//! Error types for `nsos-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("invalid value for {field}: {reason}")]
  InvalidField {
    field:  &'static str,
    reason: String,
  },

  #[error("unknown audit action: {0:?}")]
  UnknownAuditAction(String),

  #[error("unknown table name: {0:?}")]
  UnknownTable(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of a storage failure, used by the HTTP layer to pick
/// a status code without knowing the concrete backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The addressed record does not exist.
  NotFound,
  /// The engine rejected the write (dangling reference, duplicate key).
  Constraint,
  /// The store could not be reached or did not answer in time.
  Unavailable,
  /// Anything else: query failures, corrupt rows.
  Internal,
}

/// Implemented by every storage backend's error type.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}
