//! Error type for `nsos-store-sqlite`.

use std::time::Duration;

use nsos_core::{ErrorKind, RecordId, StoreError, audit::Table};
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] nsos_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("{table} {id} not found")]
  NotFound { table: Table, id: RecordId },

  #[error("store did not answer within {0:?}")]
  Timeout(Duration),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::NotFound { .. } => ErrorKind::NotFound,
      Error::Timeout(_) => ErrorKind::Unavailable,
      Error::Database(tokio_rusqlite::Error::ConnectionClosed) => {
        ErrorKind::Unavailable
      }
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _),
      )) => match e.code {
        ErrorCode::ConstraintViolation => ErrorKind::Constraint,
        ErrorCode::CannotOpen
        | ErrorCode::DatabaseBusy
        | ErrorCode::DatabaseLocked => ErrorKind::Unavailable,
        _ => ErrorKind::Internal,
      },
      _ => ErrorKind::Internal,
    }
  }
}
