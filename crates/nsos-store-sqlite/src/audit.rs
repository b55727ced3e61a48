//! The audit recorder: appends one `audit_log` row per mutation.

use chrono::Utc;
use nsos_core::{RecordId, audit::{AuditAction, Table}};

use crate::{Result, connection::ConnectionProvider, encode::encode_dt};

/// Append an entry using an existing connection or transaction.
pub(crate) fn insert_entry(
  conn: &rusqlite::Connection,
  action: AuditAction,
  table: Table,
  record_id: RecordId,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO audit_log (action, table_name, record_id, action_date)
     VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![
      action.as_str(),
      table.as_str(),
      record_id,
      encode_dt(Utc::now()),
    ],
  )?;
  Ok(())
}

/// Writes audit entries on their own connection, after the write they
/// describe has already committed. Used in best-effort mode.
#[derive(Clone)]
pub(crate) struct AuditRecorder {
  db: ConnectionProvider,
}

impl AuditRecorder {
  pub(crate) fn new(db: ConnectionProvider) -> Self { Self { db } }

  /// Record the entry. Failures are logged and never returned.
  pub(crate) async fn record(
    &self,
    action: AuditAction,
    table: Table,
    record_id: RecordId,
  ) {
    if let Err(e) = self.try_record(action, table, record_id).await {
      tracing::warn!(
        %action,
        %table,
        record_id,
        error = %e,
        "failed to write audit entry"
      );
    }
  }

  async fn try_record(
    &self,
    action: AuditAction,
    table: Table,
    record_id: RecordId,
  ) -> Result<()> {
    self
      .db
      .call(move |conn| {
        insert_entry(conn, action, table, record_id)?;
        Ok(())
      })
      .await
  }
}
