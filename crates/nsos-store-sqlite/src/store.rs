//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use nsos_core::{
  RecordId,
  audit::{AuditAction, AuditEntry, AuditMode, Table},
  records::{
    Admin, Case, CaseUpdate, Criminal, Duty, Evidence, NewCase, NewCaseUpdate,
    NewCriminal, NewDuty, NewEvidence, NewOfficer, Officer, Unit,
  },
  store::RecordStore,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  audit::{self, AuditRecorder},
  connection::ConnectionProvider,
  encode::{
    RawAuditEntry, RawCase, RawCaseUpdate, RawDuty, RawEvidence, encode_date,
    encode_dt, encode_time, like_pattern,
  },
  schema::SCHEMA,
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Upper bound on a single store operation when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
  /// Applies to opening a connection and to each statement batch; also used
  /// as SQLite's busy timeout.
  pub timeout:    Duration,
  pub audit_mode: AuditMode,
}

impl Default for StoreOptions {
  fn default() -> Self {
    Self { timeout: DEFAULT_TIMEOUT, audit_mode: AuditMode::default() }
  }
}

// ─── Queries ─────────────────────────────────────────────────────────────────

const OFFICER_SELECT: &str = "
  SELECT o.officer_id, o.name, o.address, o.badge_no, o.rank, o.contact,
         o.unit_id, u.unit_name
  FROM officers o
  LEFT JOIN units u ON u.unit_id = o.unit_id";

const CRIMINAL_SELECT: &str = "
  SELECT criminal_id, name, address, national_id, notes
  FROM criminals";

const CASE_SELECT: &str = "
  SELECT c.case_id, c.case_number, c.title, c.description, c.filed_date,
         c.filed_by, o.name, c.suspect_id, cr.name, c.status
  FROM cases c
  LEFT JOIN officers  o  ON o.officer_id   = c.filed_by
  LEFT JOIN criminals cr ON cr.criminal_id = c.suspect_id";

const EVIDENCE_SELECT: &str = "
  SELECT e.evidence_id, e.case_id, c.case_number, e.file_name, e.description,
         e.upload_date
  FROM evidence e
  LEFT JOIN cases c ON c.case_id = e.case_id";

fn officer_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Officer> {
  Ok(Officer {
    officer_id: row.get(0)?,
    name:       row.get(1)?,
    address:    row.get(2)?,
    badge_no:   row.get(3)?,
    rank:       row.get(4)?,
    contact:    row.get(5)?,
    unit_id:    row.get(6)?,
    unit_name:  row.get(7)?,
  })
}

fn criminal_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Criminal> {
  Ok(Criminal {
    criminal_id: row.get(0)?,
    name:        row.get(1)?,
    address:     row.get(2)?,
    national_id: row.get(3)?,
    notes:       row.get(4)?,
  })
}

fn unit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Unit> {
  Ok(Unit { unit_id: row.get(0)?, unit_name: row.get(1)? })
}

fn case_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCase> {
  Ok(RawCase {
    case_id:      row.get(0)?,
    case_number:  row.get(1)?,
    title:        row.get(2)?,
    description:  row.get(3)?,
    filed_date:   row.get(4)?,
    filed_by:     row.get(5)?,
    officer_name: row.get(6)?,
    suspect_id:   row.get(7)?,
    suspect_name: row.get(8)?,
    status:       row.get(9)?,
  })
}

fn evidence_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvidence> {
  Ok(RawEvidence {
    evidence_id: row.get(0)?,
    case_id:     row.get(1)?,
    case_number: row.get(2)?,
    file_name:   row.get(3)?,
    description: row.get(4)?,
    upload_date: row.get(5)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An NSOS records store backed by a single SQLite file.
///
/// Cloning is cheap; clones share the same connection provider.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) db: ConnectionProvider,
  recorder:      AuditRecorder,
  audit_mode:    AuditMode,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
    let db = ConnectionProvider::file(path.as_ref().to_path_buf(), options.timeout);
    Self::init(db, options.audit_mode).await
  }

  /// Open an in-memory store with default options, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with(StoreOptions::default()).await
  }

  pub async fn open_in_memory_with(options: StoreOptions) -> Result<Self> {
    let db = ConnectionProvider::memory(options.timeout).await?;
    Self::init(db, options.audit_mode).await
  }

  async fn init(db: ConnectionProvider, audit_mode: AuditMode) -> Result<Self> {
    db.call(|conn| {
      conn.execute_batch(SCHEMA)?;
      Ok(())
    })
    .await?;
    Ok(Self { recorder: AuditRecorder::new(db.clone()), db, audit_mode })
  }

  /// Run one write in a transaction and audit it. `op` returns the id of the
  /// row it touched.
  ///
  /// In atomic mode the audit entry is part of the same transaction. In
  /// best-effort mode it is written after the commit and its failure is only
  /// logged.
  async fn write<F>(&self, action: AuditAction, table: Table, op: F) -> Result<RecordId>
  where
    F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<RecordId> + Send + 'static,
  {
    let atomic = self.audit_mode == AuditMode::Atomic;

    let id = self
      .db
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id = op(&tx)?;
        if atomic {
          audit::insert_entry(&tx, action, table, id)?;
        }
        tx.commit()?;
        Ok(id)
      })
      .await?;

    if !atomic {
      self.recorder.record(action, table, id).await;
    }
    tracing::debug!(%action, %table, id, "record written");
    Ok(id)
  }

  /// Insert one row; `op` executes the `INSERT`.
  async fn insert<F>(&self, table: Table, op: F) -> Result<RecordId>
  where
    F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<usize> + Send + 'static,
  {
    self
      .write(AuditAction::Insert, table, move |conn| {
        op(conn)?;
        Ok(conn.last_insert_rowid())
      })
      .await
  }

  /// Update or delete the row `id`; `op` returns the number of rows affected.
  /// Zero rows means the id does not exist, which is reported as
  /// [`Error::NotFound`] and leaves no audit entry.
  async fn modify<F>(
    &self,
    action: AuditAction,
    table: Table,
    id: RecordId,
    op: F,
  ) -> Result<()>
  where
    F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<usize> + Send + 'static,
  {
    self
      .write(action, table, move |conn| match op(conn)? {
        0 => Err(rusqlite::Error::QueryReturnedNoRows),
        _ => Ok(id),
      })
      .await
      .map(drop)
      .map_err(|e| match e {
        Error::Database(tokio_rusqlite::Error::Rusqlite(
          rusqlite::Error::QueryReturnedNoRows,
        )) => Error::NotFound { table, id },
        other => other,
      })
  }

  async fn query_cases(
    &self,
    filter: &'static str,
    pattern: Option<String>,
  ) -> Result<Vec<Case>> {
    let raws: Vec<RawCase> = self
      .db
      .call(move |conn| {
        let mut stmt =
          conn.prepare(&format!("{CASE_SELECT} {filter} ORDER BY c.case_id DESC"))?;
        let rows = match pattern {
          Some(p) => stmt.query_map(rusqlite::params![p], case_row)?,
          None => stmt.query_map([], case_row)?,
        }
        .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCase::into_case).collect()
  }

  async fn query_criminals(
    &self,
    filter: &'static str,
    pattern: Option<String>,
  ) -> Result<Vec<Criminal>> {
    self
      .db
      .call(move |conn| {
        let mut stmt =
          conn.prepare(&format!("{CRIMINAL_SELECT} {filter} ORDER BY criminal_id"))?;
        let rows = match pattern {
          Some(p) => stmt.query_map(rusqlite::params![p], criminal_row)?,
          None => stmt.query_map([], criminal_row)?,
        }
        .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn query_evidence(&self, case_id: Option<RecordId>) -> Result<Vec<Evidence>> {
    let filter = if case_id.is_some() { "WHERE e.case_id = ?1" } else { "" };
    let raws: Vec<RawEvidence> = self
      .db
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{EVIDENCE_SELECT} {filter} ORDER BY e.upload_date DESC, e.evidence_id DESC"
        ))?;
        let rows = match case_id {
          Some(id) => stmt.query_map(rusqlite::params![id], evidence_row)?,
          None => stmt.query_map([], evidence_row)?,
        }
        .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvidence::into_evidence).collect()
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Admins ────────────────────────────────────────────────────────────────

  async fn get_admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
    let username = username.to_owned();
    self
      .db
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT admin_id, username, password_hash FROM admins WHERE username = ?1",
              rusqlite::params![username],
              |row| {
                Ok(Admin {
                  admin_id:      row.get(0)?,
                  username:      row.get(1)?,
                  password_hash: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
  }

  async fn create_admin(&self, username: String, password_hash: String) -> Result<RecordId> {
    self
      .insert(Table::Admin, move |conn| {
        conn.execute(
          "INSERT INTO admins (username, password_hash) VALUES (?1, ?2)",
          rusqlite::params![username, password_hash],
        )
      })
      .await
  }

  // ── Units ─────────────────────────────────────────────────────────────────

  async fn list_units(&self) -> Result<Vec<Unit>> {
    self
      .db
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT unit_id, unit_name FROM units ORDER BY unit_id")?;
        let rows = stmt
          .query_map([], unit_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn get_unit(&self, id: RecordId) -> Result<Option<Unit>> {
    self
      .db
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT unit_id, unit_name FROM units WHERE unit_id = ?1",
              rusqlite::params![id],
              unit_row,
            )
            .optional()?,
        )
      })
      .await
  }

  async fn create_unit(&self, unit_name: String) -> Result<RecordId> {
    self
      .insert(Table::Unit, move |conn| {
        conn.execute(
          "INSERT INTO units (unit_name) VALUES (?1)",
          rusqlite::params![unit_name],
        )
      })
      .await
  }

  // ── Officers ──────────────────────────────────────────────────────────────

  async fn list_officers(&self) -> Result<Vec<Officer>> {
    self
      .db
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("{OFFICER_SELECT} ORDER BY o.officer_id"))?;
        let rows = stmt
          .query_map([], officer_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn get_officer(&self, id: RecordId) -> Result<Option<Officer>> {
    self
      .db
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{OFFICER_SELECT} WHERE o.officer_id = ?1"),
              rusqlite::params![id],
              officer_row,
            )
            .optional()?,
        )
      })
      .await
  }

  async fn create_officer(&self, input: NewOfficer) -> Result<RecordId> {
    self
      .insert(Table::Officer, move |conn| {
        conn.execute(
          "INSERT INTO officers (name, address, badge_no, rank, contact, unit_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            input.name,
            input.address,
            input.badge_no,
            input.rank,
            input.contact,
            input.unit_id,
          ],
        )
      })
      .await
  }

  async fn update_officer(&self, id: RecordId, input: NewOfficer) -> Result<()> {
    self
      .modify(AuditAction::Update, Table::Officer, id, move |conn| {
        conn.execute(
          "UPDATE officers
           SET name = ?1, address = ?2, badge_no = ?3, rank = ?4, contact = ?5,
               unit_id = ?6
           WHERE officer_id = ?7",
          rusqlite::params![
            input.name,
            input.address,
            input.badge_no,
            input.rank,
            input.contact,
            input.unit_id,
            id,
          ],
        )
      })
      .await
  }

  async fn delete_officer(&self, id: RecordId) -> Result<()> {
    self
      .modify(AuditAction::Delete, Table::Officer, id, move |conn| {
        conn.execute(
          "DELETE FROM officers WHERE officer_id = ?1",
          rusqlite::params![id],
        )
      })
      .await
  }

  // ── Criminals ─────────────────────────────────────────────────────────────

  async fn list_criminals(&self) -> Result<Vec<Criminal>> {
    self.query_criminals("", None).await
  }

  async fn get_criminal(&self, id: RecordId) -> Result<Option<Criminal>> {
    self
      .db
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{CRIMINAL_SELECT} WHERE criminal_id = ?1"),
              rusqlite::params![id],
              criminal_row,
            )
            .optional()?,
        )
      })
      .await
  }

  async fn create_criminal(&self, input: NewCriminal) -> Result<RecordId> {
    self
      .insert(Table::Criminal, move |conn| {
        conn.execute(
          "INSERT INTO criminals (name, address, national_id, notes)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![input.name, input.address, input.national_id, input.notes],
        )
      })
      .await
  }

  async fn update_criminal(&self, id: RecordId, input: NewCriminal) -> Result<()> {
    self
      .modify(AuditAction::Update, Table::Criminal, id, move |conn| {
        conn.execute(
          "UPDATE criminals
           SET name = ?1, address = ?2, national_id = ?3, notes = ?4
           WHERE criminal_id = ?5",
          rusqlite::params![
            input.name,
            input.address,
            input.national_id,
            input.notes,
            id,
          ],
        )
      })
      .await
  }

  async fn delete_criminal(&self, id: RecordId) -> Result<()> {
    self
      .modify(AuditAction::Delete, Table::Criminal, id, move |conn| {
        conn.execute(
          "DELETE FROM criminals WHERE criminal_id = ?1",
          rusqlite::params![id],
        )
      })
      .await
  }

  // ── Cases ─────────────────────────────────────────────────────────────────

  async fn list_cases(&self) -> Result<Vec<Case>> {
    self.query_cases("", None).await
  }

  async fn get_case(&self, id: RecordId) -> Result<Option<Case>> {
    let raw: Option<RawCase> = self
      .db
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{CASE_SELECT} WHERE c.case_id = ?1"),
              rusqlite::params![id],
              case_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCase::into_case).transpose()
  }

  async fn create_case(&self, input: NewCase) -> Result<RecordId> {
    let filed_date = encode_date(input.filed_date);
    self
      .insert(Table::Case, move |conn| {
        conn.execute(
          "INSERT INTO cases (
             case_number, title, description, filed_date, filed_by, suspect_id,
             status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            input.case_number,
            input.title,
            input.description,
            filed_date,
            input.filed_by,
            input.suspect_id,
            input.status,
          ],
        )
      })
      .await
  }

  async fn update_case(&self, id: RecordId, input: NewCase) -> Result<()> {
    let filed_date = encode_date(input.filed_date);
    self
      .modify(AuditAction::Update, Table::Case, id, move |conn| {
        conn.execute(
          "UPDATE cases
           SET case_number = ?1, title = ?2, description = ?3, filed_date = ?4,
               filed_by = ?5, suspect_id = ?6, status = ?7
           WHERE case_id = ?8",
          rusqlite::params![
            input.case_number,
            input.title,
            input.description,
            filed_date,
            input.filed_by,
            input.suspect_id,
            input.status,
            id,
          ],
        )
      })
      .await
  }

  async fn delete_case(&self, id: RecordId) -> Result<()> {
    self
      .modify(AuditAction::Delete, Table::Case, id, move |conn| {
        conn.execute("DELETE FROM cases WHERE case_id = ?1", rusqlite::params![id])
      })
      .await
  }

  // ── Case updates ──────────────────────────────────────────────────────────

  async fn list_case_updates(&self, case_id: RecordId) -> Result<Vec<CaseUpdate>> {
    let raws: Vec<RawCaseUpdate> = self
      .db
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT cu.update_id, cu.case_id, cu.update_text, cu.update_date,
                  cu.updated_by, o.name
           FROM case_updates cu
           LEFT JOIN officers o ON o.officer_id = cu.updated_by
           WHERE cu.case_id = ?1
           ORDER BY cu.update_date DESC, cu.update_id DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![case_id], |row| {
            Ok(RawCaseUpdate {
              update_id:    row.get(0)?,
              case_id:      row.get(1)?,
              update_text:  row.get(2)?,
              update_date:  row.get(3)?,
              updated_by:   row.get(4)?,
              officer_name: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCaseUpdate::into_case_update).collect()
  }

  async fn add_case_update(&self, case_id: RecordId, input: NewCaseUpdate) -> Result<RecordId> {
    let at = encode_dt(Utc::now());
    self
      .insert(Table::CaseUpdate, move |conn| {
        conn.execute(
          "INSERT INTO case_updates (case_id, update_text, update_date, updated_by)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![case_id, input.update_text, at, input.updated_by],
        )
      })
      .await
  }

  // ── Evidence ──────────────────────────────────────────────────────────────

  async fn list_evidence(&self) -> Result<Vec<Evidence>> {
    self.query_evidence(None).await
  }

  async fn list_evidence_for_case(&self, case_id: RecordId) -> Result<Vec<Evidence>> {
    self.query_evidence(Some(case_id)).await
  }

  async fn create_evidence(&self, input: NewEvidence) -> Result<RecordId> {
    let at = encode_dt(Utc::now());
    self
      .insert(Table::Evidence, move |conn| {
        conn.execute(
          "INSERT INTO evidence (case_id, file_name, description, upload_date)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![input.case_id, input.file_name, input.description, at],
        )
      })
      .await
  }

  // ── Duties ────────────────────────────────────────────────────────────────

  async fn list_duties(&self) -> Result<Vec<Duty>> {
    let raws: Vec<RawDuty> = self
      .db
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT d.duty_id, d.officer_id, o.name, d.duty_date, d.duty_time,
                  d.location
           FROM duties d
           LEFT JOIN officers o ON o.officer_id = d.officer_id
           ORDER BY d.duty_date DESC, d.duty_time DESC, d.duty_id DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawDuty {
              duty_id:      row.get(0)?,
              officer_id:   row.get(1)?,
              officer_name: row.get(2)?,
              duty_date:    row.get(3)?,
              duty_time:    row.get(4)?,
              location:     row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDuty::into_duty).collect()
  }

  async fn create_duty(&self, input: NewDuty) -> Result<RecordId> {
    let date = encode_date(input.duty_date);
    let time = encode_time(input.duty_time);
    self
      .insert(Table::Duty, move |conn| {
        conn.execute(
          "INSERT INTO duties (officer_id, duty_date, duty_time, location)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![input.officer_id, date, time, input.location],
        )
      })
      .await
  }

  async fn delete_duty(&self, id: RecordId) -> Result<()> {
    self
      .modify(AuditAction::Delete, Table::Duty, id, move |conn| {
        conn.execute("DELETE FROM duties WHERE duty_id = ?1", rusqlite::params![id])
      })
      .await
  }

  // ── Search ────────────────────────────────────────────────────────────────

  async fn search_cases(&self, needle: &str) -> Result<Vec<Case>> {
    self
      .query_cases(
        "WHERE nsos_fold(c.case_number) LIKE ?1 ESCAPE '\\'
            OR nsos_fold(c.title)       LIKE ?1 ESCAPE '\\'
            OR nsos_fold(o.name)        LIKE ?1 ESCAPE '\\'",
        Some(like_pattern(needle)),
      )
      .await
  }

  async fn search_criminals(&self, needle: &str) -> Result<Vec<Criminal>> {
    self
      .query_criminals(
        "WHERE nsos_fold(name)        LIKE ?1 ESCAPE '\\'
            OR nsos_fold(national_id) LIKE ?1 ESCAPE '\\'",
        Some(like_pattern(needle)),
      )
      .await
  }

  // ── Audit ─────────────────────────────────────────────────────────────────

  async fn list_audit(&self, limit: u32) -> Result<Vec<AuditEntry>> {
    let raws: Vec<RawAuditEntry> = self
      .db
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT log_id, action, table_name, record_id, action_date
           FROM audit_log
           ORDER BY action_date DESC, log_id DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![i64::from(limit)], |row| {
            Ok(RawAuditEntry {
              log_id:      row.get(0)?,
              action:      row.get(1)?,
              table_name:  row.get(2)?,
              record_id:   row.get(3)?,
              action_date: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuditEntry::into_entry).collect()
  }
}
