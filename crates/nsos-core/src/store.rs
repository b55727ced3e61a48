//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `nsos-store-sqlite`). The API and
//! server crates depend on this abstraction, not on any concrete backend.
//!
//! Every mutating method appends exactly one audit entry for the row it
//! touched. Updates and deletes of a missing id fail with an error whose
//! [`StoreError::kind`](crate::StoreError::kind) is
//! [`ErrorKind::NotFound`](crate::ErrorKind::NotFound) and write no audit row.

use std::future::Future;

use crate::{
  RecordId, StoreError,
  audit::AuditEntry,
  records::{
    Admin, Case, CaseUpdate, Criminal, Duty, Evidence, NewCase, NewCaseUpdate,
    NewCriminal, NewDuty, NewEvidence, NewOfficer, Officer, Unit,
  },
};

/// Abstraction over an NSOS records backend.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait RecordStore: Send + Sync {
  type Error: StoreError;

  // ── Admins ────────────────────────────────────────────────────────────

  /// Exact-match lookup used by the login gate.
  fn get_admin_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Admin>, Self::Error>> + Send + 'a;

  /// Provision an operator account. `password_hash` must already be a PHC
  /// string; this method does not hash.
  fn create_admin(
    &self,
    username: String,
    password_hash: String,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  // ── Units ─────────────────────────────────────────────────────────────

  /// Ordered by id ascending.
  fn list_units(
    &self,
  ) -> impl Future<Output = Result<Vec<Unit>, Self::Error>> + Send + '_;

  fn get_unit(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<Unit>, Self::Error>> + Send + '_;

  fn create_unit(
    &self,
    unit_name: String,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  // ── Officers ──────────────────────────────────────────────────────────

  /// Ordered by id ascending, with `unit_name` resolved.
  fn list_officers(
    &self,
  ) -> impl Future<Output = Result<Vec<Officer>, Self::Error>> + Send + '_;

  fn get_officer(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<Officer>, Self::Error>> + Send + '_;

  fn create_officer(
    &self,
    input: NewOfficer,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  fn update_officer(
    &self,
    id: RecordId,
    input: NewOfficer,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_officer(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Criminals ─────────────────────────────────────────────────────────

  /// Ordered by id ascending.
  fn list_criminals(
    &self,
  ) -> impl Future<Output = Result<Vec<Criminal>, Self::Error>> + Send + '_;

  fn get_criminal(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<Criminal>, Self::Error>> + Send + '_;

  fn create_criminal(
    &self,
    input: NewCriminal,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  fn update_criminal(
    &self,
    id: RecordId,
    input: NewCriminal,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_criminal(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Cases ─────────────────────────────────────────────────────────────

  /// Ordered by id descending (newest first), with officer and suspect
  /// names resolved.
  fn list_cases(
    &self,
  ) -> impl Future<Output = Result<Vec<Case>, Self::Error>> + Send + '_;

  fn get_case(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<Case>, Self::Error>> + Send + '_;

  fn create_case(
    &self,
    input: NewCase,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  fn update_case(
    &self,
    id: RecordId,
    input: NewCase,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_case(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Case updates (append-only) ────────────────────────────────────────

  /// Updates for one case, newest first.
  fn list_case_updates(
    &self,
    case_id: RecordId,
  ) -> impl Future<Output = Result<Vec<CaseUpdate>, Self::Error>> + Send + '_;

  fn add_case_update(
    &self,
    case_id: RecordId,
    input: NewCaseUpdate,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  // ── Evidence (append-only) ────────────────────────────────────────────

  /// All evidence, newest upload first.
  fn list_evidence(
    &self,
  ) -> impl Future<Output = Result<Vec<Evidence>, Self::Error>> + Send + '_;

  /// Evidence attached to one case, newest upload first.
  fn list_evidence_for_case(
    &self,
    case_id: RecordId,
  ) -> impl Future<Output = Result<Vec<Evidence>, Self::Error>> + Send + '_;

  fn create_evidence(
    &self,
    input: NewEvidence,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  // ── Duties ────────────────────────────────────────────────────────────

  /// Ordered by date, then time, latest first.
  fn list_duties(
    &self,
  ) -> impl Future<Output = Result<Vec<Duty>, Self::Error>> + Send + '_;

  fn create_duty(
    &self,
    input: NewDuty,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  fn delete_duty(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Search ────────────────────────────────────────────────────────────

  /// Case-insensitive substring match over case number, title and filing
  /// officer name. Same order as [`RecordStore::list_cases`].
  fn search_cases<'a>(
    &'a self,
    needle: &'a str,
  ) -> impl Future<Output = Result<Vec<Case>, Self::Error>> + Send + 'a;

  /// Case-insensitive substring match over name and national id. Same order
  /// as [`RecordStore::list_criminals`].
  fn search_criminals<'a>(
    &'a self,
    needle: &'a str,
  ) -> impl Future<Output = Result<Vec<Criminal>, Self::Error>> + Send + 'a;

  // ── Audit ─────────────────────────────────────────────────────────────

  /// The most recent `limit` audit entries, newest first.
  fn list_audit(
    &self,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<AuditEntry>, Self::Error>> + Send + '_;
}
