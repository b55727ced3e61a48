//! SQL schema for the NSOS SQLite store.
//!
//! Executed once when the store is opened. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS admins (
    admin_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL          -- argon2 PHC string
);

CREATE TABLE IF NOT EXISTS units (
    unit_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    unit_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS officers (
    officer_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    address    TEXT NOT NULL DEFAULT '',
    badge_no   TEXT NOT NULL,
    rank       TEXT NOT NULL DEFAULT '',
    contact    TEXT NOT NULL DEFAULT '',
    unit_id    INTEGER REFERENCES units(unit_id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS criminals (
    criminal_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    address     TEXT NOT NULL DEFAULT '',
    national_id TEXT NOT NULL,
    notes       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS cases (
    case_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    case_number TEXT NOT NULL,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    filed_date  TEXT NOT NULL,           -- YYYY-MM-DD
    filed_by    INTEGER REFERENCES officers(officer_id)   ON DELETE SET NULL,
    suspect_id  INTEGER REFERENCES criminals(criminal_id) ON DELETE SET NULL,
    status      TEXT NOT NULL DEFAULT 'Open'
);

-- Append-only. No UPDATE is ever issued against this table.
CREATE TABLE IF NOT EXISTS case_updates (
    update_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id     INTEGER NOT NULL REFERENCES cases(case_id) ON DELETE CASCADE,
    update_text TEXT NOT NULL,
    update_date TEXT NOT NULL,           -- RFC 3339 UTC, server-assigned
    updated_by  INTEGER REFERENCES officers(officer_id) ON DELETE SET NULL
);

-- Append-only. The file itself lives in the uploads directory.
CREATE TABLE IF NOT EXISTS evidence (
    evidence_id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id     INTEGER NOT NULL REFERENCES cases(case_id) ON DELETE CASCADE,
    file_name   TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    upload_date TEXT NOT NULL            -- RFC 3339 UTC, server-assigned
);

CREATE TABLE IF NOT EXISTS duties (
    duty_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    officer_id INTEGER REFERENCES officers(officer_id) ON DELETE SET NULL,
    duty_date  TEXT NOT NULL,            -- YYYY-MM-DD
    duty_time  TEXT NOT NULL,            -- HH:MM:SS
    location   TEXT NOT NULL
);

-- No foreign key on record_id: entries outlive the records they describe.
CREATE TABLE IF NOT EXISTS audit_log (
    log_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    action      TEXT NOT NULL CHECK (action IN ('INSERT', 'UPDATE', 'DELETE')),
    table_name  TEXT NOT NULL,
    record_id   INTEGER NOT NULL,
    action_date TEXT NOT NULL            -- RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS case_updates_case_idx ON case_updates(case_id);
CREATE INDEX IF NOT EXISTS evidence_case_idx     ON evidence(case_id);
CREATE INDEX IF NOT EXISTS duties_when_idx       ON duties(duty_date, duty_time);
CREATE INDEX IF NOT EXISTS audit_log_date_idx    ON audit_log(action_date);

PRAGMA user_version = 1;
";
