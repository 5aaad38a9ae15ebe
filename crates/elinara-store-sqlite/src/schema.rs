//! SQL schema for the Elinara SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per identity-provider subject.
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id    TEXT NOT NULL UNIQUE,   -- provider `sub`
    email         TEXT,
    full_name     TEXT,
    username      TEXT,
    phone_number  TEXT,
    address       TEXT
);

CREATE INDEX IF NOT EXISTS users_email_idx ON users(email);

PRAGMA user_version = 1;
";

/// Column list shared by every `SELECT` that builds a `StoredUser`.
pub const USER_COLUMNS: &str =
  "id, subject_id, email, full_name, username, phone_number, address";
