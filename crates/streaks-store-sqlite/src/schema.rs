//! SQL schema for the streaks SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per persisted scalar: 'startDate', 'mainRecord', 'record_<title>'.
CREATE TABLE IF NOT EXISTS kv (
    key    TEXT PRIMARY KEY,
    kind   TEXT NOT NULL,   -- 'date' | 'integer'
    value  TEXT NOT NULL    -- YYYY-MM-DD or decimal integer
);

PRAGMA user_version = 1;
";
