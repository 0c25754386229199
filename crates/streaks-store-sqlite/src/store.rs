//! [`SqliteStore`] — the SQLite implementation of [`KeyValueStore`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _};
use streaks_core::store::{KeyValueStore, StoredValue};

use crate::{
  Error, Result,
  encode::{decode_value, encode_value},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A streaks key-value store backed by a single SQLite file.
pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path.as_ref())?;
    let store = Self { conn };
    store.init_schema()?;
    tracing::debug!(path = %path.as_ref().display(), "opened sqlite store");
    Ok(store)
  }

  /// Open a throwaway in-memory store for tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    let store = Self { conn };
    store.init_schema()?;
    Ok(store)
  }

  fn init_schema(&self) -> Result<()> {
    self.conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  /// All stored keys in lexical order.
  pub fn keys(&self) -> Result<Vec<String>> {
    let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
    let keys = stmt
      .query_map([], |r| r.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(keys)
  }
}

// ─── KeyValueStore impl ──────────────────────────────────────────────────────

impl KeyValueStore for SqliteStore {
  type Error = Error;

  fn get(&self, key: &str) -> Result<Option<StoredValue>> {
    let row: Option<(String, String)> = self
      .conn
      .query_row(
        "SELECT kind, value FROM kv WHERE key = ?1",
        rusqlite::params![key],
        |r| Ok((r.get(0)?, r.get(1)?)),
      )
      .optional()?;

    row
      .map(|(kind, text)| decode_value(key, &kind, &text))
      .transpose()
  }

  fn set(&mut self, key: &str, value: StoredValue) -> Result<()> {
    let (kind, text) = encode_value(&value);
    self.conn.execute(
      "INSERT INTO kv (key, kind, value) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET kind = excluded.kind, value = excluded.value",
      rusqlite::params![key, kind, text],
    )?;
    Ok(())
  }
}
