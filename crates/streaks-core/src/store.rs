//! The `KeyValueStore` port and the persisted key contract.
//!
//! Only a handful of scalars survive a restart: the main counter's start
//! date and one best-streak integer per counter. Backends (e.g.
//! `streaks-store-sqlite`) implement [`KeyValueStore`]; the core never
//! depends on a concrete backend.

use std::{collections::HashMap, convert::Infallible, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ─── Values ──────────────────────────────────────────────────────────────────

/// Discriminant of a [`StoredValue`], as written by storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
  Date,
  Integer,
}

/// A persisted scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum StoredValue {
  /// A calendar date; time of day is never stored.
  Date(NaiveDate),
  Integer(i64),
}

impl StoredValue {
  pub fn kind(&self) -> ValueKind {
    match self {
      Self::Date(_) => ValueKind::Date,
      Self::Integer(_) => ValueKind::Integer,
    }
  }

  pub fn as_date(&self) -> Option<NaiveDate> {
    match self {
      Self::Date(d) => Some(*d),
      Self::Integer(_) => None,
    }
  }

  pub fn as_integer(&self) -> Option<i64> {
    match self {
      Self::Integer(n) => Some(*n),
      Self::Date(_) => None,
    }
  }
}

// ─── Keys ────────────────────────────────────────────────────────────────────

/// A typed persistence key. The [`Display`](fmt::Display) form is the
/// on-disk key and must stay stable across releases.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
  /// `startDate`: the main counter's streak start.
  StartDate,
  /// `mainRecord`: the main counter's best streak.
  MainRecord,
  /// `record_<title>`: a sub-habit's best streak, keyed by its title.
  SubHabitRecord(String),
}

impl fmt::Display for StoreKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::StartDate => f.write_str("startDate"),
      Self::MainRecord => f.write_str("mainRecord"),
      Self::SubHabitRecord(title) => write!(f, "record_{title}"),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Synchronous, durable key-value persistence.
///
/// Implementations report their own failures through `Self::Error`; the core
/// propagates them unchanged and never retries or branches on them.
pub trait KeyValueStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the value stored under `key`, or `None` if it was never set.
  fn get(&self, key: &str) -> Result<Option<StoredValue>, Self::Error>;

  /// Store `value` under `key`, replacing any prior value.
  fn set(&mut self, key: &str, value: StoredValue) -> Result<(), Self::Error>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
  type Error = S::Error;

  fn get(&self, key: &str) -> Result<Option<StoredValue>, Self::Error> {
    (**self).get(key)
  }

  fn set(&mut self, key: &str, value: StoredValue) -> Result<(), Self::Error> {
    (**self).set(key, value)
  }
}

// ─── Typed reads ─────────────────────────────────────────────────────────────

/// Read a date, treating a value of the wrong kind as absent.
pub(crate) fn read_date<S: KeyValueStore>(
  store: &S,
  key: &StoreKey,
) -> crate::Result<Option<NaiveDate>> {
  let name = key.to_string();
  let value = store.get(&name).map_err(crate::Error::store)?;
  Ok(value.and_then(|v| {
    let date = v.as_date();
    if date.is_none() {
      tracing::warn!(key = %name, kind = %v.kind(), "ignoring non-date value");
    }
    date
  }))
}

/// Read an integer, treating a value of the wrong kind as absent.
pub(crate) fn read_integer<S: KeyValueStore>(
  store: &S,
  key: &StoreKey,
) -> crate::Result<Option<i64>> {
  let name = key.to_string();
  let value = store.get(&name).map_err(crate::Error::store)?;
  Ok(value.and_then(|v| {
    let n = v.as_integer();
    if n.is_none() {
      tracing::warn!(key = %name, kind = %v.kind(), "ignoring non-integer value");
    }
    n
  }))
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A non-durable [`KeyValueStore`] held in a `HashMap`.
///
/// Used by tests and when running without a database file.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  values: HashMap<String, StoredValue>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.values.len() }

  pub fn is_empty(&self) -> bool { self.values.is_empty() }
}

impl KeyValueStore for MemoryStore {
  type Error = Infallible;

  fn get(&self, key: &str) -> Result<Option<StoredValue>, Self::Error> {
    Ok(self.values.get(key).copied())
  }

  fn set(&mut self, key: &str, value: StoredValue) -> Result<(), Self::Error> {
    self.values.insert(key.to_owned(), value);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn key_names_match_persisted_contract() {
    assert_eq!(StoreKey::StartDate.to_string(), "startDate");
    assert_eq!(StoreKey::MainRecord.to_string(), "mainRecord");
    assert_eq!(
      StoreKey::SubHabitRecord("Workout".into()).to_string(),
      "record_Workout"
    );
  }

  #[test]
  fn value_kind_parses_lowercase() {
    assert_eq!("date".parse::<ValueKind>().unwrap(), ValueKind::Date);
    assert_eq!("integer".parse::<ValueKind>().unwrap(), ValueKind::Integer);
    assert!("float".parse::<ValueKind>().is_err());
    assert_eq!(ValueKind::Integer.to_string(), "integer");
  }

  #[test]
  fn stored_value_serialises_with_kind_tag() {
    let json = serde_json::to_value(StoredValue::Integer(8)).unwrap();
    assert_eq!(json, serde_json::json!({ "kind": "integer", "value": 8 }));
  }

  #[test]
  fn memory_store_overwrites() {
    let mut store = MemoryStore::new();
    assert!(store.get("mainRecord").unwrap().is_none());
    store.set("mainRecord", StoredValue::Integer(3)).unwrap();
    store.set("mainRecord", StoredValue::Integer(5)).unwrap();
    assert_eq!(store.get("mainRecord").unwrap(), Some(StoredValue::Integer(5)));
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn wrong_kind_reads_as_absent() {
    let mut store = MemoryStore::new();
    store.set("startDate", StoredValue::Integer(12)).unwrap();
    assert_eq!(read_date(&store, &StoreKey::StartDate).unwrap(), None);
    assert_eq!(read_integer(&store, &StoreKey::StartDate).unwrap(), Some(12));
  }
}
