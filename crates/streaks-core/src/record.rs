//! `RecordStore` — best-ever streak persistence and the record rule.

use chrono::NaiveDate;

use crate::{
  Error, Result,
  counter::StreakCounter,
  store::{KeyValueStore, StoreKey, StoredValue, read_integer},
};

/// Owns a [`KeyValueStore`] and applies the record rules on top of it.
///
/// Two mutations exist and they differ on purpose:
/// - [`reset_record`](Self::reset_record) is a hard overwrite and may lower
///   the record;
/// - [`update_record_if_needed`](Self::update_record_if_needed) only ever
///   raises it.
#[derive(Debug, Clone, Default)]
pub struct RecordStore<S> {
  store: S,
}

impl<S: KeyValueStore> RecordStore<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn inner(&self) -> &S { &self.store }

  pub fn inner_mut(&mut self) -> &mut S { &mut self.store }

  pub fn into_inner(self) -> S { self.store }

  /// The persisted record for `key`, or 0 if none was ever written.
  pub fn get_record(&self, key: &StoreKey) -> Result<i64> {
    Ok(read_integer(&self.store, key)?.unwrap_or(0))
  }

  pub fn set_record(&mut self, key: &StoreKey, value: i64) -> Result<()> {
    self
      .store
      .set(&key.to_string(), StoredValue::Integer(value))
      .map_err(Error::store)
  }

  /// Adopt the counter's current day count as its record, whatever the prior
  /// value was. Returns the new record.
  pub fn reset_record(
    &mut self,
    counter: &StreakCounter,
    today: NaiveDate,
  ) -> Result<i64> {
    let key = counter.record_key();
    let count = counter.day_count(today);
    self.set_record(&key, count)?;
    tracing::debug!(key = %key, record = count, "record reset");
    Ok(count)
  }

  /// Raise the record to the current day count if it is higher. Returns
  /// `true` when a new record was written.
  pub fn update_record_if_needed(
    &mut self,
    counter: &StreakCounter,
    today: NaiveDate,
  ) -> Result<bool> {
    let key = counter.record_key();
    let count = counter.day_count(today);
    if count <= self.get_record(&key)? {
      return Ok(false);
    }
    self.set_record(&key, count)?;
    tracing::debug!(key = %key, record = count, "new record");
    Ok(true)
  }

  /// Persist the main counter's start date.
  pub(crate) fn set_start_date(&mut self, date: NaiveDate) -> Result<()> {
    self
      .store
      .set(&StoreKey::StartDate.to_string(), StoredValue::Date(date))
      .map_err(Error::store)
  }
}
