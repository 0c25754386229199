//! `StreakCounter` — whole days elapsed since a start date.
//!
//! A counter knows nothing about its record. Record maintenance is a
//! separate, explicit step (see [`crate::record::RecordStore`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::StoreKey;

// ─── Addressing ──────────────────────────────────────────────────────────────

/// Names a counter inside a [`crate::registry::HabitRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CounterRef {
  /// The singleton top-level counter.
  Main,
  SubHabit(Uuid),
}

// ─── Counter ─────────────────────────────────────────────────────────────────

/// A streak counter. `id` and `title` are fixed at creation; only the start
/// date changes over the counter's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakCounter {
  id:         Uuid,
  /// `None` for the main counter.
  title:      Option<String>,
  start_date: NaiveDate,
}

impl StreakCounter {
  /// The untitled main counter.
  pub fn main(start_date: NaiveDate) -> Self {
    Self {
      id: Uuid::new_v4(),
      title: None,
      start_date,
    }
  }

  /// A named sub-habit counter.
  pub fn sub_habit(title: impl Into<String>, start_date: NaiveDate) -> Self {
    Self {
      id: Uuid::new_v4(),
      title: Some(title.into()),
      start_date,
    }
  }

  pub fn id(&self) -> Uuid { self.id }

  pub fn title(&self) -> Option<&str> { self.title.as_deref() }

  pub fn start_date(&self) -> NaiveDate { self.start_date }

  pub fn is_main(&self) -> bool { self.title.is_none() }

  /// Streak length on `today`, counting the start day as day 1.
  ///
  /// Never less than 1, even when `start_date` lies after `today`.
  pub fn day_count(&self, today: NaiveDate) -> i64 {
    (days_between(self.start_date, today) + 1).max(1)
  }

  /// Replace the start date. Callers should reject dates after today; the
  /// counter itself accepts any date.
  pub fn set_start_date(&mut self, date: NaiveDate) { self.start_date = date; }

  /// Restart the streak so that `day_count(today) == 1`.
  pub fn reset_to_today(&mut self, today: NaiveDate) {
    self.set_start_date(today);
  }

  /// The key under which this counter's record is persisted.
  pub fn record_key(&self) -> StoreKey {
    match &self.title {
      None => StoreKey::MainRecord,
      Some(title) => StoreKey::SubHabitRecord(title.clone()),
    }
  }
}

/// Signed whole calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
  to.signed_duration_since(from).num_days()
}

#[cfg(test)]
mod tests {
  use chrono::Days;

  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn started_today_is_day_one() {
    let today = day(2025, 5, 8);
    assert_eq!(StreakCounter::main(today).day_count(today), 1);
    assert_eq!(StreakCounter::sub_habit("Reading", today).day_count(today), 1);
  }

  #[test]
  fn three_days_ago_is_day_four() {
    let today = day(2025, 5, 8);
    let counter = StreakCounter::sub_habit("Workout", day(2025, 5, 5));
    assert_eq!(counter.day_count(today), 4);
  }

  #[test]
  fn future_start_clamps_to_one_for_every_counter() {
    let today = day(2025, 5, 8);
    let future = day(2025, 5, 20);
    assert_eq!(StreakCounter::main(future).day_count(today), 1);
    assert_eq!(StreakCounter::sub_habit("Workout", future).day_count(today), 1);
  }

  #[test]
  fn day_count_never_decreases_as_days_pass() {
    let start = day(2024, 2, 27);
    let counter = StreakCounter::main(start);
    let mut previous = 0;
    for offset in 0..400 {
      let today = start.checked_add_days(Days::new(offset)).unwrap();
      let count = counter.day_count(today);
      assert!(count >= previous);
      previous = count;
    }
    assert_eq!(previous, 400);
  }

  #[test]
  fn crosses_leap_day_and_year_end() {
    let counter = StreakCounter::main(day(2024, 2, 28));
    assert_eq!(counter.day_count(day(2024, 3, 1)), 3);
    let counter = StreakCounter::main(day(2024, 12, 31));
    assert_eq!(counter.day_count(day(2025, 1, 1)), 2);
  }

  #[test]
  fn reset_to_today_reads_day_one() {
    let today = day(2025, 5, 8);
    let mut counter = StreakCounter::sub_habit("Reading", day(2025, 5, 1));
    let id = counter.id();
    counter.reset_to_today(today);
    assert_eq!(counter.day_count(today), 1);
    assert_eq!(counter.id(), id);
  }

  #[test]
  fn record_keys_follow_title() {
    let today = day(2025, 5, 8);
    assert_eq!(StreakCounter::main(today).record_key(), StoreKey::MainRecord);
    assert_eq!(
      StreakCounter::sub_habit("Reading", today).record_key(),
      StoreKey::SubHabitRecord("Reading".into())
    );
  }
}
