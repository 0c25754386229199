//! `HabitRegistry` — the main counter, the sub-habit list, and UI state.
//!
//! The registry is the only type a view layer talks to. It reads derived
//! values (day counts, record text) and forwards user intents: expand or
//! collapse a sub-habit, the two-phase reset confirmation, start-date edits,
//! and record resets. Views learn about mutations through [`Change`]
//! notifications rather than polling.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  clock::Clock,
  counter::{CounterRef, StreakCounter},
  record::RecordStore,
  store::{KeyValueStore, StoreKey, read_date},
};

// ─── Seeds ───────────────────────────────────────────────────────────────────

/// A sub-habit created at registry construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubHabitSeed<'a> {
  pub title:    &'a str,
  /// How many days before today the streak started.
  pub days_ago: u64,
}

/// The sub-habits every registry starts with.
pub const DEFAULT_SUB_HABITS: &[SubHabitSeed<'static>] = &[
  SubHabitSeed {
    title:    "Workout",
    days_ago: 3,
  },
  SubHabitSeed {
    title:    "Reading",
    days_ago: 7,
  },
];

// ─── Notifications ───────────────────────────────────────────────────────────

/// A state change a view may want to re-render for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", content = "target", rename_all = "snake_case")]
pub enum Change {
  StartDateChanged(CounterRef),
  RecordChanged(CounterRef),
  /// The currently expanded sub-habit, if any.
  ExpansionChanged(Option<Uuid>),
  /// The counter awaiting reset confirmation, if any.
  PendingResetChanged(Option<CounterRef>),
}

type Observer = Box<dyn FnMut(&Change)>;

// ─── Registry ────────────────────────────────────────────────────────────────

/// Owns every counter plus the expansion and reset-confirmation state.
///
/// Counters are created once at construction and never added or removed.
/// At most one sub-habit is expanded and at most one counter is pending a
/// reset at any time.
pub struct HabitRegistry<S, C> {
  records:       RecordStore<S>,
  clock:         C,
  main:          StreakCounter,
  sub_habits:    Vec<StreakCounter>,
  expanded:      Option<Uuid>,
  pending_reset: Option<CounterRef>,
  observers:     Vec<Observer>,
}

impl<S: KeyValueStore, C: Clock> HabitRegistry<S, C> {
  /// Build a registry seeded with [`DEFAULT_SUB_HABITS`].
  pub fn open(store: S, clock: C) -> Result<Self> {
    Self::with_sub_habits(store, clock, DEFAULT_SUB_HABITS)
  }

  /// Build a registry with an explicit sub-habit list. The main counter's
  /// start date is loaded from the store, falling back to today.
  pub fn with_sub_habits(
    store: S,
    clock: C,
    seeds: &[SubHabitSeed<'_>],
  ) -> Result<Self> {
    let today = clock.today();
    let records = RecordStore::new(store);
    let main_start = read_date(records.inner(), &StoreKey::StartDate)?.unwrap_or(today);

    let sub_habits = seeds
      .iter()
      .map(|seed| {
        let start = today
          .checked_sub_days(Days::new(seed.days_ago))
          .unwrap_or(NaiveDate::MIN);
        StreakCounter::sub_habit(seed.title, start)
      })
      .collect();

    tracing::debug!(%main_start, sub_habits = seeds.len(), "registry opened");

    Ok(Self {
      records,
      clock,
      main: StreakCounter::main(main_start),
      sub_habits,
      expanded: None,
      pending_reset: None,
      observers: Vec::new(),
    })
  }

  /// Register an observer called after every state change.
  pub fn subscribe(&mut self, observer: impl FnMut(&Change) + 'static) {
    self.observers.push(Box::new(observer));
  }

  /// Give back the underlying store.
  pub fn into_store(self) -> S { self.records.into_inner() }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn today(&self) -> NaiveDate { self.clock.today() }

  pub fn main(&self) -> &StreakCounter { &self.main }

  /// Sub-habits in display order.
  pub fn sub_habits(&self) -> &[StreakCounter] { &self.sub_habits }

  pub fn counter(&self, target: CounterRef) -> Result<&StreakCounter> {
    lookup(&self.main, &self.sub_habits, target)
  }

  pub fn day_count(&self, target: CounterRef) -> Result<i64> {
    Ok(self.counter(target)?.day_count(self.today()))
  }

  /// The persisted best streak for `target`; 0 if never recorded.
  pub fn record(&self, target: CounterRef) -> Result<i64> {
    let key = self.counter(target)?.record_key();
    self.records.get_record(&key)
  }

  pub fn record_text(&self, target: CounterRef) -> Result<String> {
    Ok(format!("Record: {} days", self.record(target)?))
  }

  pub fn expanded_id(&self) -> Option<Uuid> { self.expanded }

  pub fn is_expanded(&self, id: Uuid) -> bool { self.expanded == Some(id) }

  pub fn pending_reset(&self) -> Option<CounterRef> { self.pending_reset }

  // ── Expansion ─────────────────────────────────────────────────────────────

  /// Expand `id`, or collapse it if it is already expanded. Expanding one
  /// sub-habit collapses any other.
  pub fn toggle_expanded(&mut self, id: Uuid) -> Result<()> {
    self.counter(CounterRef::SubHabit(id))?;
    self.expanded = if self.expanded == Some(id) { None } else { Some(id) };
    self.emit(Change::ExpansionChanged(self.expanded));
    Ok(())
  }

  // ── Reset confirmation ────────────────────────────────────────────────────

  /// First phase of a reset: remember `target` without touching it.
  /// Replaces any reset already awaiting confirmation.
  pub fn request_reset(&mut self, target: CounterRef) -> Result<()> {
    self.counter(target)?;
    self.pending_reset = Some(target);
    self.emit(Change::PendingResetChanged(self.pending_reset));
    Ok(())
  }

  /// Second phase: restart the pending counter at today and clear the
  /// pending state. Returns the counter that was reset, or `None` if nothing
  /// was pending.
  ///
  /// If the new start date cannot be persisted, nothing changes and the
  /// reset stays pending.
  pub fn confirm_reset(&mut self) -> Result<Option<CounterRef>> {
    let Some(target) = self.pending_reset else {
      return Ok(None);
    };

    let today = self.today();
    self.persist_start_date(target, today)?;
    lookup_mut(&mut self.main, &mut self.sub_habits, target)?.reset_to_today(today);
    tracing::info!(?target, "counter reset to today");

    self.pending_reset = None;
    self.emit(Change::PendingResetChanged(None));
    self.emit(Change::StartDateChanged(target));
    self.refresh_main_record(target)?;
    Ok(Some(target))
  }

  /// Abandon a pending reset. Nothing else changes.
  pub fn cancel_reset(&mut self) {
    if self.pending_reset.take().is_some() {
      self.emit(Change::PendingResetChanged(None));
    }
  }

  // ── Start-date edits ──────────────────────────────────────────────────────

  /// Apply a start date chosen in the UI.
  ///
  /// Editing a sub-habit's date also collapses its detail panel. Dates after
  /// today are accepted; rejecting them is the caller's job. The counter is
  /// only updated once the date has been persisted.
  pub fn on_start_date_changed(
    &mut self,
    target: CounterRef,
    date: NaiveDate,
  ) -> Result<()> {
    self.persist_start_date(target, date)?;
    lookup_mut(&mut self.main, &mut self.sub_habits, target)?.set_start_date(date);
    self.emit(Change::StartDateChanged(target));

    if matches!(target, CounterRef::SubHabit(_)) && self.expanded.take().is_some() {
      self.emit(Change::ExpansionChanged(None));
    }
    self.refresh_main_record(target)
  }

  /// Write the main start date ahead of the in-memory change; sub-habit
  /// start dates live in memory only.
  fn persist_start_date(&mut self, target: CounterRef, date: NaiveDate) -> Result<()> {
    lookup(&self.main, &self.sub_habits, target)?;
    if target == CounterRef::Main {
      self.records.set_start_date(date)?;
    }
    Ok(())
  }

  /// A new main start date may beat the stored record.
  fn refresh_main_record(&mut self, target: CounterRef) -> Result<()> {
    if target == CounterRef::Main {
      self.update_record_if_needed(CounterRef::Main)?;
    }
    Ok(())
  }

  // ── Records ───────────────────────────────────────────────────────────────

  /// Overwrite `target`'s record with its current day count. The start date
  /// is left alone. Returns the new record.
  pub fn reset_record_for(&mut self, target: CounterRef) -> Result<i64> {
    let today = self.today();
    let counter = lookup(&self.main, &self.sub_habits, target)?;
    let record = self.records.reset_record(counter, today)?;
    self.emit(Change::RecordChanged(target));
    Ok(record)
  }

  /// Raise `target`'s record if the live streak beats it. Returns `true`
  /// when a new record was written.
  pub fn update_record_if_needed(&mut self, target: CounterRef) -> Result<bool> {
    let today = self.today();
    let counter = lookup(&self.main, &self.sub_habits, target)?;
    let updated = self.records.update_record_if_needed(counter, today)?;
    if updated {
      self.emit(Change::RecordChanged(target));
    }
    Ok(updated)
  }

  /// The view became visible: give the main counter a chance to set a new
  /// record.
  pub fn on_appear(&mut self) -> Result<bool> {
    self.update_record_if_needed(CounterRef::Main)
  }

  fn emit(&mut self, change: Change) {
    for observer in &mut self.observers {
      observer(&change);
    }
  }
}

fn lookup<'a>(
  main: &'a StreakCounter,
  sub_habits: &'a [StreakCounter],
  target: CounterRef,
) -> Result<&'a StreakCounter> {
  match target {
    CounterRef::Main => Ok(main),
    CounterRef::SubHabit(id) => sub_habits
      .iter()
      .find(|c| c.id() == id)
      .ok_or(Error::UnknownSubHabit(id)),
  }
}

fn lookup_mut<'a>(
  main: &'a mut StreakCounter,
  sub_habits: &'a mut [StreakCounter],
  target: CounterRef,
) -> Result<&'a mut StreakCounter> {
  match target {
    CounterRef::Main => Ok(main),
    CounterRef::SubHabit(id) => sub_habits
      .iter_mut()
      .find(|c| c.id() == id)
      .ok_or(Error::UnknownSubHabit(id)),
  }
}
