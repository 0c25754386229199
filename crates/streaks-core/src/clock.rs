//! The `Clock` port: where "today" comes from.

use std::{cell::Cell, rc::Rc};

use chrono::{Days, Local, NaiveDate};

/// Source of the current local calendar day.
pub trait Clock {
  fn today(&self) -> NaiveDate;
}

/// Reads the wall clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate { Local::now().date_naive() }
}

/// A settable clock for tests. Clones share the same underlying day, so a
/// test can keep a handle after moving one into a registry.
#[derive(Debug, Clone)]
pub struct FixedClock {
  today: Rc<Cell<NaiveDate>>,
}

impl FixedClock {
  pub fn new(today: NaiveDate) -> Self {
    Self {
      today: Rc::new(Cell::new(today)),
    }
  }

  pub fn set(&self, today: NaiveDate) { self.today.set(today); }

  /// Move the clock forward by `days` calendar days.
  pub fn advance_days(&self, days: u64) {
    let next = self
      .today
      .get()
      .checked_add_days(Days::new(days))
      .unwrap_or(NaiveDate::MAX);
    self.today.set(next);
  }
}

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate { self.today.get() }
}

impl<C: Clock + ?Sized> Clock for &C {
  fn today(&self) -> NaiveDate { (**self).today() }
}
