//! Application state machine and key dispatcher.
//!
//! All habit semantics live in [`HabitRegistry`]; this layer only tracks
//! the cursor and text input, and forwards intents.

use std::{cell::RefCell, rc::Rc};

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use streaks_core::{
  clock::Clock,
  counter::{CounterRef, StreakCounter},
  registry::{Change, HabitRegistry},
  store::KeyValueStore,
};

// ─── Mode ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  /// Navigating the counter list.
  Normal,
  /// Typing a new start date for `target`.
  EditDate { target: CounterRef, input: String },
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S, C> {
  pub registry:   HabitRegistry<S, C>,

  /// Row under the cursor: 0 is the main counter, then sub-habits in order.
  pub cursor:     usize,

  pub mode:       Mode,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Changes reported by the registry since the last key press.
  changes:        Rc<RefCell<Vec<Change>>>,
}

impl<S: KeyValueStore, C: Clock> App<S, C> {
  pub fn new(mut registry: HabitRegistry<S, C>) -> Self {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    registry.subscribe(move |change| sink.borrow_mut().push(*change));

    Self {
      registry,
      cursor: 0,
      mode: Mode::Normal,
      status_msg: String::new(),
      changes,
    }
  }

  /// Forward the "became visible" lifecycle event.
  pub fn on_appear(&mut self) -> anyhow::Result<()> {
    self.registry.on_appear()?;
    self.absorb_changes();
    Ok(())
  }

  // ── Selection ─────────────────────────────────────────────────────────────

  pub fn row_count(&self) -> usize { 1 + self.registry.sub_habits().len() }

  /// The counter under the cursor.
  pub fn selected(&self) -> CounterRef {
    match self.cursor.checked_sub(1) {
      None => CounterRef::Main,
      Some(i) => self
        .registry
        .sub_habits()
        .get(i)
        .map_or(CounterRef::Main, |c| CounterRef::SubHabit(c.id())),
    }
  }

  /// Display name for a counter.
  pub fn label(&self, target: CounterRef) -> String {
    self
      .registry
      .counter(target)
      .ok()
      .and_then(StreakCounter::title)
      .unwrap_or("Main counter")
      .to_string()
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    let cont = if self.registry.pending_reset().is_some() {
      self.handle_confirm_key(key)?;
      true
    } else if matches!(self.mode, Mode::EditDate { .. }) {
      self.handle_edit_key(key)?;
      true
    } else {
      self.handle_normal_key(key)?
    };

    self.absorb_changes();
    Ok(cont)
  }

  fn handle_normal_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    self.status_msg.clear();
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.row_count() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Char(' ') => {
        if let CounterRef::SubHabit(id) = self.selected() {
          self.registry.toggle_expanded(id)?;
        }
      }

      KeyCode::Char('r') => self.registry.request_reset(self.selected())?,

      KeyCode::Char('R') => {
        let target = self.selected();
        let record = self.registry.reset_record_for(target)?;
        self.status_msg = format!("{} record set to {record} days", self.label(target));
      }

      KeyCode::Char('d') => {
        let target = self.selected();
        let current = self.registry.counter(target)?.start_date();
        self.mode = Mode::EditDate {
          target,
          input: current.format("%Y-%m-%d").to_string(),
        };
      }

      _ => {}
    }
    Ok(true)
  }

  fn handle_confirm_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
    match key.code {
      KeyCode::Char('y') | KeyCode::Enter => {
        if let Some(target) = self.registry.confirm_reset()? {
          self.status_msg = format!("{} reset to today", self.label(target));
        }
      }
      KeyCode::Char('n') | KeyCode::Esc => self.registry.cancel_reset(),
      _ => {}
    }
    Ok(())
  }

  fn handle_edit_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
    let Mode::EditDate { target, input } = &mut self.mode else {
      return Ok(());
    };
    let target = *target;

    match key.code {
      KeyCode::Esc => self.mode = Mode::Normal,
      KeyCode::Backspace => {
        input.pop();
      }
      KeyCode::Char(c) if (c.is_ascii_digit() || c == '-') && input.len() < 10 => {
        input.push(c);
      }
      KeyCode::Enter => {
        let parsed = NaiveDate::parse_from_str(input, "%Y-%m-%d");
        match parsed {
          Err(_) => self.status_msg = "Enter a date as YYYY-MM-DD".into(),
          Ok(date) if date > self.registry.today() => {
            self.status_msg = "Start date cannot be in the future".into();
          }
          Ok(date) => {
            self.mode = Mode::Normal;
            self.registry.on_start_date_changed(target, date)?;
            self.status_msg = format!("{} now starts {date}", self.label(target));
          }
        }
      }
      _ => {}
    }
    Ok(())
  }

  /// Turn registry notifications into status feedback.
  fn absorb_changes(&mut self) {
    let changes: Vec<Change> = self.changes.borrow_mut().drain(..).collect();
    for change in changes {
      tracing::debug!(?change, "registry change");
      if let Change::RecordChanged(target) = change
        && self.status_msg.is_empty()
      {
        match self.registry.record(target) {
          Ok(days) => {
            self.status_msg = format!("New record for {}: {days} days", self.label(target));
          }
          Err(e) => tracing::warn!(error = %e, ?target, "cannot read new record"),
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Days;
  use crossterm::event::KeyEventKind;
  use streaks_core::{
    clock::FixedClock,
    store::{MemoryStore, StoredValue},
  };

  use super::*;

  /// Reads start failing once anything has been written.
  #[derive(Default)]
  struct ReadOnceStore {
    inner:   MemoryStore,
    written: bool,
  }

  impl KeyValueStore for ReadOnceStore {
    type Error = std::io::Error;

    fn get(&self, key: &str) -> Result<Option<StoredValue>, Self::Error> {
      if self.written {
        return Err(std::io::Error::other("store unreadable"));
      }
      Ok(self.inner.get(key).unwrap())
    }

    fn set(&mut self, key: &str, value: StoredValue) -> Result<(), Self::Error> {
      self.written = true;
      self.inner.set(key, value).unwrap();
      Ok(())
    }
  }

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 5, 8).unwrap() }

  fn app() -> App<MemoryStore, FixedClock> {
    let registry = HabitRegistry::open(MemoryStore::new(), FixedClock::new(today())).unwrap();
    App::new(registry)
  }

  fn press(app: &mut App<MemoryStore, FixedClock>, code: KeyCode) -> bool {
    let mut key = KeyEvent::new(code, KeyModifiers::NONE);
    key.kind = KeyEventKind::Press;
    app.handle_key(key).unwrap()
  }

  fn type_str(app: &mut App<MemoryStore, FixedClock>, s: &str) {
    for c in s.chars() {
      press(app, KeyCode::Char(c));
    }
  }

  #[test]
  fn cursor_stays_in_bounds() {
    let mut app = app();
    press(&mut app, KeyCode::Up);
    assert_eq!(app.selected(), CounterRef::Main);
    for _ in 0..5 {
      press(&mut app, KeyCode::Down);
    }
    assert_eq!(app.cursor, 2);
    assert_eq!(app.label(app.selected()), "Reading");
  }

  #[test]
  fn enter_toggles_sub_habit_panel() {
    let mut app = app();
    press(&mut app, KeyCode::Enter);
    assert!(app.registry.expanded_id().is_none());

    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Enter);
    let CounterRef::SubHabit(id) = app.selected() else { panic!("expected sub-habit") };
    assert!(app.registry.is_expanded(id));
    press(&mut app, KeyCode::Enter);
    assert!(app.registry.expanded_id().is_none());
  }

  #[test]
  fn reset_waits_for_confirmation() {
    let mut app = app();
    press(&mut app, KeyCode::Char('j'));
    let workout = app.selected();

    press(&mut app, KeyCode::Char('r'));
    assert_eq!(app.registry.pending_reset(), Some(workout));
    // Navigation is ignored while the dialog is open.
    press(&mut app, KeyCode::Char('j'));
    assert_eq!(app.selected(), workout);

    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.registry.day_count(workout).unwrap(), 4);

    press(&mut app, KeyCode::Char('r'));
    press(&mut app, KeyCode::Char('y'));
    assert_eq!(app.registry.day_count(workout).unwrap(), 1);
    assert_eq!(app.status_msg, "Workout reset to today");
  }

  #[test]
  fn edit_date_rejects_future_and_garbage() {
    let mut app = app();
    press(&mut app, KeyCode::Char('d'));
    for _ in 0..10 {
      press(&mut app, KeyCode::Backspace);
    }
    type_str(&mut app, "2099-01-01");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.status_msg, "Start date cannot be in the future");
    assert!(matches!(app.mode, Mode::EditDate { .. }));

    for _ in 0..10 {
      press(&mut app, KeyCode::Backspace);
    }
    type_str(&mut app, "2025-13");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.status_msg, "Enter a date as YYYY-MM-DD");

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.registry.main().start_date(), today());
  }

  #[test]
  fn edit_main_date_applies_and_records() {
    let mut app = app();
    press(&mut app, KeyCode::Char('d'));
    for _ in 0..2 {
      press(&mut app, KeyCode::Backspace);
    }
    type_str(&mut app, "01");
    press(&mut app, KeyCode::Enter);

    let start = today().checked_sub_days(Days::new(7)).unwrap();
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.registry.main().start_date(), start);
    assert_eq!(app.registry.record(CounterRef::Main).unwrap(), 8);
  }

  #[test]
  fn record_reset_reports_new_value() {
    let mut app = app();
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char('R'));
    assert_eq!(app.status_msg, "Reading record set to 8 days");
  }

  #[test]
  fn on_appear_announces_first_record() {
    let mut app = app();
    app.on_appear().unwrap();
    assert_eq!(app.status_msg, "New record for Main counter: 1 days");
  }

  #[test]
  fn unreadable_record_shows_no_status() {
    let registry =
      HabitRegistry::open(ReadOnceStore::default(), FixedClock::new(today())).unwrap();
    let mut app = App::new(registry);
    app.on_appear().unwrap();
    assert!(app.registry.record(CounterRef::Main).is_err());
    assert!(app.status_msg.is_empty());
  }

  #[test]
  fn q_quits() {
    let mut app = app();
    assert!(!press(&mut app, KeyCode::Char('q')));
  }
}
