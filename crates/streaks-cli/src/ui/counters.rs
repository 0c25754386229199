//! Counter panes — the main streak card and the sub-habit list.

use ratatui::{
  Frame,
  layout::{Alignment, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use streaks_core::{clock::Clock, counter::CounterRef, store::KeyValueStore};

use crate::app::{App, Mode};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn cursor_style() -> Style {
  Style::default()
    .bg(Color::Blue)
    .fg(Color::White)
    .add_modifier(Modifier::BOLD)
}

/// The start date, or the date being typed if `target` is under edit.
fn start_date_text<S: KeyValueStore, C: Clock>(app: &App<S, C>, target: CounterRef) -> String {
  match &app.mode {
    Mode::EditDate { target: t, input } if *t == target => format!("{input}_"),
    _ => app
      .registry
      .counter(target)
      .map(|c| c.start_date().format(DATE_FORMAT).to_string())
      .unwrap_or_default(),
  }
}

/// Render the main counter card into `area`.
pub fn draw_main<S: KeyValueStore, C: Clock>(f: &mut Frame, area: Rect, app: &App<S, C>) {
  let focused = app.selected() == CounterRef::Main;
  let block = Block::default()
    .title(" Days Free ")
    .borders(Borders::ALL)
    .border_style(if focused {
      Style::default().fg(Color::Cyan)
    } else {
      Style::default().fg(Color::DarkGray)
    });

  let day_count = app.registry.day_count(CounterRef::Main).unwrap_or(1);
  let record = app
    .registry
    .record_text(CounterRef::Main)
    .unwrap_or_default();

  let lines = vec![
    Line::from(Span::styled(
      format!("Day {day_count}"),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(Span::styled(record, Style::default().fg(Color::Gray))),
    Line::from(vec![
      Span::styled("Start Date: ", Style::default().fg(Color::Gray)),
      Span::raw(start_date_text(app, CounterRef::Main)),
    ]),
  ];

  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

/// Render the sub-habit list into `area`; the expanded item shows its
/// detail lines beneath the summary.
pub fn draw_sub_habits<S: KeyValueStore, C: Clock>(f: &mut Frame, area: Rect, app: &App<S, C>) {
  let block = Block::default()
    .title(" Sub-Habits ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let today = app.registry.today();
  let items: Vec<ListItem> = app
    .registry
    .sub_habits()
    .iter()
    .map(|counter| {
      let target = CounterRef::SubHabit(counter.id());
      let title = counter.title().unwrap_or_default();
      let record = app.registry.record_text(target).unwrap_or_default();

      let mut lines = vec![Line::from(vec![
        Span::styled(format!("{title:<20}"), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("Day {:<6}", counter.day_count(today))),
        Span::styled(record, Style::default().fg(Color::Gray)),
      ])];

      if app.registry.is_expanded(counter.id()) {
        lines.push(Line::from(vec![
          Span::styled("  Start Date: ", Style::default().fg(Color::Gray)),
          Span::raw(start_date_text(app, target)),
        ]));
        lines.push(Line::from(Span::styled(
          "  [r] Reset to Today  [d] Edit start date",
          Style::default().fg(Color::Red),
        )));
      }
      ListItem::new(lines)
    })
    .collect();

  let mut state = ListState::default();
  state.select(app.cursor.checked_sub(1));

  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(cursor_style()),
    area,
    &mut state,
  );
}
