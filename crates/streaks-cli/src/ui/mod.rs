//! TUI rendering — orchestrates all panes.

pub mod counters;

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};
use streaks_core::{clock::Clock, store::KeyValueStore};

use crate::app::{App, Mode};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S: KeyValueStore, C: Clock>(f: &mut Frame, app: &App<S, C>) {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(6), // main counter
      Constraint::Min(0),    // sub-habits
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  counters::draw_main(f, rows[1], app);
  counters::draw_sub_habits(f, rows[2], app);
  draw_status(f, rows[3], app);

  if let Some(target) = app.registry.pending_reset() {
    draw_confirm(f, area, &app.label(target));
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<S: KeyValueStore, C: Clock>(f: &mut Frame, area: Rect, app: &App<S, C>) {
  let date = app.registry.today().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " streaks",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S: KeyValueStore, C: Clock>(f: &mut Frame, area: Rect, app: &App<S, C>) {
  let (mode_label, hints) = match &app.mode {
    _ if app.registry.pending_reset().is_some() => ("CONFIRM", "y reset  n cancel"),
    Mode::Normal => (
      "NORMAL",
      "↑↓/jk move  Enter expand  r reset  d start date  R reset record  q quit",
    ),
    Mode::EditDate { .. } => ("DATE", "YYYY-MM-DD  Enter apply  Esc cancel"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::Gray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Confirmation dialog ─────────────────────────────────────────────────────

fn draw_confirm(f: &mut Frame, area: Rect, label: &str) {
  let [row] = Layout::vertical([Constraint::Length(5)])
    .flex(Flex::Center)
    .areas(area);
  let [popup] = Layout::horizontal([Constraint::Length(40)])
    .flex(Flex::Center)
    .areas(row);

  let block = Block::default()
    .title(format!(" Reset {label}? "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  let inner = block.inner(popup);

  f.render_widget(Clear, popup);
  f.render_widget(block, popup);
  f.render_widget(
    Paragraph::new(vec![
      Line::from("The streak restarts at day 1."),
      Line::from(vec![
        Span::styled("[y] Reset", Style::default().fg(Color::Red)),
        Span::raw("   "),
        Span::styled("[n] Cancel", Style::default().fg(Color::Gray)),
      ]),
    ]),
    inner,
  );
}
