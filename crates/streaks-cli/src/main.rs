//! `streaks` — terminal UI for the streaks habit tracker.
//!
//! # Usage
//!
//! ```
//! streaks
//! streaks --store ~/habits.db
//! streaks --config ~/.config/streaks/config.toml --in-memory
//! ```

mod app;
mod settings;
mod ui;

use std::{fs::OpenOptions, io, sync::Mutex, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{Settings, expand_tilde};
use streaks_core::{
  clock::{Clock, SystemClock},
  registry::HabitRegistry,
  store::{KeyValueStore, MemoryStore},
};
use streaks_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "streaks", version, about = "Track habit streaks in the terminal")]
struct Args {
  /// Path to a TOML config file (store_path, log_file).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// SQLite database file; overrides `store_path` from the config.
  #[arg(long, value_name = "FILE", env = "STREAKS_STORE")]
  store: Option<std::path::PathBuf>,

  /// Keep everything in memory; nothing is written to disk.
  #[arg(long, conflicts_with = "store")]
  in_memory: bool,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  let args = Args::parse();

  let config_path = args
    .config
    .clone()
    .unwrap_or_else(settings::default_config_path);
  let settings = Settings::load(&config_path)?;

  init_tracing(&settings)?;

  if args.in_memory {
    tracing::info!("running with an in-memory store");
    return run(MemoryStore::new(), SystemClock);
  }

  let store_path = expand_tilde(args.store.as_ref().unwrap_or(&settings.store_path));
  if let Some(parent) = store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating data directory {}", parent.display()))?;
  }
  let store = SqliteStore::open(&store_path)
    .with_context(|| format!("failed to open store at {}", store_path.display()))?;
  tracing::info!(path = %store_path.display(), "store opened");

  run(store, SystemClock)
}

/// Log to `log_file` when one is configured. The terminal belongs to the UI,
/// so there is no console output.
fn init_tracing(settings: &Settings) -> Result<()> {
  let Some(log_file) = &settings.log_file else {
    return Ok(());
  };
  let log_file = expand_tilde(log_file);
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(&log_file)
    .with_context(|| format!("opening log file {}", log_file.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

fn run<S, C>(store: S, clock: C) -> Result<()>
where
  S: KeyValueStore,
  C: Clock,
{
  let registry = HabitRegistry::open(store, clock).context("loading habits")?;
  let mut app = App::new(registry);
  app.on_appear()?;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app);

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  if let Err(e) = &run_result {
    tracing::error!(error = %e, "event loop failed");
  }
  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

fn run_event_loop<S: KeyValueStore, C: Clock>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<S, C>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    if !event::poll(Duration::from_millis(250)).context("polling events")? {
      continue;
    }
    match event::read().context("reading event")? {
      Event::Key(key) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key)? {
          break;
        }
      }
      // Terminal will redraw on next iteration.
      _ => {}
    }
  }

  Ok(())
}
