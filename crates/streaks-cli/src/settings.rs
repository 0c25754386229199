//! Runtime settings, read from an optional TOML file and `STREAKS_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

const DEFAULT_STORE_PATH: &str = "~/.local/share/streaks/streaks.db";

/// Shape of the optional config file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite database holding start dates and records. `~` is expanded.
  pub store_path: PathBuf,
  /// Where tracing output goes. Logging is off when unset.
  #[serde(default)]
  pub log_file:   Option<PathBuf>,
}

impl Settings {
  /// Layer defaults, the file at `path` (if it exists), and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("store_path", DEFAULT_STORE_PATH)
      .context("setting defaults")?
      .add_source(config::File::from(expand_tilde(path)).required(false))
      .add_source(config::Environment::with_prefix("STREAKS"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise Settings")
  }
}

pub fn default_config_path() -> PathBuf { PathBuf::from("~/.config/streaks/config.toml") }

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let settings = Settings::load(Path::new("/nonexistent/streaks/config.toml")).unwrap();
    assert_eq!(settings.store_path, PathBuf::from(DEFAULT_STORE_PATH));
    assert!(settings.log_file.is_none());
  }

  #[test]
  fn reads_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "store_path = \"/tmp/habits.db\"\nlog_file = \"/tmp/streaks.log\"\n")
      .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("/tmp/habits.db"));
    assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/streaks.log")));
  }

  #[test]
  fn leaves_absolute_paths_alone() {
    assert_eq!(expand_tilde(Path::new("/var/db")), PathBuf::from("/var/db"));
  }
}
