//! Error type for `streaks-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("unknown value kind: {0:?}")]
  UnknownValueKind(String),

  #[error("cannot decode value for {key:?}: {message}")]
  Decode { key: String, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
