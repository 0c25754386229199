//! SQLite backend for the streaks key-value store.
//!
//! A single `kv` table holds every persisted scalar. Access is synchronous;
//! the habit tracker never has more than one caller.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
