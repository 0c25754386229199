//! Core types and trait definitions for the streaks habit tracker.
//!
//! This crate is deliberately free of database and terminal dependencies.
//! Persistence and the notion of "today" are injected through the
//! [`store::KeyValueStore`] and [`clock::Clock`] ports.

pub mod clock;
pub mod counter;
pub mod error;
pub mod record;
pub mod registry;
pub mod store;

pub use error::{Error, Result};
