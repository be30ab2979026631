//! Seed and backfill jobs for the conference registration database.
//!
//! Each job lives in its own module and has a matching binary under
//! `src/bin/`. The jobs share the [`db::Session`] handle, the natural-key
//! [`resolver`] and the CSV helpers in [`source`].

pub mod agenda;
pub mod backfill;
pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod matching;
pub mod repository;
pub mod resolver;
pub mod roster;
pub mod source;

pub use db::Session;
pub use error::{Result, SeedError};
