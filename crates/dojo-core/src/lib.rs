//! Core types and algorithms for the Dojo tournament manager.
//!
//! Pairing and the match lifecycle are pure functions over roster snapshots.
//! This crate has no HTTP or database dependencies; storage backends implement
//! [`store::TournamentStore`].

pub mod competitor;
pub mod error;
pub mod lifecycle;
pub mod matches;
pub mod pairing;
pub mod report;
pub mod store;

pub use error::{Error, Result};
pub use report::{GenerationReport, generate_matches};
