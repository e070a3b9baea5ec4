//! The `TournamentStore` trait and supporting query types.
//!
//! Implemented by storage backends (e.g. `dojo-store-sqlite`). The API layer
//! depends on this abstraction, not on any concrete backend. The store owns
//! identity: it assigns competitor and match ids and timestamps.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  competitor::{Competitor, NewCompetitor},
  matches::{Match, MatchStatus, MatchType},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`TournamentStore::list_competitors`].
///
/// Text filters are case-insensitive substring matches. An empty query
/// returns the whole roster in registration order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitorQuery {
  pub name:     Option<String>,
  pub master:   Option<String>,
  pub district: Option<String>,
  pub belt:     Option<String>,
  /// Exact age.
  pub age:      Option<u32>,
  /// Exact weight label, e.g. `"35kg"`.
  pub weight:   Option<String>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

/// Parameters for [`TournamentStore::list_matches`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
  pub status:     Option<MatchStatus>,
  pub match_type: Option<MatchType>,
}

// ─── Stored match ────────────────────────────────────────────────────────────

/// A match together with the identity the store gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMatch {
  pub match_id:   Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(flatten)]
  pub record:     Match,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a tournament store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TournamentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Competitors ───────────────────────────────────────────────────────

  /// Validate and persist one competitor.
  fn add_competitor(
    &self,
    input: NewCompetitor,
  ) -> impl Future<Output = Result<Competitor, Self::Error>> + Send + '_;

  /// Validate and persist many competitors in one transaction. Nothing is
  /// written if any input is invalid.
  fn add_competitors(
    &self,
    inputs: Vec<NewCompetitor>,
  ) -> impl Future<Output = Result<Vec<Competitor>, Self::Error>> + Send + '_;

  /// List competitors matching `query`, in registration order.
  fn list_competitors<'a>(
    &'a self,
    query: &'a CompetitorQuery,
  ) -> impl Future<Output = Result<Vec<Competitor>, Self::Error>> + Send + 'a;

  /// Remove one competitor. Returns `false` if it did not exist. Matches that
  /// already snapshot the competitor are kept.
  fn delete_competitor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove every competitor and return how many were removed.
  fn clear_competitors(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Matches ───────────────────────────────────────────────────────────

  /// One past the highest stored match number, or 1 for an empty store.
  fn next_match_number(
    &self,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// Persist a match and assign it an id.
  fn insert_match(
    &self,
    record: Match,
  ) -> impl Future<Output = Result<StoredMatch, Self::Error>> + Send + '_;

  /// Persist a batch of matches in one transaction.
  fn insert_matches(
    &self,
    records: Vec<Match>,
  ) -> impl Future<Output = Result<Vec<StoredMatch>, Self::Error>> + Send + '_;

  /// Retrieve a match by id. Returns `None` if not found.
  fn get_match(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StoredMatch>, Self::Error>> + Send + '_;

  /// List matches ordered by match number.
  fn list_matches<'a>(
    &'a self,
    query: &'a MatchQuery,
  ) -> impl Future<Output = Result<Vec<StoredMatch>, Self::Error>> + Send + 'a;

  /// Replace the stored record for `id`, typically with the output of
  /// [`declare_result`](crate::lifecycle::declare_result).
  fn update_match(
    &self,
    id: Uuid,
    record: Match,
  ) -> impl Future<Output = Result<StoredMatch, Self::Error>> + Send + '_;

  /// Remove one match. Returns `false` if it did not exist.
  fn delete_match(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove every match and return how many were removed.
  fn clear_matches(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
