//! Match types: one bout between two competitors.
//!
//! A match embeds immutable snapshots of both players taken when it was
//! created. Later roster edits never reach an existing match.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::competitor::Competitor;

// ─── Enums ───────────────────────────────────────────────────────────────────

/// How a match came to exist. Fixed at creation.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchType {
  /// Produced by the pairing algorithm.
  #[default]
  Auto,
  /// Declared by an operator.
  Manual,
}

/// Lifecycle state of a match.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchStatus {
  #[default]
  Scheduled,
  Completed,
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The competitor fields frozen into a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
  pub id:       Uuid,
  pub name:     String,
  pub age:      Option<u32>,
  pub master:   Option<String>,
  pub belt:     Option<String>,
  pub weight:   Option<String>,
  pub district: Option<String>,
}

impl From<&Competitor> for PlayerSnapshot {
  fn from(c: &Competitor) -> Self {
    Self {
      id:       c.id,
      name:     c.name.clone(),
      age:      c.age,
      master:   c.master.clone(),
      belt:     c.belt.clone(),
      weight:   c.weight.clone(),
      district: c.district.clone(),
    }
  }
}

// ─── Match ───────────────────────────────────────────────────────────────────

/// A bout between two players. Identity is assigned by the store, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
  pub match_number:  u32,
  pub player1:       PlayerSnapshot,
  pub player2:       PlayerSnapshot,
  pub player1_marks: Option<f64>,
  pub player2_marks: Option<f64>,
  /// Name of the winning player; `None` for a draw or an unplayed match.
  pub winner:        Option<String>,
  pub match_type:    MatchType,
  pub status:        MatchStatus,
}

impl Match {
  /// Build a scheduled `auto` match for a confirmed pair.
  pub fn auto(match_number: u32, p1: &Competitor, p2: &Competitor) -> Self {
    Self {
      match_number,
      player1: PlayerSnapshot::from(p1),
      player2: PlayerSnapshot::from(p2),
      player1_marks: None,
      player2_marks: None,
      winner: None,
      match_type: MatchType::Auto,
      status: MatchStatus::Scheduled,
    }
  }

  pub fn is_completed(&self) -> bool { self.status == MatchStatus::Completed }
}
