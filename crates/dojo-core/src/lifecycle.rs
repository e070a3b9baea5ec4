//! Match lifecycle: `scheduled` → `completed`.
//!
//! Results are applied by producing a new [`Match`] value; the input is never
//! touched, so a rejected declaration leaves the caller's copy as it was.
//! Declaring a result on a match that is already completed overwrites the
//! previous result.

use serde_json::Value;

use crate::{
  Error, Result,
  matches::{Match, MatchStatus, MatchType, PlayerSnapshot},
};

const INVALID_MARKS: &str = "missing or non-numeric marks";

/// Parse a mark supplied over the wire: a finite JSON number, or a string
/// holding one.
pub fn parse_marks(value: &Value) -> Result<f64> {
  let marks = match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  marks
    .filter(|m| m.is_finite())
    .ok_or_else(|| Error::validation(INVALID_MARKS))
}

fn require_marks(marks: Option<f64>) -> Result<f64> {
  marks
    .filter(|m| m.is_finite())
    .ok_or_else(|| Error::validation(INVALID_MARKS))
}

/// Pick the winner's name: an explicit, non-blank winner wins outright (manual
/// override), otherwise the strictly higher mark. Equal marks are a draw.
pub fn resolve_winner(
  player1: &PlayerSnapshot,
  player2: &PlayerSnapshot,
  player1_marks: f64,
  player2_marks: f64,
  explicit: Option<String>,
) -> Option<String> {
  if let Some(name) = explicit.filter(|w| !w.trim().is_empty()) {
    return Some(name);
  }
  if player1_marks > player2_marks {
    Some(player1.name.clone())
  } else if player2_marks > player1_marks {
    Some(player2.name.clone())
  } else {
    None
  }
}

/// Complete `current` with the given marks.
///
/// Both marks must be present and finite. A non-blank `winner` is stored
/// verbatim; a blank one falls back to the marks. `match_type` and the player
/// snapshots carry over unchanged.
pub fn declare_result(
  current: &Match,
  player1_marks: Option<f64>,
  player2_marks: Option<f64>,
  winner: Option<String>,
) -> Result<Match> {
  let p1 = require_marks(player1_marks)?;
  let p2 = require_marks(player2_marks)?;
  let winner = resolve_winner(&current.player1, &current.player2, p1, p2, winner);

  if current.is_completed() {
    tracing::debug!(match_number = current.match_number, "overwriting completed result");
  }

  Ok(Match {
    player1_marks: Some(p1),
    player2_marks: Some(p2),
    winner,
    status: MatchStatus::Completed,
    ..current.clone()
  })
}

/// Build an operator-declared match that is completed on creation.
pub fn create_manual_match(
  match_number: u32,
  player1: PlayerSnapshot,
  player2: PlayerSnapshot,
  player1_marks: Option<f64>,
  player2_marks: Option<f64>,
  winner: Option<String>,
) -> Result<Match> {
  if player1.name.trim().is_empty() || player2.name.trim().is_empty() {
    return Err(Error::validation("missing name"));
  }
  let p1 = require_marks(player1_marks)?;
  let p2 = require_marks(player2_marks)?;
  let winner = resolve_winner(&player1, &player2, p1, p2, winner);

  Ok(Match {
    match_number,
    player1,
    player2,
    player1_marks: Some(p1),
    player2_marks: Some(p2),
    winner,
    match_type: MatchType::Manual,
    status: MatchStatus::Completed,
  })
}
