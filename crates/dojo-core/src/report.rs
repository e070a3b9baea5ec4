//! Match generation over a whole roster, and the report it produces.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  competitor::Competitor,
  matches::Match,
  pairing::{PairingOptions, SafetyAbort, build_cohorts, pair_cohort},
};

/// Outcome of one generation run.
///
/// `matched + unmatched == total` always holds. `unmatched` does not say why a
/// competitor was left out (no age, or no partner from a different master).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
  pub matches:   Vec<Match>,
  pub total:     usize,
  pub matched:   usize,
  pub unmatched: usize,
  /// Cohorts cut short by the iteration ceiling.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub aborted:   Vec<SafetyAbort>,
}

impl GenerationReport {
  pub fn new(total: usize, matches: Vec<Match>, aborted: Vec<SafetyAbort>) -> Self {
    let matched = matches.len() * 2;
    Self {
      matches,
      total,
      matched,
      unmatched: total.saturating_sub(matched),
      aborted,
    }
  }
}

/// Pair `roster` by age and master and number the matches consecutively from
/// `first_match_number`.
///
/// Deterministic for a given roster order. Fails when the roster has fewer
/// than two competitors, any competitor has a blank name, or the numbering
/// would run past `u32::MAX`.
pub fn generate_matches(
  roster: &[Competitor],
  first_match_number: u32,
  options: &PairingOptions,
) -> Result<GenerationReport> {
  if roster.len() < 2 {
    return Err(Error::InsufficientRoster { found: roster.len() });
  }
  if let Some(nameless) = roster.iter().find(|c| c.name.trim().is_empty()) {
    return Err(Error::Validation(format!("competitor {} is missing a name", nameless.id)));
  }

  let mut matches = Vec::new();
  let mut aborted = Vec::new();
  let mut next_number = Some(first_match_number);

  for (age, cohort) in build_cohorts(roster) {
    let pairing = pair_cohort(age, &cohort, options);
    for (p1, p2) in pairing.pairs {
      let number = next_number.ok_or(Error::MatchNumbersExhausted)?;
      matches.push(Match::auto(number, p1, p2));
      next_number = number.checked_add(1);
    }
    aborted.extend(pairing.aborted);
  }

  let report = GenerationReport::new(roster.len(), matches, aborted);
  tracing::info!(
    total = report.total,
    matches = report.matches.len(),
    matched = report.matched,
    unmatched = report.unmatched,
    "generated matches",
  );
  Ok(report)
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::matches::{MatchStatus, MatchType};

  fn competitor(name: &str, age: Option<u32>, master: Option<&str>) -> Competitor {
    Competitor {
      id:         Uuid::new_v4(),
      created_at: Utc::now(),
      name:       name.into(),
      age,
      master:     master.map(str::to_owned),
      belt:       Some("white".into()),
      weight:     None,
      district:   None,
      city:       None,
      email:      None,
    }
  }

  fn pair_names(report: &GenerationReport) -> Vec<(String, String)> {
    report
      .matches
      .iter()
      .map(|m| (m.player1.name.clone(), m.player2.name.clone()))
      .collect()
  }

  fn mixed_roster() -> Vec<Competitor> {
    vec![
      competitor("A", Some(12), Some("X")),
      competitor("B", Some(10), Some("Y")),
      competitor("C", Some(12), Some("Y")),
      competitor("D", None, Some("Z")),
      competitor("E", Some(10), Some("X")),
      competitor("F", Some(12), Some("Z")),
      competitor("G", Some(10), None),
      competitor("H", Some(12), Some("X")),
    ]
  }

  #[test]
  fn one_pair_and_one_leftover() {
    let roster = vec![
      competitor("A", Some(12), Some("X")),
      competitor("B", Some(12), Some("Y")),
      competitor("C", Some(12), Some("X")),
    ];
    let report = generate_matches(&roster, 1, &PairingOptions::default()).unwrap();

    assert_eq!(pair_names(&report), vec![("A".into(), "B".into())]);
    assert_eq!((report.total, report.matched, report.unmatched), (3, 2, 1));
  }

  #[test]
  fn different_ages_never_pair() {
    let roster = vec![
      competitor("A", Some(12), Some("X")),
      competitor("B", Some(14), Some("Y")),
    ];
    let report = generate_matches(&roster, 1, &PairingOptions::default()).unwrap();

    assert!(report.matches.is_empty());
    assert_eq!(report.unmatched, 2);
  }

  #[test]
  fn cohorts_are_processed_in_ascending_age_and_numbered_consecutively() {
    let report = generate_matches(&mixed_roster(), 5, &PairingOptions::default()).unwrap();

    // Age 10: masters X(E), Y(B), unknown(G) -> E vs B, G left over.
    // Age 12: masters X(A,H), Y(C), Z(F) -> A vs C, H vs F.
    assert_eq!(
      pair_names(&report),
      vec![
        ("E".into(), "B".into()),
        ("A".into(), "C".into()),
        ("H".into(), "F".into()),
      ]
    );
    let numbers: Vec<u32> = report.matches.iter().map(|m| m.match_number).collect();
    assert_eq!(numbers, vec![5, 6, 7]);
    assert_eq!((report.total, report.matched, report.unmatched), (8, 6, 2));
  }

  #[test]
  fn every_match_is_a_strict_match() {
    let roster = mixed_roster();
    let report = generate_matches(&roster, 1, &PairingOptions::default()).unwrap();

    for m in &report.matches {
      assert_eq!(m.player1.age, m.player2.age);
      assert!(m.player1.age.is_some());
      let key = |master: &Option<String>| master.clone().unwrap_or_else(|| "unknown".into());
      assert_ne!(key(&m.player1.master), key(&m.player2.master));
      assert_eq!(m.match_type, MatchType::Auto);
      assert_eq!(m.status, MatchStatus::Scheduled);
    }
    assert!(
      report
        .matches
        .iter()
        .all(|m| m.player1.name != "D" && m.player2.name != "D")
    );
    assert_eq!(report.matched + report.unmatched, report.total);
  }

  #[test]
  fn generation_is_deterministic() {
    let roster = mixed_roster();
    let first = generate_matches(&roster, 1, &PairingOptions::default()).unwrap();
    let second = generate_matches(&roster, 1, &PairingOptions::default()).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn rejects_rosters_below_two() {
    let roster = vec![competitor("A", Some(12), Some("X"))];
    let err = generate_matches(&roster, 1, &PairingOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InsufficientRoster { found: 1 }));
  }

  #[test]
  fn rejects_nameless_competitors() {
    let roster = vec![
      competitor("A", Some(12), Some("X")),
      competitor(" ", Some(12), Some("Y")),
    ];
    let err = generate_matches(&roster, 1, &PairingOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[test]
  fn numbering_stops_at_the_highest_match_number() {
    let roster = vec![
      competitor("a", Some(9), Some("X")),
      competitor("b", Some(9), Some("Y")),
      competitor("c", Some(11), Some("X")),
      competitor("d", Some(11), Some("Y")),
    ];
    let err = generate_matches(&roster, u32::MAX, &PairingOptions::default()).unwrap_err();
    assert!(matches!(err, Error::MatchNumbersExhausted));

    let report = generate_matches(&roster[..2], u32::MAX, &PairingOptions::default()).unwrap();
    assert_eq!(report.matches[0].match_number, u32::MAX);
  }

  #[test]
  fn aborted_cohorts_are_reported_and_later_cohorts_still_run() {
    let roster = vec![
      competitor("a", Some(9), Some("X")),
      competitor("b", Some(9), Some("Y")),
      competitor("c", Some(9), Some("X")),
      competitor("d", Some(9), Some("Y")),
      competitor("e", Some(11), Some("X")),
      competitor("f", Some(11), Some("Y")),
    ];
    let report = generate_matches(&roster, 1, &PairingOptions { max_iterations: 1 }).unwrap();

    assert_eq!(
      pair_names(&report),
      vec![("a".into(), "b".into()), ("e".into(), "f".into())]
    );
    assert_eq!(report.aborted.len(), 1);
    assert_eq!(report.aborted[0].age, 9);
    assert_eq!(report.unmatched, 2);
  }
}
