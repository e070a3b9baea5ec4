//! Cohort building and master-rotation pairing.
//!
//! Competitors are grouped by exact age, then within each age cohort by
//! master. Pairs are formed greedily: the first non-empty master queue (in
//! lexicographic key order) is paired with the next non-empty queue after it,
//! one competitor from the front of each, until fewer than two distinct
//! masters have anyone left. The greedy order is part of the contract; it does
//! not search for a maximum matching.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::competitor::Competitor;

/// Default per-cohort iteration ceiling.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Tuning for [`pair_cohort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingOptions {
  /// Maximum number of pairs formed per cohort before the loop gives up.
  pub max_iterations: usize,
}

impl Default for PairingOptions {
  fn default() -> Self { Self { max_iterations: DEFAULT_MAX_ITERATIONS } }
}

/// Raised when a cohort hits the iteration ceiling while pairs could still be
/// formed. Generation keeps the pairs already formed and carries on with the
/// next cohort.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error(
  "pairing for age {age} stopped at the {ceiling}-iteration ceiling after {pairs_formed} pairs"
)]
#[serde(rename_all = "camelCase")]
pub struct SafetyAbort {
  pub age:          u32,
  pub ceiling:      usize,
  pub pairs_formed: usize,
}

// ─── Cohorts ─────────────────────────────────────────────────────────────────

/// Group `roster` by exact age, ascending. Order within a cohort follows the
/// roster. Competitors without an age are left out.
pub fn build_cohorts(roster: &[Competitor]) -> BTreeMap<u32, Vec<&Competitor>> {
  let mut cohorts: BTreeMap<u32, Vec<&Competitor>> = BTreeMap::new();
  for competitor in roster {
    match competitor.age {
      Some(age) => cohorts.entry(age).or_default().push(competitor),
      None => tracing::debug!(name = %competitor.name, "skipping competitor without age"),
    }
  }
  cohorts
}

// ─── Pairing ─────────────────────────────────────────────────────────────────

/// The result of pairing one cohort.
#[derive(Debug, Clone, Default)]
pub struct CohortPairing<'a> {
  pub pairs:    Vec<(&'a Competitor, &'a Competitor)>,
  /// Members left without a partner, in master-key order.
  pub leftover: Vec<&'a Competitor>,
  pub aborted:  Option<SafetyAbort>,
}

/// Pair one age cohort across distinct masters.
///
/// Every returned pair shares `age` and has two different
/// [`master_key`](Competitor::master_key)s.
pub fn pair_cohort<'a>(
  age: u32,
  cohort: &[&'a Competitor],
  options: &PairingOptions,
) -> CohortPairing<'a> {
  tracing::debug!(age, size = cohort.len(), "pairing cohort");

  if cohort.len() < 2 {
    tracing::debug!(age, "cohort too small to pair");
    return CohortPairing { leftover: cohort.to_vec(), ..CohortPairing::default() };
  }

  let mut by_master: BTreeMap<&str, VecDeque<&'a Competitor>> = BTreeMap::new();
  for &competitor in cohort {
    by_master
      .entry(competitor.master_key())
      .or_default()
      .push_back(competitor);
  }
  // Indexing a sorted vector keeps the scan order explicit.
  let mut queues: Vec<(&str, VecDeque<&'a Competitor>)> = by_master.into_iter().collect();

  let mut pairs = Vec::new();
  let mut aborted = None;

  while let Some((first, second)) = next_pair(&queues) {
    if pairs.len() >= options.max_iterations {
      let abort = SafetyAbort {
        age,
        ceiling: options.max_iterations,
        pairs_formed: pairs.len(),
      };
      tracing::warn!(%abort, "pairing aborted");
      aborted = Some(abort);
      break;
    }

    let (Some(p1), Some(p2)) = (queues[first].1.pop_front(), queues[second].1.pop_front())
    else {
      break;
    };
    let (master1, master2) = (queues[first].0, queues[second].0);
    tracing::trace!(player1 = %p1.name, master1, player2 = %p2.name, master2, "paired");
    pairs.push((p1, p2));
  }

  let leftover: Vec<&Competitor> = queues.into_iter().flat_map(|(_, q)| q).collect();
  tracing::debug!(age, pairs = pairs.len(), leftover = leftover.len(), "cohort paired");

  CohortPairing { pairs, leftover, aborted }
}

/// Indices of the first non-empty queue and the first non-empty queue after
/// it, if both exist.
fn next_pair(queues: &[(&str, VecDeque<&Competitor>)]) -> Option<(usize, usize)> {
  let first = queues.iter().position(|(_, q)| !q.is_empty())?;
  let offset = queues[first + 1..].iter().position(|(_, q)| !q.is_empty())?;
  Some((first, first + 1 + offset))
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  fn competitor(name: &str, age: Option<u32>, master: Option<&str>) -> Competitor {
    Competitor {
      id:         Uuid::new_v4(),
      created_at: Utc::now(),
      name:       name.into(),
      age,
      master:     master.map(str::to_owned),
      belt:       None,
      weight:     None,
      district:   None,
      city:       None,
      email:      None,
    }
  }

  fn names<'a>(pairs: &[(&'a Competitor, &'a Competitor)]) -> Vec<(&'a str, &'a str)> {
    pairs
      .iter()
      .map(|(a, b)| (a.name.as_str(), b.name.as_str()))
      .collect()
  }

  #[test]
  fn cohorts_are_ascending_and_keep_roster_order() {
    let roster = vec![
      competitor("A", Some(14), None),
      competitor("B", Some(9), None),
      competitor("C", None, None),
      competitor("D", Some(14), None),
    ];
    let cohorts = build_cohorts(&roster);

    assert_eq!(cohorts.keys().copied().collect::<Vec<_>>(), vec![9, 14]);
    let fourteen: Vec<&str> = cohorts[&14].iter().map(|c| c.name.as_str()).collect();
    assert_eq!(fourteen, vec!["A", "D"]);
    assert!(cohorts.values().flatten().all(|c| c.name != "C"));
  }

  #[test]
  fn pairs_across_masters_and_leaves_the_rest() {
    let roster = vec![
      competitor("A", Some(12), Some("X")),
      competitor("B", Some(12), Some("Y")),
      competitor("C", Some(12), Some("X")),
    ];
    let cohort: Vec<&Competitor> = roster.iter().collect();
    let result = pair_cohort(12, &cohort, &PairingOptions::default());

    assert_eq!(names(&result.pairs), vec![("A", "B")]);
    assert_eq!(result.leftover.len(), 1);
    assert_eq!(result.leftover[0].name, "C");
    assert!(result.aborted.is_none());
  }

  #[test]
  fn greedy_scan_always_starts_from_the_first_master() {
    // Masters sort as X < Y < Z; X keeps pairing with the next non-empty queue.
    let roster = vec![
      competitor("x1", Some(10), Some("X")),
      competitor("x2", Some(10), Some("X")),
      competitor("y1", Some(10), Some("Y")),
      competitor("z1", Some(10), Some("Z")),
      competitor("z2", Some(10), Some("Z")),
    ];
    let cohort: Vec<&Competitor> = roster.iter().collect();
    let result = pair_cohort(10, &cohort, &PairingOptions::default());

    assert_eq!(names(&result.pairs), vec![("x1", "y1"), ("x2", "z1")]);
    assert_eq!(result.leftover.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["z2"]);
  }

  #[test]
  fn greedy_order_is_not_a_maximum_matching() {
    // A maximum matching would give three pairs; the greedy scan drains X and
    // Y against each other and strands both Z members.
    let roster = vec![
      competitor("x1", Some(8), Some("X")),
      competitor("y1", Some(8), Some("Y")),
      competitor("z1", Some(8), Some("Z")),
      competitor("z2", Some(8), Some("Z")),
      competitor("z3", Some(8), Some("Z")),
      competitor("x2", Some(8), Some("X")),
    ];
    let cohort: Vec<&Competitor> = roster.iter().collect();
    let result = pair_cohort(8, &cohort, &PairingOptions::default());

    assert_eq!(names(&result.pairs), vec![("x1", "y1"), ("x2", "z1")]);
    assert_eq!(result.leftover.len(), 2);
  }

  #[test]
  fn single_master_cohort_yields_nothing() {
    let roster = vec![
      competitor("A", Some(12), Some("X")),
      competitor("B", Some(12), Some("X")),
      competitor("C", Some(12), Some("X")),
    ];
    let cohort: Vec<&Competitor> = roster.iter().collect();
    let result = pair_cohort(12, &cohort, &PairingOptions::default());

    assert!(result.pairs.is_empty());
    assert_eq!(result.leftover.len(), 3);
  }

  #[test]
  fn masterless_competitors_are_not_paired_together() {
    let roster = vec![
      competitor("A", Some(12), None),
      competitor("B", Some(12), Some("")),
    ];
    let cohort: Vec<&Competitor> = roster.iter().collect();
    let result = pair_cohort(12, &cohort, &PairingOptions::default());
    assert!(result.pairs.is_empty());
  }

  #[test]
  fn unknown_master_sorts_among_named_masters() {
    let roster = vec![
      competitor("anon", Some(12), None),
      competitor("zed", Some(12), Some("Zhou")),
      competitor("ann", Some(12), Some("Abe")),
    ];
    let cohort: Vec<&Competitor> = roster.iter().collect();
    let result = pair_cohort(12, &cohort, &PairingOptions::default());

    // Keys sort as "Abe" < "Zhou" < "unknown".
    assert_eq!(names(&result.pairs), vec![("ann", "zed")]);
    assert_eq!(result.leftover[0].name, "anon");
  }

  #[test]
  fn undersized_cohort_is_all_leftover() {
    let roster = vec![competitor("solo", Some(5), Some("X"))];
    let cohort: Vec<&Competitor> = roster.iter().collect();
    let result = pair_cohort(5, &cohort, &PairingOptions::default());
    assert!(result.pairs.is_empty());
    assert_eq!(result.leftover.len(), 1);
  }

  #[test]
  fn iteration_ceiling_keeps_formed_pairs_and_flags_abort() {
    let roster = vec![
      competitor("x1", Some(12), Some("X")),
      competitor("x2", Some(12), Some("X")),
      competitor("y1", Some(12), Some("Y")),
      competitor("y2", Some(12), Some("Y")),
    ];
    let cohort: Vec<&Competitor> = roster.iter().collect();
    let result = pair_cohort(12, &cohort, &PairingOptions { max_iterations: 1 });

    assert_eq!(names(&result.pairs), vec![("x1", "y1")]);
    assert_eq!(result.leftover.len(), 2);
    assert_eq!(
      result.aborted,
      Some(SafetyAbort { age: 12, ceiling: 1, pairs_formed: 1 })
    );
  }

  #[test]
  fn reaching_the_ceiling_exactly_is_not_an_abort() {
    let roster = vec![
      competitor("x1", Some(12), Some("X")),
      competitor("y1", Some(12), Some("Y")),
    ];
    let cohort: Vec<&Competitor> = roster.iter().collect();
    let result = pair_cohort(12, &cohort, &PairingOptions { max_iterations: 1 });

    assert_eq!(result.pairs.len(), 1);
    assert!(result.aborted.is_none());
  }
}
