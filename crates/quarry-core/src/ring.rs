//! Ring validation — the single source of truth for "is this a legal ring".
//!
//! [`validate`] is pure and side-effect free. Every mutation runs its
//! candidate edge set through it before anything is written, and the
//! integrity audit runs the same function over stored state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::assignment::Assignment;

// ─── Edge input ──────────────────────────────────────────────────────────────

/// One proposed edge of a candidate ring. Replaces the parallel
/// assassins/targets/dares arrays of ad-hoc payloads so the three fields can
/// never fall out of alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingEdge {
  pub assassin_id: Uuid,
  pub target_id:   Uuid,
  pub dare_text:   String,
}

// ─── Violations ──────────────────────────────────────────────────────────────

/// A reason a candidate edge set is not a single spanning cycle.
///
/// `Display` is the message shown verbatim to admins; [`reason_code`] is the
/// stable machine-readable code.
///
/// [`reason_code`]: RingViolation::reason_code
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RingViolation {
  #[error("each assassin must have a target: {player} has none")]
  MissingTarget { player: Uuid },

  #[error("no one can target themselves: {player}")]
  SelfTarget { player: Uuid },

  #[error("a player may hold only one assignment: {player} has several")]
  DuplicateAssassin { player: Uuid },

  #[error("targets must be unique: {target} is hunted more than once")]
  DuplicateTarget { target: Uuid },

  #[error("targets must be chosen among active players only: {target}")]
  TargetOutsideSet { target: Uuid },

  #[error(
    "ring must be a single cycle including all active players: a loop closed \
     after {visited} of {expected}"
  )]
  FragmentedRing { visited: usize, expected: usize },
}

impl RingViolation {
  pub fn reason_code(&self) -> &'static str {
    match self {
      Self::MissingTarget { .. } => "missing_target",
      Self::SelfTarget { .. } => "self_target",
      Self::DuplicateAssassin { .. } => "duplicate_assassin",
      Self::DuplicateTarget { .. } => "duplicate_target",
      Self::TargetOutsideSet { .. } => "target_outside_set",
      Self::FragmentedRing { .. } => "fragmented_ring",
    }
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Check that `proposed` is exactly one cycle spanning exactly `active`.
///
/// Checks run in a fixed order and each failure carries a distinct reason:
/// missing target, self-target, duplicate target, target outside the active
/// set, then fragmentation (a loop that closes before covering everyone).
pub fn validate(
  active:   &BTreeSet<Uuid>,
  proposed: &BTreeMap<Uuid, Uuid>,
) -> Result<(), RingViolation> {
  for player in active {
    if !proposed.contains_key(player) {
      return Err(RingViolation::MissingTarget { player: *player });
    }
  }

  for (assassin, target) in proposed {
    if assassin == target {
      return Err(RingViolation::SelfTarget { player: *assassin });
    }
  }

  let mut seen = BTreeSet::new();
  for target in proposed.values() {
    if !seen.insert(*target) {
      return Err(RingViolation::DuplicateTarget { target: *target });
    }
  }

  for (assassin, target) in proposed {
    if !active.contains(assassin) {
      // An edge from outside the set makes the target cardinality exceed
      // the active count.
      return Err(RingViolation::DuplicateTarget { target: *target });
    }
    if !active.contains(target) {
      return Err(RingViolation::TargetOutsideSet { target: *target });
    }
  }

  // Walk the cycle: from any start, following targets must visit every
  // active player exactly once and come back after exactly N steps.
  let expected = active.len();
  let Some(start) = active.iter().next().copied() else {
    return Ok(());
  };

  let mut visited = BTreeSet::new();
  let mut current = start;
  for _ in 0..expected {
    if !visited.insert(current) {
      break;
    }
    match proposed.get(&current) {
      Some(next) => current = *next,
      None => {
        return Err(RingViolation::MissingTarget { player: current });
      }
    }
  }

  if visited.len() != expected || current != start {
    return Err(RingViolation::FragmentedRing {
      visited: visited.len(),
      expected,
    });
  }

  Ok(())
}

/// Build a candidate map from explicit edges, rejecting an assassin that
/// appears twice.
pub fn edge_map(
  edges: &[RingEdge],
) -> Result<BTreeMap<Uuid, Uuid>, RingViolation> {
  let mut map = BTreeMap::new();
  for edge in edges {
    if map.insert(edge.assassin_id, edge.target_id).is_some() {
      return Err(RingViolation::DuplicateAssassin {
        player: edge.assassin_id,
      });
    }
  }
  Ok(map)
}

// ─── Audit ───────────────────────────────────────────────────────────────────

/// The result of re-deriving ring validity from stored rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingAudit {
  pub valid:     bool,
  pub players:   usize,
  pub edges:     usize,
  pub violation: Option<RingViolation>,
}

/// Re-derive "is the stored active edge set a perfect ring" from scratch.
///
/// A group with no open edges and at most one active player audits valid:
/// that is a lobby (nobody active) or an ended game (the champion stays
/// active with no assignment). Any other mismatch between the two sets does
/// not.
pub fn audit(active: &BTreeSet<Uuid>, open_edges: &[Assignment]) -> RingAudit {
  let players = active.len();
  let edges = open_edges.len();

  if edges == 0 && players <= 1 {
    return RingAudit { valid: true, players, edges, violation: None };
  }

  let mut proposed = BTreeMap::new();
  for edge in open_edges {
    if proposed.insert(edge.assassin_id, edge.target_id).is_some() {
      return RingAudit {
        valid: false,
        players,
        edges,
        violation: Some(RingViolation::DuplicateAssassin {
          player: edge.assassin_id,
        }),
      };
    }
  }

  match validate(active, &proposed) {
    Ok(()) => RingAudit { valid: true, players, edges, violation: None },
    Err(v) => {
      RingAudit { valid: false, players, edges, violation: Some(v) }
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(n: usize) -> Vec<Uuid> {
    (0..n).map(|_| Uuid::new_v4()).collect()
  }

  fn cycle(order: &[Uuid]) -> BTreeMap<Uuid, Uuid> {
    let n = order.len();
    (0..n).map(|i| (order[i], order[(i + 1) % n])).collect()
  }

  #[test]
  fn accepts_simple_cycle() {
    let players = ids(4);
    let active: BTreeSet<_> = players.iter().copied().collect();
    assert_eq!(validate(&active, &cycle(&players)), Ok(()));
  }

  #[test]
  fn accepts_two_player_cycle() {
    let players = ids(2);
    let active: BTreeSet<_> = players.iter().copied().collect();
    assert_eq!(validate(&active, &cycle(&players)), Ok(()));
  }

  #[test]
  fn rejects_missing_target() {
    let players = ids(3);
    let active: BTreeSet<_> = players.iter().copied().collect();
    let mut proposed = cycle(&players);
    proposed.remove(&players[1]);

    assert_eq!(
      validate(&active, &proposed),
      Err(RingViolation::MissingTarget { player: players[1] })
    );
  }

  #[test]
  fn rejects_self_target() {
    let players = ids(3);
    let active: BTreeSet<_> = players.iter().copied().collect();
    let mut proposed = cycle(&players);
    proposed.insert(players[1], players[1]);

    assert_eq!(
      validate(&active, &proposed),
      Err(RingViolation::SelfTarget { player: players[1] })
    );
  }

  #[test]
  fn rejects_duplicate_target() {
    let players = ids(3);
    let active: BTreeSet<_> = players.iter().copied().collect();
    // Two assassins both hunt players[2].
    let mut proposed = BTreeMap::new();
    proposed.insert(players[0], players[2]);
    proposed.insert(players[1], players[2]);
    proposed.insert(players[2], players[0]);

    assert_eq!(
      validate(&active, &proposed),
      Err(RingViolation::DuplicateTarget { target: players[2] })
    );
  }

  #[test]
  fn rejects_target_outside_set() {
    let players = ids(3);
    let outsider = Uuid::new_v4();
    let active: BTreeSet<_> = players.iter().copied().collect();
    let mut proposed = cycle(&players);
    proposed.insert(players[2], outsider);

    assert_eq!(
      validate(&active, &proposed),
      Err(RingViolation::TargetOutsideSet { target: outsider })
    );
  }

  #[test]
  fn rejects_two_disjoint_two_cycles() {
    // A permutation, but two separate loops over 4 players.
    let p = ids(4);
    let active: BTreeSet<_> = p.iter().copied().collect();
    let mut proposed = BTreeMap::new();
    proposed.insert(p[0], p[1]);
    proposed.insert(p[1], p[0]);
    proposed.insert(p[2], p[3]);
    proposed.insert(p[3], p[2]);

    assert_eq!(
      validate(&active, &proposed),
      Err(RingViolation::FragmentedRing { visited: 2, expected: 4 })
    );
  }

  #[test]
  fn edge_map_rejects_repeated_assassin() {
    let p = ids(3);
    let edges = vec![
      RingEdge { assassin_id: p[0], target_id: p[1], dare_text: "a".into() },
      RingEdge { assassin_id: p[0], target_id: p[2], dare_text: "b".into() },
    ];

    assert_eq!(
      edge_map(&edges),
      Err(RingViolation::DuplicateAssassin { player: p[0] })
    );
  }

  #[test]
  fn audit_passes_empty_group() {
    let report = audit(&BTreeSet::new(), &[]);
    assert!(report.valid);
    assert_eq!(report.players, 0);
  }

  #[test]
  fn audit_passes_sole_survivor_with_no_edges() {
    let champion: BTreeSet<_> = ids(1).into_iter().collect();
    let report = audit(&champion, &[]);
    assert!(report.valid);
    assert_eq!(report.players, 1);
  }

  #[test]
  fn audit_flags_active_player_without_edge() {
    let p = ids(3);
    let active: BTreeSet<_> = p.iter().copied().collect();
    let report = audit(&active, &[]);
    assert!(!report.valid);
    assert!(matches!(
      report.violation,
      Some(RingViolation::MissingTarget { .. })
    ));
  }
}
