//! Mutation planning — the four ring operations as pure functions.
//!
//! Each planner takes a loaded [`RingSnapshot`] and produces a
//! [`MutationPlan`]: the exact set of edge closures, edge inserts, player
//! status flips, and game transition to apply. A storage backend applies a
//! plan in one transaction or not at all; no partial plan is ever written.
//!
//! All candidate edge sets go through [`ring::validate`] before a plan is
//! returned.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::{
  Error, Result,
  assignment::{Assignment, CloseReason},
  group::{GameStatus, Group},
  player::{Player, PlayerStatus},
  ring::{self, RingEdge},
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Everything a planner needs to know about a group's current state: the
/// group row, the full roster, and the open edges.
#[derive(Debug, Clone)]
pub struct RingSnapshot {
  pub group:      Group,
  pub players:    Vec<Player>,
  pub open_edges: Vec<Assignment>,
}

impl RingSnapshot {
  pub fn player(&self, id: Uuid) -> Option<&Player> {
    self.players.iter().find(|p| p.player_id == id)
  }

  /// Ids of players currently holding a ring slot.
  pub fn active_ids(&self) -> BTreeSet<Uuid> {
    self
      .players
      .iter()
      .filter(|p| p.status.is_active())
      .map(|p| p.player_id)
      .collect()
  }

  /// The open edge going out of `assassin`, if any.
  pub fn open_edge_of(&self, assassin: Uuid) -> Option<&Assignment> {
    self
      .open_edges
      .iter()
      .find(|e| e.assassin_id == assassin)
  }

  /// The open edge pointing at `target`, if any.
  pub fn open_edge_at(&self, target: Uuid) -> Option<&Assignment> {
    self.open_edges.iter().find(|e| e.target_id == target)
  }
}

// ─── Plan pieces ─────────────────────────────────────────────────────────────

/// Close one existing edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeClose {
  pub assignment_id: Uuid,
  pub reason:        CloseReason,
  pub replaced_by:   Option<Uuid>,
}

/// Insert one new open edge. The id is allocated at planning time so that
/// closures in the same plan can back-reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedEdge {
  pub assignment_id: Uuid,
  pub assassin_id:   Uuid,
  pub target_id:     Uuid,
  pub dare_text:     String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameTransition {
  Start,
  End,
}

/// The full effect of one mutation, applied atomically by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationPlan {
  pub close:         Vec<EdgeClose>,
  pub insert:        Vec<PlannedEdge>,
  pub player_status: Vec<(Uuid, PlayerStatus)>,
  pub game:          Option<GameTransition>,
}

// ─── Dare policy ─────────────────────────────────────────────────────────────

/// Which dare text a spliced edge carries forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DareCarry {
  /// Take the departing player's outgoing dare.
  InheritOutgoing,
  /// Keep the surviving assassin's own prior dare.
  KeepOwn,
}

/// Configurable dare inheritance for the two splice operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DarePolicy {
  pub on_eliminate: DareCarry,
  pub on_remove:    DareCarry,
}

impl Default for DarePolicy {
  fn default() -> Self {
    Self {
      on_eliminate: DareCarry::InheritOutgoing,
      on_remove:    DareCarry::KeepOwn,
    }
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Receipt for a successful elimination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Elimination {
  pub assassin_id:        Uuid,
  pub victim_id:          Uuid,
  /// The two retired edges: the assassin's and the victim's.
  pub closed_assignments: Vec<Uuid>,
  /// `None` in the terminal case: the assassin is the sole survivor.
  pub new_assignment:     Option<PlannedEdge>,
  pub game_over:          bool,
}

/// Receipt for a successful member removal (no kill credit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Removal {
  pub removed_id:         Uuid,
  pub hunter_id:          Uuid,
  pub closed_assignments: Vec<Uuid>,
  pub new_assignment:     PlannedEdge,
}

// ─── Seed ────────────────────────────────────────────────────────────────────

/// Build a fresh ring over `order`: each player hunts the next, the last
/// wraps to the first. `dare_for` supplies the dare text per target.
///
/// Closes any existing open edges with reason `reseed`, so seeding over a
/// live ring is a full replacement.
pub fn plan_seed(
  snapshot: &RingSnapshot,
  order:    &[Uuid],
  mut dare_for: impl FnMut(&Player) -> String,
) -> Result<MutationPlan> {
  if order.len() < 2 {
    return Err(Error::InsufficientPlayers { have: order.len() });
  }

  let n = order.len();
  let mut edges = Vec::with_capacity(n);
  for i in 0..n {
    let assassin_id = order[i];
    let target_id = order[(i + 1) % n];
    let target = snapshot
      .player(target_id)
      .ok_or(Error::PlayerNotFound(target_id))?;
    edges.push(RingEdge {
      assassin_id,
      target_id,
      dare_text: dare_for(target),
    });
  }

  plan_replace_ring(snapshot, &edges)
}

// ─── Reseed ──────────────────────────────────────────────────────────────────

/// Install an admin-specified ring. The supplied assassin set is
/// authoritative over membership: listed players become active (previously
/// eliminated or removed players may re-enter), unlisted active players are
/// benched.
pub fn plan_reseed(
  snapshot: &RingSnapshot,
  edges:    &[RingEdge],
) -> Result<MutationPlan> {
  if edges.len() < 2 {
    return Err(Error::InsufficientPlayers { have: edges.len() });
  }
  plan_replace_ring(snapshot, edges)
}

/// Shared whole-ring replacement used by seed and reseed.
fn plan_replace_ring(
  snapshot: &RingSnapshot,
  edges:    &[RingEdge],
) -> Result<MutationPlan> {
  for edge in edges {
    for id in [edge.assassin_id, edge.target_id] {
      if snapshot.player(id).is_none() {
        return Err(Error::PlayerNotFound(id));
      }
    }
  }

  let proposed = ring::edge_map(edges)?;
  let active: BTreeSet<Uuid> = proposed.keys().copied().collect();
  ring::validate(&active, &proposed)?;

  let mut plan = MutationPlan::default();

  for open in &snapshot.open_edges {
    plan.close.push(EdgeClose {
      assignment_id: open.assignment_id,
      reason:        CloseReason::Reseed,
      replaced_by:   None,
    });
  }

  for edge in edges {
    plan.insert.push(PlannedEdge {
      assignment_id: Uuid::new_v4(),
      assassin_id:   edge.assassin_id,
      target_id:     edge.target_id,
      dare_text:     edge.dare_text.clone(),
    });
  }

  for player in &snapshot.players {
    let listed = active.contains(&player.player_id);
    match (listed, player.status) {
      (true, s) if !s.is_active() => {
        plan
          .player_status
          .push((player.player_id, PlayerStatus::Active));
      }
      (false, PlayerStatus::Active) => {
        plan
          .player_status
          .push((player.player_id, PlayerStatus::Waiting));
      }
      _ => {}
    }
  }

  if snapshot.group.status != GameStatus::Active {
    plan.game = Some(GameTransition::Start);
  }

  Ok(plan)
}

// ─── Eliminate ───────────────────────────────────────────────────────────────

/// Record a kill: the assassin's current edge and the victim's outgoing edge
/// both retire, the victim leaves the ring, and the assassin splices onto
/// the victim's former target. With only two players left, no new edge is
/// created and the game ends.
pub fn plan_eliminate(
  snapshot:    &RingSnapshot,
  assassin_id: Uuid,
  policy:      &DarePolicy,
) -> Result<(MutationPlan, Elimination)> {
  let edge = snapshot
    .open_edge_of(assassin_id)
    .ok_or(Error::NoActiveAssignment(assassin_id))?;
  let victim_id = edge.target_id;
  let victim_edge = snapshot
    .open_edge_of(victim_id)
    .ok_or(Error::NoActiveAssignment(victim_id))?;
  let next_id = victim_edge.target_id;

  let mut plan = MutationPlan::default();
  plan
    .player_status
    .push((victim_id, PlayerStatus::Eliminated));

  let game_over = next_id == assassin_id;
  let new_assignment = if game_over {
    plan.game = Some(GameTransition::End);
    None
  } else {
    let dare_text = match policy.on_eliminate {
      DareCarry::InheritOutgoing => victim_edge.dare_text.clone(),
      DareCarry::KeepOwn => edge.dare_text.clone(),
    };
    Some(PlannedEdge {
      assignment_id: Uuid::new_v4(),
      assassin_id,
      target_id: next_id,
      dare_text,
    })
  };

  plan.close.push(EdgeClose {
    assignment_id: edge.assignment_id,
    reason:        CloseReason::Eliminated,
    replaced_by:   None,
  });
  plan.close.push(EdgeClose {
    assignment_id: victim_edge.assignment_id,
    reason:        CloseReason::Eliminated,
    replaced_by:   new_assignment.as_ref().map(|e| e.assignment_id),
  });
  if let Some(edge) = &new_assignment {
    plan.insert.push(edge.clone());
  }

  let outcome = Elimination {
    assassin_id,
    victim_id,
    closed_assignments: vec![edge.assignment_id, victim_edge.assignment_id],
    new_assignment,
    game_over,
  };

  Ok((plan, outcome))
}

// ─── Remove member ───────────────────────────────────────────────────────────

/// Splice a player out of the ring without a kill: both adjoining edges
/// close with reason `removed`, the hunter takes over the removed player's
/// former target, and no elimination is recorded.
///
/// A two-player ring cannot be shrunk: a one-node ring is never formed, so
/// the operation fails with `ring_too_small` and writes nothing.
pub fn plan_remove(
  snapshot:   &RingSnapshot,
  removed_id: Uuid,
  policy:     &DarePolicy,
) -> Result<(MutationPlan, Removal)> {
  let removed = snapshot
    .player(removed_id)
    .ok_or(Error::PlayerNotFound(removed_id))?;
  if !removed.status.is_active() {
    return Err(Error::NotActive(removed_id));
  }

  let have = snapshot.active_ids().len();
  if have <= 2 {
    return Err(Error::RingTooSmall { have });
  }

  let hunter_edge = snapshot
    .open_edge_at(removed_id)
    .ok_or(Error::NoActiveAssignment(removed_id))?;
  let removed_edge = snapshot
    .open_edge_of(removed_id)
    .ok_or(Error::NoActiveAssignment(removed_id))?;
  let hunter_id = hunter_edge.assassin_id;
  let next_id = removed_edge.target_id;

  let dare_text = match policy.on_remove {
    DareCarry::InheritOutgoing => removed_edge.dare_text.clone(),
    DareCarry::KeepOwn => hunter_edge.dare_text.clone(),
  };
  let new_assignment = PlannedEdge {
    assignment_id: Uuid::new_v4(),
    assassin_id:   hunter_id,
    target_id:     next_id,
    dare_text,
  };

  let mut plan = MutationPlan::default();
  plan.close.push(EdgeClose {
    assignment_id: hunter_edge.assignment_id,
    reason:        CloseReason::Removed,
    replaced_by:   None,
  });
  plan.close.push(EdgeClose {
    assignment_id: removed_edge.assignment_id,
    reason:        CloseReason::Removed,
    replaced_by:   Some(new_assignment.assignment_id),
  });
  plan.insert.push(new_assignment.clone());
  plan
    .player_status
    .push((removed_id, PlayerStatus::Removed));

  let outcome = Removal {
    removed_id,
    hunter_id,
    closed_assignments: vec![
      hunter_edge.assignment_id,
      removed_edge.assignment_id,
    ],
    new_assignment,
  };

  Ok((plan, outcome))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
