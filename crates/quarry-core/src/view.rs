//! Computed read models — never stored, always derived.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  assignment::Assignment,
  group::{GameStatus, Group},
  player::{Player, PlayerStatus},
};

/// What a player sees when they ask "who am I hunting?".
///
/// `Champion` (sole survivor of an ended game) is deliberately distinct from
/// `Waiting` (no assignment yet) so clients can render "you won" instead of
/// an empty screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AssignmentView {
  Hunting {
    assignment_id: Uuid,
    target_id:     Uuid,
    target_name:   String,
    dare_text:     String,
  },
  Champion,
  /// Eliminated or removed; out of the current round.
  Out,
  /// In the group but holding no assignment (pre-game, mid-game joiner, or
  /// benched by a reseed).
  Waiting,
}

/// Derive the view from the player's status, the group state, and the
/// player's open edge (paired with the target's display name) if any.
pub fn assignment_view(
  group:  &Group,
  player: &Player,
  edge:   Option<(&Assignment, &str)>,
) -> AssignmentView {
  if let Some((edge, target_name)) = edge {
    return AssignmentView::Hunting {
      assignment_id: edge.assignment_id,
      target_id:     edge.target_id,
      target_name:   target_name.to_string(),
      dare_text:     edge.dare_text.clone(),
    };
  }
  match player.status {
    PlayerStatus::Active if group.status == GameStatus::Ended => {
      AssignmentView::Champion
    }
    PlayerStatus::Eliminated | PlayerStatus::Removed => AssignmentView::Out,
    _ => AssignmentView::Waiting,
  }
}

/// An open edge decorated with display names, for admin screens and for
/// keying assassin↔target chat threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEdge {
  pub assignment_id: Uuid,
  pub assassin_id:   Uuid,
  pub assassin_name: String,
  pub target_id:     Uuid,
  pub target_name:   String,
  pub dare_text:     String,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
