//! Player — roster membership and ring participation for one group.
//!
//! Players are never hard-deleted; eliminations and removals flip status so
//! the assignment ledger stays attributable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ring participation state.
///
/// `Active` is the only state that holds a slot in the live ring. Everything
/// else is "in the group but not in the cycle": `Waiting` covers new joiners,
/// players dropped by a reseed, and everyone before the first seed, so that
/// mid-game joins never violate the ring invariant.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerStatus {
  Waiting,
  Active,
  Eliminated,
  Removed,
}

impl PlayerStatus {
  /// Holds exactly one open assignment and is exactly one open assignment's
  /// target.
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }

  /// Eligible to be drawn into the next seed: `Waiting` or `Active`.
  pub fn in_pool(&self) -> bool { matches!(self, Self::Waiting | Self::Active) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
  pub player_id:        Uuid,
  pub group_id:         Uuid,
  pub display_name:     String,
  pub status:           PlayerStatus,
  /// Set once a real user claims this roster slot; `None` for placeholders
  /// an admin added by name.
  pub owner_profile_id: Option<Uuid>,
  pub created_at:       DateTime<Utc>,
  /// When the player last left the ring (elimination or removal). Kept
  /// through restores; it is part of the narrative record.
  pub deactivated_at:   Option<DateTime<Utc>>,
}
