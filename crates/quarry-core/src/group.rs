//! Group — the aggregate that owns a player roster and an assignment ledger.
//!
//! Rings never span groups. All ring state for a group is derived from its
//! own players and assignments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a group's game currently stands.
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
pub enum GameStatus {
  /// No ring has been seeded yet; players are gathering.
  Lobby,
  /// A live ring exists.
  Active,
  /// A sole survivor remains. A reseed starts a fresh round.
  Ended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
  pub group_id:   Uuid,
  pub name:       String,
  pub status:     GameStatus,
  pub created_at: DateTime<Utc>,
  pub started_at: Option<DateTime<Utc>>,
  pub ended_at:   Option<DateTime<Utc>>,
}
