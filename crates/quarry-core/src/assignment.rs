//! Assignment — a directed edge in the ring, and the unit of the ledger.
//!
//! Assignments are append-mostly: once created, the only field that changes
//! on an open edge is `dare_text`. Superseded edges are closed exactly once
//! with a reason and kept forever as history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why an edge left the active ring.
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
pub enum CloseReason {
  /// The edge was retired by a kill: either the assassin completed it, or
  /// its assassin was the victim leaving the ring.
  Eliminated,
  /// A seed/reseed replaced the whole ring.
  Reseed,
  /// A player left or was removed without a kill.
  Removed,
}

/// The one-shot closing record of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closure {
  pub reason:      CloseReason,
  pub at:          DateTime<Utc>,
  /// The edge that structurally took this one's place, when a splice
  /// produced one (the departing player's outgoing edge points at the new
  /// spliced edge).
  pub replaced_by: Option<Uuid>,
}

/// A directed assassin→target edge. `closure.is_none()` means the edge is
/// part of the live ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
  pub assignment_id: Uuid,
  pub group_id:      Uuid,
  pub assassin_id:   Uuid,
  pub target_id:     Uuid,
  pub dare_text:     String,
  pub created_at:    DateTime<Utc>,
  pub closure:       Option<Closure>,
}

impl Assignment {
  pub fn is_open(&self) -> bool { self.closure.is_none() }
}
