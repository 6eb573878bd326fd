//! Error types for `quarry-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::ring::RingViolation;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A proposed edge set failed ring validation. The inner violation
  /// carries the admin-facing message and the stable reason code.
  #[error(transparent)]
  InvalidRing(#[from] RingViolation),

  #[error("player {0} has no active assignment")]
  NoActiveAssignment(Uuid),

  #[error("player {0} is not in the active ring")]
  NotActive(Uuid),

  #[error("at least 2 active players are needed to form a ring, have {have}")]
  InsufficientPlayers { have: usize },

  #[error(
    "removing a player from a {have}-player ring cannot leave a cycle; end \
     the game or reseed instead"
  )]
  RingTooSmall { have: usize },

  #[error("group not found: {0}")]
  GroupNotFound(Uuid),

  #[error("player not found: {0}")]
  PlayerNotFound(Uuid),

  #[error("dare template not found: {0}")]
  TemplateNotFound(Uuid),
}

impl Error {
  /// Stable snake_case code for each failure, suitable for machine matching
  /// by API clients while `Display` stays human-readable.
  pub fn reason_code(&self) -> &'static str {
    match self {
      Self::InvalidRing(v) => v.reason_code(),
      Self::NoActiveAssignment(_) => "no_active_assignment",
      Self::NotActive(_) => "not_active",
      Self::InsufficientPlayers { .. } => "insufficient_players",
      Self::RingTooSmall { .. } => "ring_too_small",
      Self::GroupNotFound(_) => "group_not_found",
      Self::PlayerNotFound(_) => "player_not_found",
      Self::TemplateNotFound(_) => "template_not_found",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
