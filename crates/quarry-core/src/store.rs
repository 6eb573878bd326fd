//! The `RingStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `quarry-store-sqlite`).
//! Higher layers (`quarry-api`, `quarry-cli`) depend on this abstraction,
//! not on any concrete backend.
//!
//! All ring state changes go through the four mutation operations (seed,
//! reseed, eliminate, remove); no other method flips a player's ring status
//! or an edge's lifecycle. Each mutation is atomic: it either commits the
//! whole [`MutationPlan`](crate::plan::MutationPlan) or writes nothing.

use std::future::Future;

use uuid::Uuid;

use crate::{
  assignment::Assignment,
  dare::{DareTemplate, NewDareTemplate},
  feed::{FeedEvent, KillCount},
  group::Group,
  plan::{Elimination, Removal},
  player::Player,
  ring::{RingAudit, RingEdge},
  view::{AssignmentView, NamedEdge},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Roster filter for [`RingStore::list_players`], mirroring the admin
/// screen's All / Active / Removed / Unclaimed tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerFilter {
  #[default]
  All,
  /// Eligible for the next seed: waiting or active.
  Pool,
  /// Eliminated or removed.
  Inactive,
  /// Placeholder slots no real user has claimed yet.
  Unclaimed,
}

// ─── Error classification ────────────────────────────────────────────────────

/// Lets transport layers classify a backend error without knowing the
/// backend: engine rejections surface with their reason code, contention
/// surfaces as retryable, everything else is internal.
pub trait StoreError {
  /// The engine rejection inside this error, if that is what it is.
  fn as_engine(&self) -> Option<&crate::Error>;

  /// Concurrency contention — the caller should retry with backoff.
  fn is_busy(&self) -> bool { false }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Quarry game store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Groups ────────────────────────────────────────────────────────────

  fn create_group(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  /// Retrieve a group by id. Returns `None` if not found.
  fn get_group(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  // ── Player registry ───────────────────────────────────────────────────

  /// Add a player to the roster as `waiting`. Mid-game joiners never enter
  /// the live ring; they wait for the next seed/reseed.
  fn add_player(
    &self,
    group_id: Uuid,
    display_name: String,
    owner_profile_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Player, Self::Error>> + Send + '_;

  fn get_player(
    &self,
    player_id: Uuid,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;

  fn list_players(
    &self,
    group_id: Uuid,
    filter: PlayerFilter,
  ) -> impl Future<Output = Result<Vec<Player>, Self::Error>> + Send + '_;

  /// Attach a real user to a placeholder roster slot.
  fn claim_player(
    &self,
    player_id: Uuid,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Player, Self::Error>> + Send + '_;

  /// Return an eliminated/removed player to the group as `waiting`. Ring
  /// re-entry still requires a reseed.
  fn restore_player(
    &self,
    player_id: Uuid,
  ) -> impl Future<Output = Result<Player, Self::Error>> + Send + '_;

  // ── Ring mutations ────────────────────────────────────────────────────

  /// Seed a fresh ring over the group's pool (waiting + active players, in
  /// roster order), drawing dares from the group's templates.
  fn seed_ring(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + '_;

  /// Install an admin-specified ring; authoritative over membership.
  fn reseed_ring(
    &self,
    group_id: Uuid,
    edges: Vec<RingEdge>,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + '_;

  /// Record a kill by `assassin_id` on their current target.
  fn eliminate(
    &self,
    group_id: Uuid,
    assassin_id: Uuid,
  ) -> impl Future<Output = Result<Elimination, Self::Error>> + Send + '_;

  /// Splice a player out of the ring without a kill.
  fn remove_member(
    &self,
    group_id: Uuid,
    player_id: Uuid,
  ) -> impl Future<Output = Result<Removal, Self::Error>> + Send + '_;

  // ── Dare lifecycle ────────────────────────────────────────────────────

  /// Replace the dare text on the assassin's open edge.
  fn edit_dare(
    &self,
    group_id: Uuid,
    assassin_id: Uuid,
    dare_text: String,
  ) -> impl Future<Output = Result<Assignment, Self::Error>> + Send + '_;

  fn add_dare_template(
    &self,
    input: NewDareTemplate,
  ) -> impl Future<Output = Result<DareTemplate, Self::Error>> + Send + '_;

  fn list_dare_templates(
    &self,
    group_id: Uuid,
    only_active: bool,
  ) -> impl Future<Output = Result<Vec<DareTemplate>, Self::Error>> + Send + '_;

  fn set_dare_template_active(
    &self,
    template_id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<DareTemplate, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The open edges of a group with display names attached.
  fn ring_edges(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<NamedEdge>, Self::Error>> + Send + '_;

  /// The raw assignment ledger, optionally including closed history.
  fn assignments(
    &self,
    group_id: Uuid,
    include_closed: bool,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + '_;

  /// What `player_id` currently sees: a target and dare, a won game, or
  /// nothing yet.
  fn current_assignment(
    &self,
    group_id: Uuid,
    player_id: Uuid,
  ) -> impl Future<Output = Result<AssignmentView, Self::Error>> + Send + '_;

  /// Re-derive "is the stored active edge set a perfect ring" from stored
  /// rows. Performs no writes.
  fn audit_ring(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<RingAudit, Self::Error>> + Send + '_;

  fn feed(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FeedEvent>, Self::Error>> + Send + '_;

  fn kill_counts(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<KillCount>, Self::Error>> + Send + '_;
}
