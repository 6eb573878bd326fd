//! JSON REST API for the Quarry ring engine.
//!
//! Exposes an axum [`Router`] backed by any
//! [`quarry_core::store::RingStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", quarry_api::api_router(store.clone()))
//! ```

pub mod dares;
pub mod error;
pub mod groups;
pub mod players;
pub mod ring;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use quarry_core::store::{RingStore, StoreError};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RingStore + Clone + Send + Sync + 'static,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Groups
    .route("/groups", post(groups::create::<S>))
    .route("/groups/{id}", get(groups::get_one::<S>))
    .route("/groups/{id}/feed", get(groups::feed::<S>))
    .route("/groups/{id}/kills", get(groups::kills::<S>))
    // Players
    .route(
      "/groups/{id}/players",
      get(players::list::<S>).post(players::create::<S>),
    )
    .route("/players/{id}/claim", post(players::claim::<S>))
    .route("/players/{id}/restore", post(players::restore::<S>))
    .route(
      "/groups/{id}/players/{player_id}/assignment",
      get(players::assignment::<S>),
    )
    .route(
      "/groups/{id}/players/{player_id}/dare",
      put(players::edit_dare::<S>),
    )
    // Ring
    .route("/groups/{id}/ring", get(ring::edges::<S>))
    .route("/groups/{id}/ring/seed", post(ring::seed::<S>))
    .route("/groups/{id}/ring/reseed", post(ring::reseed::<S>))
    .route("/groups/{id}/ring/audit", get(ring::audit::<S>))
    .route("/groups/{id}/eliminations", post(ring::eliminate::<S>))
    .route("/groups/{id}/removals", post(ring::remove_member::<S>))
    // Dare templates
    .route(
      "/groups/{id}/dare-templates",
      get(dares::list::<S>).post(dares::create::<S>),
    )
    .route(
      "/dare-templates/{id}/active",
      post(dares::set_active::<S>),
    )
    .with_state(store)
}
