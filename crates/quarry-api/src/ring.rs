//! Handlers for ring endpoints — the four mutations plus the derived views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/groups/:id/ring` | Open edges with display names |
//! | `POST` | `/groups/:id/ring/seed` | Seed over the current pool |
//! | `POST` | `/groups/:id/ring/reseed` | Body: [`ReseedBody`] |
//! | `GET`  | `/groups/:id/ring/audit` | Integrity report, no writes |
//! | `POST` | `/groups/:id/eliminations` | Body: `{"assassin_player_id":"..."}` |
//! | `POST` | `/groups/:id/removals` | Body: `{"player_id":"..."}` |
//!
//! Validation failures come back as 422 with the engine's message verbatim
//! and a stable `reason` code, so admin clients can show them as-is.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use quarry_core::{
  assignment::Assignment,
  plan::{Elimination, Removal},
  ring::{RingAudit, RingEdge},
  store::{RingStore, StoreError},
  view::NamedEdge,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /groups/:id/ring`
pub async fn edges<S>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<NamedEdge>>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let ring = store
    .ring_edges(group_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ring))
}

/// `POST /groups/:id/ring/seed`
pub async fn seed<S>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let edges = store
    .seed_ring(group_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(edges)))
}

#[derive(Debug, Deserialize)]
pub struct ReseedBody {
  pub edges: Vec<RingEdge>,
}

/// `POST /groups/:id/ring/reseed` — install an admin-specified ring.
pub async fn reseed<S>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<Uuid>,
  Json(body): Json<ReseedBody>,
) -> Result<Json<Vec<Assignment>>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let edges = store
    .reseed_ring(group_id, body.edges)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(edges))
}

/// `GET /groups/:id/ring/audit`
pub async fn audit<S>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<Uuid>,
) -> Result<Json<RingAudit>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let report = store
    .audit_ring(group_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct EliminateBody {
  pub assassin_player_id: Uuid,
}

/// `POST /groups/:id/eliminations` — the assassin taps "eliminated".
pub async fn eliminate<S>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<Uuid>,
  Json(body): Json<EliminateBody>,
) -> Result<Json<Elimination>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let outcome = store
    .eliminate(group_id, body.assassin_player_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct RemoveBody {
  pub player_id: Uuid,
}

/// `POST /groups/:id/removals` — splice a player out without a kill.
pub async fn remove_member<S>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<Uuid>,
  Json(body): Json<RemoveBody>,
) -> Result<Json<Removal>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let outcome = store
    .remove_member(group_id, body.player_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(outcome))
}
