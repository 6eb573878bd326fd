//! Handlers for roster endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/groups/:id/players` | Optional `?filter=all\|pool\|inactive\|unclaimed` |
//! | `POST` | `/groups/:id/players` | Body: [`AddPlayerBody`] |
//! | `POST` | `/players/:id/claim` | Body: `{"profile_id":"..."}` |
//! | `POST` | `/players/:id/restore` | Back to the group as `waiting` |
//! | `GET`  | `/groups/:id/players/:player_id/assignment` | Current view |
//! | `PUT`  | `/groups/:id/players/:player_id/dare` | Body: `{"dare_text":"..."}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use quarry_core::{
  assignment::Assignment,
  player::Player,
  store::{PlayerFilter, RingStore, StoreError},
  view::AssignmentView,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterParam {
  #[default]
  All,
  Pool,
  Inactive,
  Unclaimed,
}

impl From<FilterParam> for PlayerFilter {
  fn from(f: FilterParam) -> Self {
    match f {
      FilterParam::All => Self::All,
      FilterParam::Pool => Self::Pool,
      FilterParam::Inactive => Self::Inactive,
      FilterParam::Unclaimed => Self::Unclaimed,
    }
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub filter: FilterParam,
}

/// `GET /groups/:id/players[?filter=<filter>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Player>>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let players = store
    .list_players(group_id, params.filter.into())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(players))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddPlayerBody {
  pub display_name:     String,
  pub owner_profile_id: Option<Uuid>,
}

/// `POST /groups/:id/players` — add a placeholder or claimed player.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<Uuid>,
  Json(body): Json<AddPlayerBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let player = store
    .add_player(group_id, body.display_name, body.owner_profile_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(player)))
}

// ─── Claim / restore ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ClaimBody {
  pub profile_id: Uuid,
}

/// `POST /players/:id/claim`
pub async fn claim<S>(
  State(store): State<Arc<S>>,
  Path(player_id): Path<Uuid>,
  Json(body): Json<ClaimBody>,
) -> Result<Json<Player>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let player = store
    .claim_player(player_id, body.profile_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(player))
}

/// `POST /players/:id/restore`
pub async fn restore<S>(
  State(store): State<Arc<S>>,
  Path(player_id): Path<Uuid>,
) -> Result<Json<Player>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let player = store
    .restore_player(player_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(player))
}

// ─── Assignment view ──────────────────────────────────────────────────────────

/// `GET /groups/:id/players/:player_id/assignment`
pub async fn assignment<S>(
  State(store): State<Arc<S>>,
  Path((group_id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AssignmentView>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let view = store
    .current_assignment(group_id, player_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(view))
}

// ─── Dare ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DareBody {
  pub dare_text: String,
}

/// `PUT /groups/:id/players/:player_id/dare` — edit the open edge's dare.
pub async fn edit_dare<S>(
  State(store): State<Arc<S>>,
  Path((group_id, player_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<DareBody>,
) -> Result<Json<Assignment>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let assignment = store
    .edit_dare(group_id, player_id, body.dare_text)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(assignment))
}
