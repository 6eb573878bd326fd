//! Handlers for `/groups` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/groups` | Body: `{"name":"..."}` |
//! | `GET`  | `/groups/:id` | 404 if not found |
//! | `GET`  | `/groups/:id/feed` | Timeline, newest first |
//! | `GET`  | `/groups/:id/kills` | Kill counts per player |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use quarry_core::{
  feed::{FeedEvent, KillCount},
  group::Group,
  store::{RingStore, StoreError},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /groups` — body: `{"name":"..."}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let group = store
    .create_group(body.name)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(group)))
}

/// `GET /groups/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Group>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let group = store
    .get_group(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("group {id} not found")))?;
  Ok(Json(group))
}

/// `GET /groups/:id/feed`
pub async fn feed<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<FeedEvent>>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let events = store.feed(id).await.map_err(ApiError::from_store)?;
  Ok(Json(events))
}

/// `GET /groups/:id/kills`
pub async fn kills<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<KillCount>>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let counts = store
    .kill_counts(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(counts))
}
