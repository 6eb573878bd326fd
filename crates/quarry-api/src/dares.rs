//! Handlers for dare-template endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/groups/:id/dare-templates` | Optional `?include_inactive=true` |
//! | `POST` | `/groups/:id/dare-templates` | Body: [`CreateBody`] |
//! | `POST` | `/dare-templates/:id/active` | Body: `{"active":false}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use quarry_core::{
  dare::{DareTemplate, Difficulty, NewDareTemplate},
  store::{RingStore, StoreError},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub include_inactive: bool,
}

/// `GET /groups/:id/dare-templates[?include_inactive=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<DareTemplate>>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let templates = store
    .list_dare_templates(group_id, !params.include_inactive)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(templates))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub text:       String,
  pub difficulty: Difficulty,
  #[serde(default)]
  pub tags:       Vec<String>,
}

/// `POST /groups/:id/dare-templates`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<Uuid>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let template = store
    .add_dare_template(NewDareTemplate {
      group_id,
      text: body.text,
      difficulty: body.difficulty,
      tags: body.tags,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(template)))
}

#[derive(Debug, Deserialize)]
pub struct ActiveBody {
  pub active: bool,
}

/// `POST /dare-templates/:id/active`
pub async fn set_active<S>(
  State(store): State<Arc<S>>,
  Path(template_id): Path<Uuid>,
  Json(body): Json<ActiveBody>,
) -> Result<Json<DareTemplate>, ApiError>
where
  S: RingStore,
  S::Error: StoreError + std::error::Error + Send + Sync + 'static,
{
  let template = store
    .set_dare_template_active(template_id, body.active)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(template))
}
