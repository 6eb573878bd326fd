//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use quarry_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// An engine rejection. `message` is rendered verbatim for admins;
  /// `reason` is the stable machine-readable code.
  #[error("{message}")]
  Rejected {
    message: String,
    reason:  &'static str,
  },

  /// Contention on the group's ring state; the client should retry.
  #[error("busy, retry shortly")]
  Busy,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend failure into the right HTTP shape.
  pub fn from_store<E>(err: E) -> Self
  where
    E: StoreError + std::error::Error + Send + Sync + 'static,
  {
    if let Some(engine) = err.as_engine() {
      use quarry_core::Error as Core;
      return match engine {
        Core::GroupNotFound(_)
        | Core::PlayerNotFound(_)
        | Core::TemplateNotFound(_) => Self::NotFound(engine.to_string()),
        other => Self::Rejected {
          message: other.to_string(),
          reason:  other.reason_code(),
        },
      };
    }
    if err.is_busy() {
      return Self::Busy;
    }
    Self::Store(Box::new(err))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Rejected { message, reason } => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": message, "reason": reason })),
      )
        .into_response(),
      ApiError::Busy => (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": "busy, retry shortly", "reason": "busy" })),
      )
        .into_response(),
      ApiError::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
    }
  }
}
