//! Error type for `quarry-store-sqlite`.

use quarry_core::ring::RingViolation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Domain failure from the engine: validation rejection, missing edge,
  /// too-small ring, and so on. Always caller-recoverable.
  #[error(transparent)]
  Core(quarry_core::Error),

  /// The store's lock could not be acquired in time. Retry with backoff.
  #[error("store is busy, retry shortly")]
  Busy,

  /// A mutation found the rows it planned against already changed. Retry.
  #[error("mutation conflict: {0}")]
  Conflict(String),

  /// Post-mutation audit found the written state is not a perfect ring;
  /// the transaction was rolled back.
  #[error("ring integrity check failed after mutation: {0}")]
  Integrity(RingViolation),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("sql error: {0}")]
  Sql(rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("column decode error: {0}")]
  Decode(String),
}

impl From<quarry_core::Error> for Error {
  fn from(e: quarry_core::Error) -> Self { Self::Core(e) }
}

impl quarry_core::store::StoreError for Error {
  fn as_engine(&self) -> Option<&quarry_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }

  fn is_busy(&self) -> bool {
    matches!(self, Self::Busy | Self::Conflict(_))
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    if let rusqlite::Error::SqliteFailure(code, _) = &e
      && matches!(
        code.code,
        rusqlite::ErrorCode::DatabaseBusy
          | rusqlite::ErrorCode::DatabaseLocked
      )
    {
      return Self::Busy;
    }
    Self::Sql(e)
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(inner) => Self::from(inner),
      other => Self::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
