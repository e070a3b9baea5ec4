//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a store error. A [`dojo_core::Error`] anywhere in its source chain
  /// keeps the status it would have on its own.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&e);
    while let Some(err) = source {
      if let Some(core) = err.downcast_ref::<dojo_core::Error>() {
        return Self::from_core(core);
      }
      source = err.source();
    }
    Self::Store(Box::new(e))
  }

  fn from_core(e: &dojo_core::Error) -> Self {
    match e {
      dojo_core::Error::InsufficientRoster { .. } | dojo_core::Error::Validation(_) => {
        Self::BadRequest(e.to_string())
      }
      dojo_core::Error::MatchNumbersExhausted => Self::Conflict(e.to_string()),
    }
  }
}

impl From<dojo_core::Error> for ApiError {
  fn from(e: dojo_core::Error) -> Self { Self::from_core(&e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
