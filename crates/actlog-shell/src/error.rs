//! Shell error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an endpoint.
#[derive(Debug, Error)]
pub enum ShellError {
  /// The shell is not accepting requests (teardown has begun).
  #[error("activity store is not ready")]
  NotReady,

  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ShellError {
  pub(crate) fn persistence<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(error = %e, "activity store request failed");
    Self::Persistence(Box::new(e))
  }
}

impl IntoResponse for ShellError {
  fn into_response(self) -> Response {
    let status = match &self {
      ShellError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
      ShellError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
