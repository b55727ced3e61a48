//! Error types and axum `IntoResponse` implementation for the session layer.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("invalid credentials")]
  InvalidCredentials,
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("password hashing failed: {0}")]
  Hash(String),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required".to_owned()),
      Error::InvalidCredentials => {
        (StatusCode::UNAUTHORIZED, "Invalid credentials".to_owned())
      }
      Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
      e @ (Error::Hash(_) | Error::Store(_)) => {
        tracing::error!(error = %e, "session layer failure");
        (StatusCode::INTERNAL_SERVER_ERROR, nsos_api::error::INTERNAL_MESSAGE.to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
