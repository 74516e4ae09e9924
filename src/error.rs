//! HTTP-facing error type.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use thiserror::Error;

use crate::board::CoordinateError;
use crate::protocol::ErrorOut;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Coordinate(#[from] CoordinateError),

  #[error("unknown session: {0}")]
  UnknownSession(String),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::Coordinate(_) => StatusCode::BAD_REQUEST,
      ApiError::UnknownSession(_) => StatusCode::NOT_FOUND,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status(), Json(ErrorOut { error: self.to_string() })).into_response()
  }
}
