//! HTTP endpoint handlers. These are thin wrappers over board geometry and the session registry.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, Json, response::IntoResponse};
use tracing::{debug, instrument};

use crate::board::Coordinate;
use crate::error::ApiError;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, sessions: state.live_sessions().await })
}

#[instrument(level = "info", skip(q), fields(quadrant = ?q.quadrant()))]
pub async fn http_get_board(Query(q): Query<QuadrantQuery>) -> impl IntoResponse {
  Json(board_out(q.quadrant()))
}

#[instrument(level = "info", skip(q), fields(%coordinate, quadrant = ?q.quadrant()))]
pub async fn http_get_square(
  Path(coordinate): Path<String>,
  Query(q): Query<QuadrantQuery>,
) -> Result<Json<SquareOut>, ApiError> {
  let parsed: Coordinate = coordinate.parse()?;
  let out = SquareOut::new(parsed, q.quadrant());
  debug!(target: "quadrant_trainer", coordinate = %parsed, dark = out.dark, in_quadrant = out.in_quadrant, "Square served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionOut>, ApiError> {
  state.get_session(&id).await.map(Json).ok_or(ApiError::UnknownSession(id))
}
