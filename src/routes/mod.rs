//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws` (one trainer session per connection)
/// - read-only API under `/api/v1/...`
/// - Static SPA from the configured directory with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let static_service = ServeDir::new(&static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(format!("{static_dir}/index.html")));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/board", get(http::http_get_board))
        .route("/api/v1/square/:coordinate", get(http::http_get_square))
        .route("/api/v1/sessions/:id", get(http::http_get_session))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::TrainerConfig;
    use crate::protocol::to_out;
    use crate::session::Session;

    fn app_state() -> Arc<AppState> {
        Arc::new(AppState::with_config(TrainerConfig::default()))
    }

    async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
        let resp = build_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_live_sessions() {
        let state = app_state();
        let (status, v) = get_json(state.clone(), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["ok"], true);
        assert_eq!(v["sessions"], 0);
    }

    #[tokio::test]
    async fn board_for_quadrant() {
        let (status, v) = get_json(app_state(), "/api/v1/board?quadrant=BR").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["quadrant"], "BR");
        let coords = v["coordinates"].as_array().unwrap();
        assert_eq!(coords.len(), 16);
        assert_eq!(coords[0], "e1");
        assert_eq!(v["rows"][7][7]["coordinate"], "h1");
        assert_eq!(v["rows"][7][7]["inQuadrant"], true);
        assert_eq!(v["rows"][0][0]["inQuadrant"], false);

        let (_, v) = get_json(app_state(), "/api/v1/board").await;
        assert_eq!(v["quadrant"], "ALL");
        assert_eq!(v["coordinates"].as_array().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn square_lookup_and_rejection() {
        let (status, v) = get_json(app_state(), "/api/v1/square/f5?quadrant=TR").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["coordinate"], "f5");
        assert_eq!(v["dark"], false);
        assert_eq!(v["inQuadrant"], true);
        assert_eq!(v["quadrant"], "TR");

        let (status, v) = get_json(app_state(), "/api/v1/square/z9").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(v["error"].as_str().unwrap().contains("z9"));
    }

    #[tokio::test]
    async fn session_polling() {
        let state = app_state();
        let (status, _) = get_json(state.clone(), "/api/v1/sessions/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let mut s = Session::new();
        s.select_quadrant(crate::board::Quadrant::BottomLeft);
        s.start_activity(crate::domain::Activity::Text, &mut StdRng::seed_from_u64(3)).unwrap();
        state.publish("abc", to_out(&s, &state.config.feedback)).await;

        let (status, v) = get_json(state, "/api/v1/sessions/abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["phase"], "active");
        assert_eq!(v["activity"], "TEXT");
        assert_eq!(v["challenge"]["kind"], "single");
    }
}
