// HTTP request handlers for the local viewer
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// The dashboard page as currently rendered
pub async fn dashboard_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(state.surface.render_page())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/healthz", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
