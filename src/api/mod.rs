//! HTTP API for the appliance
//!
//! Status-oriented surface consumed by the dashboard: status snapshot,
//! register-mode workflow, playback controls, history, settings, and an SSE
//! event stream. Dashboard page rendering and media CRUD live elsewhere.

pub mod handlers;
pub mod sse;

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use sqlx::{Pool, Sqlite};
use tower_http::trace::TraceLayer;

use crate::controller::Controller;
use crate::hardware::ScanInjector;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
    pub pool: Pool<Sqlite>,
    /// Present for simulated hardware backends only; enables POST /scan.
    pub scan_injector: Option<Arc<dyn ScanInjector>>,
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api/v1",
            Router::new()
                .route("/status", get(handlers::get_status))
                .route(
                    "/register_mode",
                    get(handlers::get_register_mode).post(handlers::set_register_mode),
                )
                .route("/tags", post(handlers::register_tag))
                .route("/controls/play_pause", post(handlers::play_pause))
                .route("/controls/stop", post(handlers::stop))
                .route("/scan", post(handlers::simulate_scan))
                .route("/history", get(handlers::get_history))
                .route(
                    "/settings",
                    get(handlers::get_settings).post(handlers::set_setting),
                )
                .route("/events", get(sse::event_stream)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - module/version health check
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "tagbox",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.port,
    }))
}
