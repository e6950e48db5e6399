//! HTTP request handlers

use axum::{extract::Query, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::api::AppState;
use crate::controller::Status;
use crate::db;
use crate::error::Error;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    status: String,
}

impl StatusMessage {
    fn ok() -> Json<Self> {
        Json(Self {
            status: "ok".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterModeRequest {
    enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct RegisterModeResponse {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_scanned_uid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterTagRequest {
    /// Defaults to the last scanned UID when omitted (register-mode flow).
    uid: Option<String>,
    media_id: i64,
    label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterTagResponse {
    uid: String,
    media_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    uid: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SetSettingRequest {
    key: String,
    value: String,
}

type ApiError = (StatusCode, Json<StatusMessage>);

fn internal_error(e: Error) -> ApiError {
    error!("Request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(StatusMessage {
            status: format!("error: {}", e),
        }),
    )
}

fn bad_request(msg: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(StatusMessage {
            status: format!("error: {}", msg),
        }),
    )
}

// ============================================================================
// Status
// ============================================================================

/// GET /api/v1/status - race-free controller status snapshot
pub async fn get_status(State(state): State<AppState>) -> Result<Json<Status>, ApiError> {
    let status = state.controller.status().await.map_err(internal_error)?;
    Ok(Json(status))
}

// ============================================================================
// Register mode / tag registration
// ============================================================================

/// GET /api/v1/register_mode
pub async fn get_register_mode(State(state): State<AppState>) -> Json<RegisterModeResponse> {
    Json(RegisterModeResponse {
        enabled: state.controller.register_mode().await,
        last_scanned_uid: state.controller.last_scanned_uid().await,
    })
}

/// POST /api/v1/register_mode - divert scans to UID capture
pub async fn set_register_mode(
    State(state): State<AppState>,
    Json(req): Json<RegisterModeRequest>,
) -> Json<RegisterModeResponse> {
    state.controller.set_register_mode(req.enabled).await;
    Json(RegisterModeResponse {
        enabled: req.enabled,
        last_scanned_uid: state.controller.last_scanned_uid().await,
    })
}

/// POST /api/v1/tags - assign a UID to a media item (last registration wins)
pub async fn register_tag(
    State(state): State<AppState>,
    Json(req): Json<RegisterTagRequest>,
) -> Result<Json<RegisterTagResponse>, ApiError> {
    let uid = match req.uid {
        Some(uid) => uid,
        None => state
            .controller
            .last_scanned_uid()
            .await
            .ok_or_else(|| bad_request("no uid given and no tag scanned yet"))?,
    };

    if db::media::get_media(&state.pool, req.media_id)
        .await
        .map_err(internal_error)?
        .is_none()
    {
        return Err(bad_request("unknown media_id"));
    }

    db::tags::add_tag(&state.pool, &uid, req.media_id, req.label.as_deref())
        .await
        .map_err(internal_error)?;
    info!("Registered tag {} -> media {}", uid, req.media_id);

    Ok(Json(RegisterTagResponse {
        uid,
        media_id: req.media_id,
    }))
}

// ============================================================================
// Playback controls
// ============================================================================

/// POST /api/v1/controls/play_pause - same entry point as the physical button
pub async fn play_pause(State(state): State<AppState>) -> Json<StatusMessage> {
    state.controller.on_play_pause().await;
    StatusMessage::ok()
}

/// POST /api/v1/controls/stop
pub async fn stop(State(state): State<AppState>) -> Result<Json<StatusMessage>, ApiError> {
    state.controller.on_stop().await.map_err(internal_error)?;
    Ok(StatusMessage::ok())
}

/// POST /api/v1/scan - inject a simulated tag scan (mock backend only)
pub async fn simulate_scan(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    match &state.scan_injector {
        Some(injector) => {
            injector.inject(&req.uid);
            Ok(StatusMessage::ok())
        }
        None => Err(bad_request("scan injection requires the mock backend")),
    }
}

// ============================================================================
// History / settings
// ============================================================================

/// GET /api/v1/history - recent playback log rows
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<db::log::HistoryEntry>>, ApiError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let history = db::log::get_history(&state.pool, limit)
        .await
        .map_err(internal_error)?;
    Ok(Json(history))
}

/// GET /api/v1/settings
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<std::collections::HashMap<String, String>>, ApiError> {
    let settings = db::settings::get_all_settings(&state.pool)
        .await
        .map_err(internal_error)?;
    Ok(Json(settings))
}

/// POST /api/v1/settings - set one key
pub async fn set_setting(
    State(state): State<AppState>,
    Json(req): Json<SetSettingRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    if req.key.is_empty() {
        return Err(bad_request("empty settings key"));
    }
    db::settings::set_setting(&state.pool, &req.key, req.value)
        .await
        .map_err(internal_error)?;
    Ok(StatusMessage::ok())
}
