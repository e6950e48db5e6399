//! HTTP API integration tests
//!
//! Exercises the router end to end with `tower::ServiceExt::oneshot`,
//! including driving a full playback session through the simulated scan
//! endpoint and the tag polling loop.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode;
use http::{Method, Request};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use tempfile::TempDir;
use tower::ServiceExt;

use tagbox::api::{create_router, AppState};
use tagbox::config::{Config, HardwareBackend};
use tagbox::controller::Controller;
use tagbox::models::{MediaType, NewMedia};
use tagbox::player::completion_channel;
use tagbox::player::stub::StubPlayer;
use tagbox::{db, hardware, poll};

struct TestApp {
    router: axum::Router,
    pool: Pool<Sqlite>,
    controller: Arc<Controller>,
    config: Config,
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    _dir: TempDir,
}

async fn setup() -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = Config::new(dir.path().to_path_buf(), HardwareBackend::Mock);
    config.stub_play_duration = Duration::from_millis(200);
    config.tag_poll_interval = Duration::from_millis(10);
    config.ensure_dirs().unwrap();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init_schema(&pool).await.unwrap();

    let hw = hardware::create(&config);
    let (done_tx, done_rx) = completion_channel();
    let player = Arc::new(StubPlayer::new(config.stub_play_duration, done_tx));

    let controller = Controller::new(
        pool.clone(),
        config.clone(),
        player,
        hw.leds.clone(),
        hw.buzzer.clone(),
    );
    controller.spawn_completion_task(done_rx);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    poll::spawn_tag_loop(
        hw.tag_reader.clone(),
        controller.clone(),
        &config,
        shutdown_rx,
    );

    let router = create_router(AppState {
        controller: controller.clone(),
        pool: pool.clone(),
        scan_injector: hw.scan_injector.clone(),
        port: 5000,
    });

    TestApp {
        router,
        pool,
        controller,
        config,
        shutdown_tx,
        _dir: dir,
    }
}

async fn request(
    app: &axum::Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    let mut builder = Request::builder().method(method).uri(path);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = match body {
        Some(json_body) => builder.body(Body::from(json_body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice(&bytes).ok()
    };
    (status, json)
}

#[tokio::test]
async fn health_check_reports_module() {
    let app = setup().await;
    let (status, body) = request(&app.router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "tagbox");
}

#[tokio::test]
async fn status_shows_idle_shape() {
    let app = setup().await;
    let (status, body) = request(&app.router, Method::GET, "/api/v1/status", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["state"], "idle");
    assert_eq!(body["register_mode"], false);
    assert_eq!(body["video_stats"]["limit_count"], 5);
    assert_eq!(body["video_stats"]["count"], 0);
    assert!(body.get("now_playing").is_none());
}

#[tokio::test]
async fn register_mode_round_trip() {
    let app = setup().await;

    let (status, body) = request(
        &app.router,
        Method::POST,
        "/api/v1/register_mode",
        Some(json!({"enabled": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["enabled"], true);

    let (_, body) = request(&app.router, Method::GET, "/api/v1/status", None).await;
    assert_eq!(body.unwrap()["register_mode"], true);
}

#[tokio::test]
async fn register_tag_uses_last_scanned_uid() {
    let app = setup().await;
    let media_id = db::media::add_media(
        &app.pool,
        &NewMedia {
            title: "Song".into(),
            filename: "song.mp3".into(),
            media_type: MediaType::Audio,
            source_url: None,
            thumbnail: None,
            duration_s: Some(60),
        },
    )
    .await
    .unwrap();

    app.controller.set_register_mode(true).await;
    app.controller.on_tag_scanned("NEW123").await.unwrap();

    let (status, body) = request(
        &app.router,
        Method::POST,
        "/api/v1/tags",
        Some(json!({"media_id": media_id, "label": "bunny"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["uid"], "NEW123");

    let tag = db::tags::get_tag(&app.pool, "NEW123").await.unwrap().unwrap();
    assert_eq!(tag.media_id, media_id);
}

#[tokio::test]
async fn register_tag_rejects_unknown_media() {
    let app = setup().await;
    let (status, _) = request(
        &app.router,
        Method::POST,
        "/api/v1/tags",
        Some(json!({"uid": "ABC", "media_id": 777})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn simulated_scan_drives_full_session() {
    let app = setup().await;
    let media_id = db::media::add_media(
        &app.pool,
        &NewMedia {
            title: "Song".into(),
            filename: "song.mp3".into(),
            media_type: MediaType::Audio,
            source_url: None,
            thumbnail: None,
            duration_s: Some(60),
        },
    )
    .await
    .unwrap();
    std::fs::write(app.config.media_path(MediaType::Audio, "song.mp3"), b"x").unwrap();
    db::tags::add_tag(&app.pool, "SIM001", media_id, None)
        .await
        .unwrap();

    let (status, _) = request(
        &app.router,
        Method::POST,
        "/api/v1/scan",
        Some(json!({"uid": "SIM001"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The polling task picks the scan up and starts a session
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let (_, body) = request(&app.router, Method::GET, "/api/v1/status", None).await;
            if body.as_ref().and_then(|b| b.get("now_playing")).is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("scan did not start playback");

    // Stop through the API; the session ends user-stopped
    let (status, _) = request(&app.router, Method::POST, "/api/v1/controls/stop", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(&app.router, Method::GET, "/api/v1/status", None).await;
    assert_eq!(body.unwrap()["state"], "idle");

    let (_, history) = request(&app.router, Method::GET, "/api/v1/history", None).await;
    let history = history.unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["completed"], false);

    let _ = app.shutdown_tx.send(true);
}

#[tokio::test]
async fn settings_round_trip() {
    let app = setup().await;

    let (status, _) = request(
        &app.router,
        Method::POST,
        "/api/v1/settings",
        Some(json!({"key": "daily_video_limit_count", "value": "3"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(&app.router, Method::GET, "/api/v1/settings", None).await;
    assert_eq!(body.unwrap()["daily_video_limit_count"], "3");

    let (_, body) = request(&app.router, Method::GET, "/api/v1/status", None).await;
    assert_eq!(body.unwrap()["video_stats"]["limit_count"], 3);
}
