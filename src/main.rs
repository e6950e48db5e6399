//! TagBox - Main entry point
//!
//! Wires together the persistent store, hardware ports, player, controller,
//! polling tasks, and the HTTP API, then runs until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagbox::config::{Config, HardwareBackend};
use tagbox::controller::Controller;
use tagbox::player::stub::StubPlayer;
use tagbox::{api, db, hardware, player, poll};

/// Command-line arguments for tagbox
#[derive(Parser, Debug)]
#[command(name = "tagbox")]
#[command(about = "Tag-driven media playback controller")]
#[command(version)]
struct Args {
    /// Port for the HTTP API
    #[arg(short, long, default_value = "5000", env = "TAGBOX_PORT")]
    port: u16,

    /// Data directory (database + media tree)
    #[arg(short, long, env = "TAGBOX_DATA_DIR")]
    data_dir: PathBuf,

    /// Hardware backend ("mock" for the simulated set)
    #[arg(long, default_value = "mock", env = "TAGBOX_HW_BACKEND")]
    hw_backend: HardwareBackend,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagbox=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::new(args.data_dir.clone(), args.hw_backend);

    info!("Starting TagBox on port {}", args.port);
    info!("Data directory: {}", config.data_dir.display());

    config.ensure_dirs().context("Failed to create media directories")?;

    let pool = db::connect(&config.db_path())
        .await
        .context("Failed to open database")?;

    let hw = hardware::create(&config);

    let (done_tx, done_rx) = player::completion_channel();
    let player = Arc::new(StubPlayer::new(config.stub_play_duration, done_tx));

    let controller = Controller::new(
        pool.clone(),
        config.clone(),
        player,
        hw.leds.clone(),
        hw.buzzer.clone(),
    );
    let completion_task = controller.spawn_completion_task(done_rx);
    info!("Controller initialized");

    // Polling tasks with a shared shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tag_task = poll::spawn_tag_loop(
        hw.tag_reader.clone(),
        controller.clone(),
        &config,
        shutdown_rx.clone(),
    );
    let button_task = poll::spawn_button_loop(
        hw.buttons.clone(),
        controller.clone(),
        &config,
        shutdown_rx,
    );

    let app_state = api::AppState {
        controller: controller.clone(),
        pool,
        scan_injector: hw.scan_injector.clone(),
        port: args.port,
    };
    let app = api::create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop and join the polling tasks before touching hardware state
    info!("Stopping polling tasks");
    let _ = shutdown_tx.send(true);
    let _ = tag_task.await;
    let _ = button_task.await;

    controller
        .shutdown()
        .await
        .context("Controller shutdown failed")?;
    completion_task.abort();

    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
