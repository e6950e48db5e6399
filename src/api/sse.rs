//! Server-Sent Events broadcaster
//!
//! Streams controller events to connected dashboard clients.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::api::AppState;

/// GET /api/v1/events - SSE stream of controller events
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    let rx = state.controller.subscribe_events();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default().event(event.kind()).data(json))),
            Err(e) => {
                warn!("Failed to serialize event: {}", e);
                None
            }
        },
        Err(e) => {
            // Lagged or closed receiver
            warn!("SSE stream error: {:?}", e);
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
