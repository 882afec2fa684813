//! Dashboard API endpoints
//!
//! The snapshot endpoint serves the last published state; the SSE stream
//! follows the snapshot-then-delta contract. Reconnecting clients simply
//! subscribe again and get a fresh snapshot first.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::engine::hub::HubMessage;
use crate::models::visit::{DashboardSnapshot, TodayStats};

/// Latest full dashboard snapshot
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "Last published dashboard state", body = DashboardSnapshot)
    )
)]
pub async fn get_dashboard(State(state): State<crate::AppState>) -> Json<DashboardSnapshot> {
    Json(state.services.dashboard.latest().as_ref().clone())
}

/// Today's aggregate statistics
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Today's statistics", body = TodayStats)
    )
)]
pub async fn get_stats(State(state): State<crate::AppState>) -> Json<TodayStats> {
    Json(state.services.dashboard.today_stats())
}

/// Live dashboard stream (Server-Sent Events)
///
/// The first event is always a full `snapshot`; every subsequent event is
/// an `update` carrying the full recomputed state. A subscriber that falls
/// behind the update buffer receives a fresh `snapshot` instead of the
/// missed messages.
#[utoipa::path(
    get,
    path = "/dashboard/stream",
    tag = "dashboard",
    responses(
        (status = 200, description = "SSE stream of dashboard snapshots")
    )
)]
pub async fn stream_dashboard(
    State(state): State<crate::AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let dashboard = state.services.dashboard.clone();
    let (snapshot, rx) = dashboard.subscribe();
    tracing::debug!("Dashboard subscriber connected");

    let initial = tokio_stream::once(sse_event("snapshot", &snapshot));
    let updates = BroadcastStream::new(rx).map(move |item| match dashboard.resolve(item) {
        HubMessage::Update(snapshot) => sse_event("update", &snapshot),
        HubMessage::Resync(snapshot) => sse_event("snapshot", &snapshot),
    });

    let keepalive = Duration::from_secs(state.config.engine.keepalive_secs);
    Sse::new(initial.chain(updates))
        .keep_alive(KeepAlive::new().interval(keepalive).text("ping"))
}

fn sse_event(name: &str, snapshot: &DashboardSnapshot) -> Result<Event, Infallible> {
    Ok(match Event::default().event(name).json_data(snapshot) {
        Ok(event) => event,
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize dashboard snapshot");
            Event::default().comment("serialization failure")
        }
    })
}
