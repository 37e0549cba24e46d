//! HTTP route handlers for alarm-daemon.
//!
//! `build_router` is public so integration tests can drive the router
//! in-process via `tower::ServiceExt::oneshot` without binding a port.

use std::sync::Arc;

use alarm_db::EventRange;
use alarm_notify::telegram::Update;
use alarm_schemas::inbound::{parse_inbound, Inbound};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, warn};

use crate::api_types::{
    ErrorResponse, EventsQuery, EventsResponse, HealthResponse, SensorView, StatusResponse,
};
use crate::commands::handle_update;
use crate::monitor::run_sweep;
use crate::reconciler::handle_received;
use crate::state::{now_unix, uptime_secs, AppState};

pub const PING_REPLY: &str = "Success: Ping received!";
pub const EVENT_REPLY: &str = "Success!";

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/:token/v1/status", get(status_handler))
        .route("/:token/v1/events", get(events_handler))
        .route("/:token/", post(webhook))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Operator read APIs
//
// Arm state and door history sit behind the bot-token path segment; only the
// health check is public.
// ---------------------------------------------------------------------------

fn token_matches(st: &AppState, token: &str) -> bool {
    token == st.bot_token.as_str()
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse {
            error: "forbidden".to_string(),
        }),
    )
        .into_response()
}

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
        }),
    )
}

pub(crate) async fn status_handler(
    State(st): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Response {
    if !token_matches(&st, &token) {
        warn!("status read on wrong token path rejected");
        return forbidden();
    }

    let arm = st.current_state().await;
    let sensors: Vec<SensorView> = {
        let reg = st.registry.lock().await;
        reg.all_entries()
            .into_iter()
            .map(|r| SensorView {
                location: r.location,
                state: r.state,
                last_seen: r.last_seen,
            })
            .collect()
    };

    (
        StatusCode::OK,
        Json(StatusResponse {
            system_status: arm.system_status(),
            armed: arm.is_armed(),
            daemon_uptime_secs: uptime_secs(),
            sensors,
        }),
    )
        .into_response()
}

pub(crate) async fn events_handler(
    State(st): State<Arc<AppState>>,
    Path(token): Path<String>,
    Query(q): Query<EventsQuery>,
) -> Response {
    if !token_matches(&st, &token) {
        warn!("event read on wrong token path rejected");
        return forbidden();
    }

    let range = EventRange {
        start: q.start,
        end: q.end,
    };

    match tokio::time::timeout(st.io_timeout, st.store.query(range)).await {
        Ok(Ok(events)) => (
            StatusCode::OK,
            Json(EventsResponse {
                backend: st.store.backend_name().to_string(),
                events,
            }),
        )
            .into_response(),
        Ok(Err(e)) => {
            error!(error = %format!("{e:#}"), "event query failed");
            internal_error("event query failed")
        }
        Err(_) => {
            error!(timeout = ?st.io_timeout, "event query timed out");
            internal_error("event query timed out")
        }
    }
}

fn internal_error(msg: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Webhook: POST /{token}/
// ---------------------------------------------------------------------------

/// Single ingestion endpoint for the sensor device and the chat platform.
///
/// Sensor reports and pings are accepted on any path token. Chat updates
/// require the path token to equal the bot token.
pub(crate) async fn webhook(
    State(st): State<Arc<AppState>>,
    Path(token): Path<String>,
    body: Bytes,
) -> Response {
    let now = now_unix();

    let inbound = match parse_inbound(&body, now) {
        Ok(inbound) => inbound,
        Err(e) => {
            warn!(error = %e, "rejected webhook body");
            return (StatusCode::BAD_REQUEST, format!("Error: {e}")).into_response();
        }
    };

    match inbound {
        Inbound::Ping => {
            run_sweep(&st, now).await;
            (StatusCode::OK, PING_REPLY).into_response()
        }
        Inbound::Sensor(report) => {
            handle_received(&st, report).await;
            (StatusCode::OK, EVENT_REPLY).into_response()
        }
        Inbound::Other(value) => {
            if !token_matches(&st, &token) {
                warn!("chat update on wrong webhook path rejected");
                return StatusCode::FORBIDDEN.into_response();
            }
            let update: Update = match serde_json::from_value(value) {
                Ok(u) => u,
                Err(e) => {
                    warn!(error = %e, "malformed chat update");
                    return (StatusCode::BAD_REQUEST, "Error: malformed update").into_response();
                }
            };
            // Unauthorized and unknown commands are still acknowledged so the
            // chat platform does not redeliver them.
            handle_update(&st, update).await;
            StatusCode::OK.into_response()
        }
    }
}
