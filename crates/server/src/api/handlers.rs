use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::Stream;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::ErrorResponse;
use crate::config::AppState;
use crate::session::{DispatchError, SessionRegistry};

/// Removes the session when the SSE stream is dropped, however that happens.
struct SessionGuard {
    sessions: Arc<SessionRegistry>,
    session_id: Uuid,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions.close(&self.session_id);
    }
}

/// `GET /sse` — open a session and stream responses back to the caller.
///
/// The first event names the endpoint to POST messages to; every JSON-RPC
/// response then arrives as a `message` event on this stream. The stream
/// stays open across invocations.
pub async fn open_session(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (session_id, mut outbound) = state.sessions.open();
    info!(%session_id, "session opened");

    let guard = SessionGuard {
        sessions: state.sessions.clone(),
        session_id,
    };

    let stream = async_stream::stream! {
        let _guard = guard;

        yield Ok(Event::default()
            .event("endpoint")
            .data(format!("/messages?session_id={}", session_id)));

        while let Some(response) = outbound.recv().await {
            match serde_json::to_string(&response) {
                Ok(payload) => yield Ok(Event::default().event("message").data(payload)),
                Err(err) => warn!(%session_id, error = %err, "failed to serialize response"),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    session_id: Uuid,
}

/// `POST /messages?session_id=` — queue one JSON-RPC message.
///
/// Accepted messages are answered over the session's SSE stream, including
/// JSON-RPC parse errors; only transport-level problems surface here.
pub async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    match state.sessions.dispatch(&query.session_id, body) {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(DispatchError::UnknownSession) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Unknown session")),
        )
            .into_response(),
        Err(DispatchError::Busy) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Session queue is full")),
        )
            .into_response(),
    }
}
