use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use screening_core::{CompanyVerdict, Mandate, ProgressSink, ScreenedCompany, ScreeningError};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::AppState;
use crate::screening_routes::ScreeningRequest;

/// Bridges the sync engine's progress callbacks into the socket task.
struct ChannelProgress(mpsc::Sender<CompanyVerdict>);

impl ProgressSink for ChannelProgress {
    fn on_company(&self, verdict: &CompanyVerdict) {
        // Receiver gone means the client went away; the pass still finishes.
        let _ = self.0.blocking_send(verdict.clone());
    }
}

async fn send_event(socket: &mut WebSocket, event: serde_json::Value) -> bool {
    socket
        .send(Message::Text(event.to_string()))
        .await
        .is_ok()
}

// ---------------------------------------------------------------------------
// WebSocket handler: /api/ws/screen
// ---------------------------------------------------------------------------

async fn ws_screen_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_screen_socket(socket, state))
}

async fn handle_screen_socket(mut socket: WebSocket, state: AppState) {
    // First client frame carries the screening request.
    let request = loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => {
                match serde_json::from_str::<ScreeningRequest>(&text) {
                    Ok(request) => break request,
                    Err(e) => {
                        warn!("rejecting malformed screening request: {e}");
                        let _ = send_event(
                            &mut socket,
                            json!({
                                "type": "error",
                                "content": format!("Invalid request: {e}")
                            }),
                        )
                        .await;
                        return;
                    }
                }
            }
            Some(Ok(Message::Close(_))) | None => return,
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                debug!("websocket receive error: {e}");
                return;
            }
        }
    };

    if request.mandate_parameters.is_empty() || request.companies.is_empty() {
        let err = if request.mandate_parameters.is_empty() {
            ScreeningError::EmptyMandate
        } else {
            ScreeningError::EmptyUniverse
        };
        let _ = send_event(
            &mut socket,
            json!({ "type": "error", "content": format!("Invalid request: {err}") }),
        )
        .await;
        return;
    }

    let mandate = Mandate::from_json_object(&request.mandate_parameters);
    let companies = request.companies;
    let total_screened = companies.len();
    let screener = Arc::clone(&state.screener);

    let (tx, mut rx) = mpsc::channel::<CompanyVerdict>(64);
    let task = tokio::task::spawn_blocking(move || {
        let sink = ChannelProgress(tx);
        screener.screen_with_progress(&mandate, &companies, &sink)
    });

    // Forward per-company progress while the pass runs; the channel closes
    // when the engine finishes.
    while let Some(verdict) = rx.recv().await {
        let delivered = send_event(
            &mut socket,
            json!({ "type": "progress", "content": verdict }),
        )
        .await;
        if !delivered {
            debug!("client disconnected mid-screen");
            break;
        }
    }

    // Closing the channel fails any pending sends, so a disconnect mid-pass
    // cannot leave the engine wedged on a full buffer.
    rx.close();
    while rx.try_recv().is_ok() {}

    match task.await {
        Ok(passed) => {
            let total_passed = passed.len();
            let company_details: Vec<_> = passed
                .into_iter()
                .map(ScreenedCompany::into_record)
                .collect();
            let _ = send_event(
                &mut socket,
                json!({
                    "type": "final_result",
                    "content": {
                        "company_details": company_details,
                        "total_screened": total_screened,
                        "total_passed": total_passed
                    }
                }),
            )
            .await;
        }
        Err(e) => {
            warn!("screening task failed: {e}");
            let _ = send_event(
                &mut socket,
                json!({ "type": "error", "content": format!("Server error: {e}") }),
            )
            .await;
        }
    }

    let _ = socket.send(Message::Close(None)).await;
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/ws/screen", get(ws_screen_handler))
}
