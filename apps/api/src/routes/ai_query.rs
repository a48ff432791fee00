use std::convert::Infallible;

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::errors::AppError;
use crate::models::AiQueryRequest;
use crate::state::AppState;
use crate::stream::{RequestGate, RequestToken, StreamEvent, StreamHandler, StreamOutcome};

pub const SUPERSEDED: &str = "superseded by a newer request";

/// Relays upstream events to the client while its request is still current.
struct Forwarder {
    tx: mpsc::UnboundedSender<StreamEvent>,
    gate: RequestGate,
    token: RequestToken,
    full_response: Option<String>,
}

impl StreamHandler for Forwarder {
    fn on_chunk(&mut self, content: String) {
        let _ = self.tx.send(StreamEvent::chunk(content));
    }

    // The complete event is sent after persistence.
    fn on_complete(&mut self, full_response: String) {
        self.full_response = Some(full_response);
    }

    fn on_error(&mut self, error: String) {
        let _ = self.tx.send(StreamEvent::error(error));
    }

    fn is_cancelled(&self) -> bool {
        self.tx.is_closed() || !self.gate.is_current(&self.token)
    }
}

/// POST /api/v1/ai-query
/// Streams the AI answer as `data: <json>` frames and stores the record once complete.
pub async fn handle_ai_query(
    State(state): State<AppState>,
    Json(req): Json<AiQueryRequest>,
) -> Result<Response, AppError> {
    req.validate().map_err(AppError::Validation)?;

    let token = state.gate.begin(req.gate_key());
    debug!(
        "AI query {} for article {} (generation {})",
        req.query_type.as_str(),
        req.article_id,
        token.generation()
    );

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(forward(state, req, token, tx));

    let frames = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|event| (Ok::<_, Infallible>(event.to_frame()), rx))
    });

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(frames),
    )
        .into_response())
}

async fn forward(
    state: AppState,
    req: AiQueryRequest,
    token: RequestToken,
    tx: mpsc::UnboundedSender<StreamEvent>,
) {
    let mut forwarder = Forwarder {
        tx,
        gate: state.gate.clone(),
        token,
        full_response: None,
    };
    let outcome = state.ai.query_stream(&req.upstream(), &mut forwarder).await;
    let Forwarder {
        tx,
        token,
        full_response,
        ..
    } = forwarder;

    let current = state.gate.is_current(&token);
    match (outcome, full_response) {
        (StreamOutcome::Completed, Some(full_response)) if current => {
            persist(&state, &req, &full_response).await;
            let _ = tx.send(StreamEvent::complete(full_response));
        }
        (StreamOutcome::Completed, _) | (StreamOutcome::Cancelled, _) if !current => {
            debug!("AI query generation {} superseded", token.generation());
            let _ = tx.send(StreamEvent::error(SUPERSEDED));
        }
        (outcome, _) => debug!("AI query ended: {outcome:?}"),
    }
    state.gate.finish(&token);
}

async fn persist(state: &AppState, req: &AiQueryRequest, full_response: &str) {
    let record = req.to_record(full_response.to_string());
    let missing = record.missing_fields();
    if !missing.is_empty() {
        debug!("Not storing AI answer, missing {}", missing.join(", "));
        return;
    }
    match state.store.save(record).await {
        Ok(saved) => info!("Stored AI answer as record {}", saved.id),
        Err(e) => error!("Failed to store AI answer: {e}"),
    }
}
