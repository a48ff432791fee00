// Incremental response consumer: `data: <json>` framing over a chunked POST body.
// Reading, decoding and dispatch live here; presentation (typing replay) does not.

pub mod client;
pub mod consumer;
pub mod decoder;
pub mod event;
pub mod gate;

use thiserror::Error;

pub use client::AiQueryClient;
pub use consumer::{consume, Callbacks, ChunkSource, StreamHandler, StreamOutcome};
pub use event::StreamEvent;
pub use gate::{RequestGate, RequestToken};

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stream read failed: {0}")]
    Read(String),
}
