//! Stream consumer: reads a chunked body and dispatches events to a handler.
//!
//! Dispatch rules:
//! - `chunk` → `on_chunk`, keep reading
//! - `complete` → `on_complete`, return immediately (buffered lines are dropped)
//! - `error` → `on_error`, return immediately
//! - read failure → `on_error` with the failure message
//! - end of body without a terminal event → no callback (silent)

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::stream::decoder::LineDecoder;
use crate::stream::event::{parse_line, ParsedLine, StreamEvent};
use crate::stream::StreamError;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Anything that yields raw body chunks in order.
#[async_trait]
pub trait ChunkSource: Send {
    /// Returns the next chunk, or `None` once the body is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, StreamError>;
}

#[async_trait]
impl ChunkSource for reqwest::Response {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, StreamError> {
        Ok(self.chunk().await?)
    }
}

/// Receives the dispatched events of one request.
pub trait StreamHandler {
    fn on_chunk(&mut self, content: String);
    fn on_complete(&mut self, full_response: String);
    fn on_error(&mut self, error: String);

    /// Polled before each read and each dispatched line. Returning `true`
    /// stops consumption without any further callback.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Closure-backed handler.
pub struct Callbacks<C, D, E> {
    pub on_chunk: C,
    pub on_complete: D,
    pub on_error: E,
}

impl<C, D, E> StreamHandler for Callbacks<C, D, E>
where
    C: FnMut(String),
    D: FnMut(String),
    E: FnMut(String),
{
    fn on_chunk(&mut self, content: String) {
        (self.on_chunk)(content)
    }

    fn on_complete(&mut self, full_response: String) {
        (self.on_complete)(full_response)
    }

    fn on_error(&mut self, error: String) {
        (self.on_error)(error)
    }
}

/// How a consumption ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// `on_complete` fired.
    Completed,
    /// `on_error` fired.
    Failed,
    /// Body ended without a terminal event.
    Ended,
    /// The handler asked to stop.
    Cancelled,
}

/// Drives `source` to a terminal event, dispatching into `handler`.
/// At most one of `on_complete` / `on_error` fires.
pub async fn consume<S, H>(source: &mut S, handler: &mut H) -> StreamOutcome
where
    S: ChunkSource + ?Sized,
    H: StreamHandler + ?Sized,
{
    let mut decoder = LineDecoder::new();

    loop {
        if handler.is_cancelled() {
            return StreamOutcome::Cancelled;
        }

        let chunk = match source.next_chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => {
                if !decoder.remainder().is_empty() {
                    debug!(
                        "Stream ended with an unterminated line ({} bytes), ignoring it",
                        decoder.remainder().len()
                    );
                }
                return StreamOutcome::Ended;
            }
            Err(e) => {
                warn!("Stream read failed: {e}");
                let message = e.to_string();
                handler.on_error(if message.is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    message
                });
                return StreamOutcome::Failed;
            }
        };

        for line in decoder.push(&chunk) {
            if handler.is_cancelled() {
                return StreamOutcome::Cancelled;
            }
            match parse_line(&line) {
                ParsedLine::Ignored => {}
                ParsedLine::Malformed(reason) => {
                    warn!("Skipping malformed stream line: {reason}");
                }
                ParsedLine::Event(StreamEvent::Chunk { content }) => handler.on_chunk(content),
                ParsedLine::Event(StreamEvent::Complete { full_response }) => {
                    handler.on_complete(full_response);
                    return StreamOutcome::Completed;
                }
                ParsedLine::Event(StreamEvent::Error { error }) => {
                    handler.on_error(error);
                    return StreamOutcome::Failed;
                }
            }
        }
    }
}
