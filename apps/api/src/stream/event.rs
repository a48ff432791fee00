//! Wire events carried by the `data: <json>` framing of the AI query stream.

use serde::{Deserialize, Serialize};

/// Prefix that marks an event line. Lines without it are ignored.
pub const DATA_PREFIX: &str = "data: ";

/// One event of the AI query stream, tagged on `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental text fragment.
    Chunk { content: String },
    /// Terminal event carrying the authoritative full text.
    Complete { full_response: String },
    /// Terminal failure.
    Error { error: String },
}

impl StreamEvent {
    pub fn chunk(content: impl Into<String>) -> Self {
        StreamEvent::Chunk {
            content: content.into(),
        }
    }

    pub fn complete(full_response: impl Into<String>) -> Self {
        StreamEvent::Complete {
            full_response: full_response.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        StreamEvent::Error {
            error: error.into(),
        }
    }

    /// True for `complete` and `error`; nothing is processed after a terminal event.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::Complete { .. } | StreamEvent::Error { .. }
        )
    }

    /// Encodes the event as one framed record: `data: <json>\n\n`.
    pub fn to_frame(&self) -> String {
        // Serializing a plain enum of strings cannot fail.
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("{DATA_PREFIX}{json}\n\n")
    }
}

/// Result of parsing a single line of the stream.
#[derive(Debug, PartialEq)]
pub enum ParsedLine {
    /// Not a `data: ` line (blank lines, comments, other fields).
    Ignored,
    Event(StreamEvent),
    /// A `data: ` line whose payload is not a valid event.
    Malformed(String),
}

/// Parses one complete line (without its trailing `\n`).
pub fn parse_line(line: &str) -> ParsedLine {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return ParsedLine::Ignored;
    };
    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => ParsedLine::Event(event),
        Err(e) => ParsedLine::Malformed(e.to_string()),
    }
}
