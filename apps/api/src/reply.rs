//! Webhook reply parsing.
//!
//! Workflow webhooks answer with arbitrary text: a JSON object (often wrapping
//! the payload in an `output` field, sometimes as a JSON string that itself
//! holds `{"output": ...}`), or plain text. `parse_reply` classifies the body
//! once; `ParsedReply::output_text` extracts what should be displayed.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    /// Body was valid JSON.
    Parsed(Value),
    /// Body is not JSON and does not look like it.
    PlainText(String),
    /// Body looks like JSON (starts with `{` or `[`) but does not parse.
    Malformed { raw: String, reason: String },
}

pub fn parse_reply(raw: &str) -> ParsedReply {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => ParsedReply::Parsed(value),
        Err(e) => {
            let trimmed = raw.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                ParsedReply::Malformed {
                    raw: raw.to_string(),
                    reason: e.to_string(),
                }
            } else {
                ParsedReply::PlainText(raw.to_string())
            }
        }
    }
}

impl ParsedReply {
    /// Text to display, following `output` through at most two JSON layers.
    pub fn output_text(&self) -> String {
        match self {
            ParsedReply::Parsed(value) => match value.get("output") {
                Some(Value::String(inner)) => match serde_json::from_str::<Value>(inner) {
                    Ok(nested) => match nested.get("output") {
                        Some(output) => value_text(output),
                        None => inner.clone(),
                    },
                    Err(_) => inner.clone(),
                },
                Some(output) => value_text(output),
                None => value_text(value),
            },
            ParsedReply::PlainText(text) => text.clone(),
            ParsedReply::Malformed { raw, .. } => raw.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ParsedReply::Parsed(_) => "parsed",
            ParsedReply::PlainText(_) => "plain_text",
            ParsedReply::Malformed { .. } => "malformed",
        }
    }
}

/// Strings verbatim, everything else as compact JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
