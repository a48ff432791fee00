//! Client for non-streaming workflow webhooks (CV generation, text-to-speech).
//!
//! Single-shot POSTs with a hard timeout, no retries. Text replies go through
//! `reply::parse_reply`; audio replies are returned as raw bytes.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::reply::{parse_reply, ParsedReply};

pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(180);

const DEFAULT_AUDIO_TYPE: &str = "audio/mpeg";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Webhook request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Binary audio returned by a TTS webhook.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Bytes,
    pub content_type: String,
}

#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
    timeout: Duration,
}

impl WebhookClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            timeout,
        }
    }

    /// POSTs `payload` and classifies the text reply.
    pub async fn post_json<P>(&self, url: &str, payload: &P) -> Result<ParsedReply, WebhookError>
    where
        P: Serialize + ?Sized,
    {
        let response = self.send(url, payload).await?;
        let body = response.text().await.map_err(|e| self.classify(e))?;
        let reply = parse_reply(&body);
        debug!("Webhook {url} replied with {} ({} bytes)", reply.kind(), body.len());
        Ok(reply)
    }

    /// POSTs `payload` and returns the reply body as audio.
    pub async fn post_for_audio<P>(&self, url: &str, payload: &P) -> Result<AudioClip, WebhookError>
    where
        P: Serialize + ?Sized,
    {
        let response = self.send(url, payload).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_AUDIO_TYPE)
            .to_string();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        debug!("Webhook {url} returned {} bytes of {content_type}", bytes.len());
        Ok(AudioClip {
            bytes,
            content_type,
        })
    }

    async fn send<P>(&self, url: &str, payload: &P) -> Result<Response, WebhookError>
    where
        P: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Webhook {url} returned {status}: {body}");
            return Err(WebhookError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn classify(&self, e: reqwest::Error) -> WebhookError {
        if e.is_timeout() {
            WebhookError::Timeout(self.timeout)
        } else {
            WebhookError::Http(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::test_support::serve;

    #[tokio::test]
    async fn test_post_json_parses_nested_output() {
        let router = Router::new().route(
            "/cv",
            post(|Json(body): Json<Value>| async move {
                let title = body["title"].as_str().unwrap_or_default().to_string();
                json!({ "output": json!({ "output": format!("Experience for {title}") }).to_string() })
                    .to_string()
            }),
        );
        let base = serve(router).await;
        let client = WebhookClient::new(Duration::from_secs(5));

        let reply = client
            .post_json(&format!("{base}/cv"), &json!({"title": "Rust Engineer"}))
            .await
            .unwrap();
        assert_eq!(reply.output_text(), "Experience for Rust Engineer");
    }

    #[tokio::test]
    async fn test_post_for_audio_keeps_bytes_and_type() {
        let router = Router::new().route(
            "/tts",
            post(|| async { ([("content-type", "audio/wav")], vec![0u8, 1, 2, 3]) }),
        );
        let base = serve(router).await;
        let client = WebhookClient::new(Duration::from_secs(5));

        let clip = client
            .post_for_audio(&format!("{base}/tts"), &json!({"text": "bonjour"}))
            .await
            .unwrap();
        assert_eq!(clip.content_type, "audio/wav");
        assert_eq!(clip.bytes.as_ref(), &[0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let router = Router::new().route(
            "/cv",
            post(|| async { (StatusCode::BAD_GATEWAY, "workflow down") }),
        );
        let base = serve(router).await;
        let client = WebhookClient::new(Duration::from_secs(5));

        let err = client
            .post_json(&format!("{base}/cv"), &json!({}))
            .await
            .unwrap_err();
        match err {
            WebhookError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "workflow down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_slow_webhook_times_out() {
        let router = Router::new().route(
            "/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );
        let base = serve(router).await;
        let client = WebhookClient::new(Duration::from_millis(100));

        let err = client
            .post_json(&format!("{base}/slow"), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::Timeout(_)), "got {err}");
    }
}
