//! HTTP entry point for streaming AI queries.
//!
//! Posts the payload once (no retries) and hands the chunked body to the consumer.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::stream::consumer::{consume, StreamHandler, StreamOutcome};

/// Message reported when the endpoint answers with a non-success status.
pub const QUERY_FAILED: &str = "AI query failed";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for an endpoint that answers with `data: <json>` event lines.
#[derive(Clone)]
pub struct AiQueryClient {
    client: Client,
    url: String,
}

impl AiQueryClient {
    pub fn new(url: String) -> Self {
        // No total timeout: a long answer is still a healthy stream.
        Self {
            client: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POSTs `payload` and dispatches the streamed events into `handler`.
    pub async fn query_stream<P, H>(&self, payload: &P, handler: &mut H) -> StreamOutcome
    where
        P: Serialize + ?Sized,
        H: StreamHandler + Send + ?Sized,
    {
        let response = match self.client.post(&self.url).json(payload).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("AI query request to {} failed: {e}", self.url);
                handler.on_error(e.to_string());
                return StreamOutcome::Failed;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("AI query endpoint returned {status}");
            handler.on_error(QUERY_FAILED.to_string());
            return StreamOutcome::Failed;
        }

        debug!("AI query stream opened ({status})");
        let mut response = response;
        consume(&mut response, handler).await
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use axum::{body::Body, http::StatusCode, routing::post, Router};
    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::stream::consumer::tests::Recorder;
    use crate::test_support::serve;

    fn streaming_body(frames: Vec<&'static str>) -> Body {
        let chunks = frames
            .into_iter()
            .map(|f| Ok::<_, Infallible>(Bytes::from_static(f.as_bytes())));
        Body::from_stream(futures_util::stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_streams_chunks_and_completes() {
        let router = Router::new().route(
            "/query",
            post(|| async {
                streaming_body(vec![
                    "data: {\"type\":\"chunk\",\"content\":\"Le \"}\n",
                    "data: {\"type\":\"chunk\",\"con",
                    "tent\":\"chat\"}\n\n",
                    "data: {\"type\":\"complete\",\"full_response\":\"Le chat\"}\n",
                ])
            }),
        );
        let base = serve(router).await;
        let client = AiQueryClient::new(format!("{base}/query"));

        let mut recorder = Recorder::default();
        let outcome = client
            .query_stream(&json!({"query_type": "quick"}), &mut recorder)
            .await;

        assert_eq!(outcome, StreamOutcome::Completed);
        assert_eq!(recorder.chunks, vec!["Le ", "chat"]);
        assert_eq!(recorder.completes, vec!["Le chat"]);
        assert!(recorder.errors.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_reports_generic_failure() {
        let router = Router::new().route(
            "/query",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        );
        let base = serve(router).await;
        let client = AiQueryClient::new(format!("{base}/query"));

        let mut recorder = Recorder::default();
        let outcome = client.query_stream(&json!({}), &mut recorder).await;

        assert_eq!(outcome, StreamOutcome::Failed);
        assert_eq!(recorder.errors, vec![QUERY_FAILED]);
        assert!(recorder.chunks.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AiQueryClient::new(format!("http://{addr}/query"));
        let mut recorder = Recorder::default();
        let outcome = client.query_stream(&json!({}), &mut recorder).await;

        assert_eq!(outcome, StreamOutcome::Failed);
        assert_eq!(recorder.errors.len(), 1);
        assert!(!recorder.errors[0].is_empty());
    }
}
