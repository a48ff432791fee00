use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Response, Router};

use crate::config::Config;
use crate::state::AppState;
use crate::store::MemoryQueryStore;
use crate::stream::{AiQueryClient, RequestGate};
use crate::webhook::WebhookClient;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// State over an in-memory store. Webhook URLs are unset.
pub fn test_state(ai_query_url: &str) -> AppState {
    let config = Config {
        ai_query_url: ai_query_url.to_string(),
        database_url: None,
        tts_webhook_url: None,
        cv_webhook_url: None,
        webhook_timeout: Duration::from_secs(5),
        port: 0,
        rust_log: "debug".to_string(),
    };
    AppState {
        store: Arc::new(MemoryQueryStore::new()),
        ai: AiQueryClient::new(config.ai_query_url.clone()),
        webhook: WebhookClient::new(config.webhook_timeout),
        gate: RequestGate::new(),
        config,
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
