use std::sync::Arc;

use crate::config::Config;
use crate::store::QueryStore;
use crate::stream::{AiQueryClient, RequestGate};
use crate::webhook::WebhookClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres or in-memory, chosen at startup from `DATABASE_URL`.
    pub store: Arc<dyn QueryStore>,
    pub ai: AiQueryClient,
    pub webhook: WebhookClient,
    /// Supersedes older AI queries for the same user, article and selection.
    pub gate: RequestGate,
    pub config: Config,
}
