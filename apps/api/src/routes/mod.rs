pub mod ai_query;
pub mod health;
pub mod highlight;
pub mod media;
pub mod queries;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Query history
        .route(
            "/api/v1/queries",
            get(queries::handle_list_queries).post(queries::handle_create_query),
        )
        .route("/api/v1/queries/:id", delete(queries::handle_delete_query))
        .route("/api/v1/highlight", post(highlight::handle_highlight))
        // AI analysis (streamed)
        .route("/api/v1/ai-query", post(ai_query::handle_ai_query))
        // Workflow webhooks
        .route("/api/v1/tts", post(media::handle_tts))
        .route("/api/v1/cv/experience", post(media::handle_cv_experience))
        .with_state(state)
}
