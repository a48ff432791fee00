use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::highlight::{HighlightIndex, Segment};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct HighlightRequest {
    pub article_id: Uuid,
    #[serde(default)]
    pub user_id: String,
    pub text: String,
}

#[derive(Serialize)]
pub struct HighlightResponse {
    pub segments: Vec<Segment>,
    /// Number of highlighted segments.
    pub highlighted: usize,
}

/// POST /api/v1/highlight
/// Marks every word of `text` the user has already queried for this article.
pub async fn handle_highlight(
    State(state): State<AppState>,
    Json(req): Json<HighlightRequest>,
) -> Result<Json<HighlightResponse>, AppError> {
    let records = state.store.list(req.article_id, &req.user_id).await?;
    let index = HighlightIndex::from_words(records.iter().map(|r| &r.selected_text))?;
    let segments = index.segments(&req.text);
    let highlighted = segments.iter().filter(|s| s.is_highlight()).count();
    Ok(Json(HighlightResponse {
        segments,
        highlighted,
    }))
}
