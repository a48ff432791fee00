use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewQueryRecord, QueryRecord};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub article_id: Uuid,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: String,
}

/// GET /api/v1/queries
pub async fn handle_list_queries(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<QueryRecord>>, AppError> {
    let records = state.store.list(params.article_id, &params.user_id).await?;
    Ok(Json(records))
}

/// POST /api/v1/queries
/// Saving a record for an existing (article, user, text, prompt type) replaces it.
pub async fn handle_create_query(
    State(state): State<AppState>,
    Json(req): Json<NewQueryRecord>,
) -> Result<(StatusCode, Json<QueryRecord>), AppError> {
    let missing = req.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    let record = state.store.save(req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/v1/queries/:id
pub async fn handle_delete_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserQuery>,
) -> Result<StatusCode, AppError> {
    if state.store.delete(id, &params.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Query {id} not found")))
    }
}
