use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExperienceRequest {
    pub title: String,
    pub full_job_description: String,
}

#[derive(Serialize)]
pub struct ExperienceResponse {
    pub output: String,
    /// How the workflow reply was read: `parsed`, `plain_text` or `malformed`.
    pub format: &'static str,
}

/// POST /api/v1/tts
pub async fn handle_tts(
    State(state): State<AppState>,
    Json(req): Json<TtsRequest>,
) -> Result<Response, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text is required".to_string()));
    }
    let url = state
        .config
        .tts_webhook_url
        .as_deref()
        .ok_or(AppError::NotConfigured("TTS_WEBHOOK_URL"))?;

    let clip = state.webhook.post_for_audio(url, &req).await?;
    Ok(([(header::CONTENT_TYPE, clip.content_type)], clip.bytes).into_response())
}

/// POST /api/v1/cv/experience
pub async fn handle_cv_experience(
    State(state): State<AppState>,
    Json(req): Json<ExperienceRequest>,
) -> Result<Json<ExperienceResponse>, AppError> {
    if req.title.trim().is_empty() || req.full_job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "title and full_job_description are required".to_string(),
        ));
    }
    let url = state
        .config
        .cv_webhook_url
        .as_deref()
        .ok_or(AppError::NotConfigured("CV_WEBHOOK_URL"))?;

    let reply = state.webhook.post_json(url, &req).await?;
    Ok(Json(ExperienceResponse {
        output: reply.output_text(),
        format: reply.kind(),
    }))
}
