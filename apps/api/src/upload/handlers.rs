//! Axum route handlers for the candidate upload workflow.

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::history::{EntryId, HistoryEntry};
use crate::state::AppState;
use crate::upload::session::SessionView;

/// Multipart field carrying the résumé file.
pub const RESUME_FIELD: &str = "resume";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SelectFileRequest {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: EntryId,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub entry_id: EntryId,
    pub confidence_pct: u32,
    pub analysis: AnalysisResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/candidate/session
pub async fn handle_get_session(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<SessionView> {
    Json(state.sessions.view(user.id).await)
}

/// POST /api/v1/candidate/session/file
///
/// Accepts either a multipart body with a `resume` file field or JSON
/// `{"filename": ...}`. Only the filename is kept; file bytes are never read.
pub async fn handle_select_file(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<SessionView>, AppError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let filename = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        filename_from_multipart(multipart).await?
    } else {
        let Json(body) = Json::<SelectFileRequest>::from_request(request, &state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        body.filename
    };

    let view = state.sessions.select_file(user.id, &filename).await?;
    Ok(Json(view))
}

async fn filename_from_multipart(mut multipart: Multipart) -> Result<String, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() == Some(RESUME_FIELD) {
            return field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| AppError::Validation("resume field has no filename".to_string()));
        }
    }
    Err(AppError::Validation(format!(
        "multipart body is missing the '{RESUME_FIELD}' field"
    )))
}

/// POST /api/v1/candidate/session/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let id = state.sessions.upload(user.id, &state.history).await?;
    let session = state.sessions.view(user.id).await;
    Ok((StatusCode::CREATED, Json(UploadResponse { id, session })))
}

/// POST /api/v1/candidate/session/analyze
///
/// Blocks for the analyzer's delay, then returns the report that was written
/// back to the history entry.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let (entry_id, analysis) = state
        .sessions
        .analyze(user.id, &state.history, state.analyzer.as_ref())
        .await?;
    Ok(Json(AnalyzeResponse {
        entry_id,
        confidence_pct: analysis.confidence_pct(),
        analysis,
    }))
}

/// GET /api/v1/candidate/history
pub async fn handle_candidate_history(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Vec<HistoryEntry>> {
    let entries = state
        .history
        .entries()
        .await
        .into_iter()
        .filter(|e| e.user_id == user.id)
        .collect();
    Json(entries)
}
