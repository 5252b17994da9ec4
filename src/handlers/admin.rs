// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{diagnostic::CreateDiagnosticQuestionRequest, question::CreateQuestionRequest},
    store::QuizStore,
    utils::html::{clean_html, clean_optional},
};

/// Sanitizes question text; rejects it when nothing displayable is left.
fn sanitize_text(text: &str) -> Result<String, AppError> {
    let cleaned = clean_html(text).trim().to_string();
    if cleaned.is_empty() {
        return Err(AppError::Validation(
            "Question text is empty after sanitizing".to_string(),
        ));
    }
    Ok(cleaned)
}

/// Creates an exam question.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/questions",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created"),
        (status = 400, description = "Invalid question"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Unknown exam")
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn create_question(
    State(store): State<Arc<dyn QuizStore>>,
    payload: Result<Json<CreateQuestionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut payload) = payload?;
    payload.validate()?;

    // Options and the answer key stay verbatim so grading keeps matching.
    payload.text = sanitize_text(&payload.text)?;
    payload.feedback = clean_optional(payload.feedback.as_deref());

    let id = store.create_question(&payload).await?;
    tracing::info!(id, exam_id = payload.exam_id, "Exam question created");

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Creates a diagnostic question.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/diagnostic-questions",
    request_body = CreateDiagnosticQuestionRequest,
    responses(
        (status = 201, description = "Diagnostic question created"),
        (status = 400, description = "Invalid question"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Unknown course")
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn create_diagnostic_question(
    State(store): State<Arc<dyn QuizStore>>,
    payload: Result<Json<CreateDiagnosticQuestionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut payload) = payload?;
    payload.validate()?;

    payload.text = sanitize_text(&payload.text)?;
    payload.feedback = clean_optional(payload.feedback.as_deref());

    let id = store.create_diagnostic_question(&payload).await?;
    tracing::info!(
        id,
        course_id = payload.course_id,
        level = payload.level,
        "Diagnostic question created"
    );

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}
