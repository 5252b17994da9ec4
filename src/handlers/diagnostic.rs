// src/handlers/diagnostic.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};

use crate::{
    error::AppError,
    grading::{GradingPolicy, grade_diagnostic},
    models::{
        diagnostic::{
            DiagnosticFeedback, DiagnosticQuestion, DiagnosticQuestionsParams,
            DiagnosticSubmission,
        },
        placement::PlacementRecord,
    },
    store::QuizStore,
    utils::jwt::Claims,
};

/// Lists a course's diagnostic questions for levels `1..=level`.
///
/// All levels are returned when `level` is omitted. Questions come ordered by
/// level, then id, which is the order the client presents them in.
#[utoipa::path(
    get,
    path = "/api/exams/diagnostic/questions",
    params(DiagnosticQuestionsParams),
    responses(
        (status = 200, description = "Diagnostic questions", body = Vec<DiagnosticQuestion>),
        (status = 400, description = "Invalid level"),
        (status = 404, description = "Unknown course or no questions")
    ),
    tag = "diagnostic"
)]
pub async fn get_diagnostic_questions(
    State(store): State<Arc<dyn QuizStore>>,
    params: Result<Query<DiagnosticQuestionsParams>, QueryRejection>,
) -> Result<Json<Vec<DiagnosticQuestion>>, AppError> {
    let Query(params) = params?;

    if params.level.is_some_and(|level| level < 1) {
        return Err(AppError::Validation("level must be at least 1".to_string()));
    }

    if !store.course_exists(params.course_id).await? {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let questions: Vec<DiagnosticQuestion> = store
        .diagnostic_questions(params.course_id)
        .await?
        .into_iter()
        .filter(|q| params.level.is_none_or(|max| q.level <= max))
        .collect();

    if questions.is_empty() {
        return Err(AppError::NotFound(
            "No diagnostic questions for this course".to_string(),
        ));
    }

    Ok(Json(questions))
}

/// Grades a completed diagnostic and records the resulting placement.
///
/// * Resubmitting overwrites the user's previous placement for the course.
/// * An empty answer map is graded (every level fails) and flagged in the response.
#[utoipa::path(
    post,
    path = "/api/diagnostic/submit",
    request_body = DiagnosticSubmission,
    responses(
        (status = 200, description = "Placement feedback", body = DiagnosticFeedback),
        (status = 400, description = "Malformed submission or course without diagnostic questions"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Unknown course")
    ),
    security(("bearer" = [])),
    tag = "diagnostic"
)]
pub async fn submit_diagnostic(
    State(store): State<Arc<dyn QuizStore>>,
    State(policy): State<GradingPolicy>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<DiagnosticSubmission>, JsonRejection>,
) -> Result<Json<DiagnosticFeedback>, AppError> {
    let Json(req) = payload?;
    let user_id = claims.user_id()?;

    if !store.course_exists(req.course_id).await? {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let bank = store.diagnostic_questions(req.course_id).await?;
    let feedback = grade_diagnostic(req.course_id, req.max_level, &req.answers, &bank, &policy)?;

    if feedback.empty_submission {
        tracing::warn!(
            user_id,
            course_id = req.course_id,
            "Diagnostic submitted without any answers"
        );
    }

    store
        .save_placement(user_id, req.course_id, req.max_level, &feedback)
        .await?;

    tracing::info!(
        user_id,
        course_id = req.course_id,
        max_level = req.max_level,
        levels_passed = feedback.levels_passed,
        section = %feedback.recommended_starting_section,
        "Diagnostic graded"
    );

    Ok(Json(feedback))
}

/// Returns the caller's latest placement for a course.
#[utoipa::path(
    get,
    path = "/api/diagnostic/placement/{courseId}",
    params(("courseId" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Latest placement", body = PlacementRecord),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No placement recorded")
    ),
    security(("bearer" = [])),
    tag = "diagnostic"
)]
pub async fn get_placement(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<Json<PlacementRecord>, AppError> {
    let user_id = claims.user_id()?;

    let record = store
        .placement(user_id, course_id)
        .await?
        .ok_or(AppError::NotFound("No placement recorded for this course".to_string()))?;

    Ok(Json(record))
}
