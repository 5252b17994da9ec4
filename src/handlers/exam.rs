// src/handlers/exam.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use crate::{
    error::AppError,
    grading::grade_exam,
    models::{
        exam::{ExamFeedbackResult, ExamSubmission},
        question::Question,
    },
    store::QuizStore,
};

fn check_exam_id(exam_id: i64) -> Result<(), AppError> {
    if exam_id < 1 {
        return Err(AppError::Validation("examId must be positive".to_string()));
    }
    Ok(())
}

/// Resolves an exam's questions, failing when the exam itself is unknown.
async fn resolve_exam(store: &dyn QuizStore, exam_id: i64) -> Result<Vec<Question>, AppError> {
    check_exam_id(exam_id)?;

    if !store.exam_exists(exam_id).await? {
        return Err(AppError::NotFound("Exam not found".to_string()));
    }

    Ok(store.exam_questions(exam_id).await?)
}

/// Lists an exam's questions in canonical order.
#[utoipa::path(
    get,
    path = "/api/exams/{examId}/questions",
    params(("examId" = i64, Path, description = "Exam id")),
    responses(
        (status = 200, description = "Exam questions", body = Vec<Question>),
        (status = 400, description = "Invalid exam id"),
        (status = 404, description = "Unknown exam")
    ),
    tag = "exam"
)]
pub async fn get_exam_questions(
    State(store): State<Arc<dyn QuizStore>>,
    Path(exam_id): Path<i64>,
) -> Result<Json<Vec<Question>>, AppError> {
    let questions = resolve_exam(&*store, exam_id).await?;
    Ok(Json(questions))
}

/// Grades an exam attempt.
///
/// Every question of the exam is reported, answered or not. Nothing is persisted.
#[utoipa::path(
    post,
    path = "/api/exams/evaluate",
    request_body = ExamSubmission,
    responses(
        (status = 200, description = "Per-question feedback", body = ExamFeedbackResult),
        (status = 400, description = "Malformed submission or invalid exam id"),
        (status = 404, description = "Unknown exam")
    ),
    tag = "exam"
)]
pub async fn evaluate_exam(
    State(store): State<Arc<dyn QuizStore>>,
    payload: Result<Json<ExamSubmission>, JsonRejection>,
) -> Result<Json<ExamFeedbackResult>, AppError> {
    let Json(req) = payload?;
    let questions = resolve_exam(&*store, req.exam_id).await?;

    let result = grade_exam(req.exam_id, &req.answers, &questions);

    tracing::info!(
        exam_id = req.exam_id,
        correct = result.correct,
        total = result.total,
        percentage = result.percentage,
        "Exam graded"
    );

    Ok(Json(result))
}
