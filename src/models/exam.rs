// src/models/exam.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub question_id: i64,
    pub selected_answer: String,
}

/// DTO for submitting an exam attempt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExamSubmission {
    pub exam_id: i64,
    #[serde(default)]
    pub answers: Vec<AnswerSubmission>,
}

/// Per-question grading outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub question_id: i64,
    pub text: String,
    pub options: Vec<String>,
    /// Empty when the question was not answered.
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExamFeedbackResult {
    pub exam_id: i64,
    /// In the exam's canonical question order.
    pub feedback_list: Vec<AnswerFeedback>,
    pub correct: u32,
    pub total: u32,
    /// Rounded percentage, 0..=100.
    pub percentage: u32,
    pub recommendations: Vec<String>,
    pub motivational_message: Option<String>,
}
