// src/models/diagnostic.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::question::{Gradable, validate_answer_key, validate_options};

/// Represents the 'diagnostic_questions' table.
/// A placement question tied to a course and a difficulty level.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticQuestion {
    pub id: i64,
    pub course_id: i64,
    pub level: i32,
    #[sqlx(rename = "question_text")]
    pub text: String,
    #[sqlx(json)]
    pub options: Vec<String>,
    pub correct_answer: String,
    pub feedback: Option<String>,
    /// Section recommended when placement stops at this question's level.
    pub recommended_starting_section: String,
}

impl Gradable for DiagnosticQuestion {
    fn id(&self) -> i64 {
        self.id
    }

    fn correct_answer(&self) -> &str {
        &self.correct_answer
    }
}

/// Query parameters for fetching diagnostic questions.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DiagnosticQuestionsParams {
    pub course_id: i64,
    /// Highest level to include. All levels when omitted.
    pub level: Option<i32>,
}

/// DTO for submitting a completed diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSubmission {
    pub course_id: i64,

    /// Highest difficulty level the learner was shown.
    pub max_level: i32,

    /// Key: Question ID. Value: the selected option.
    #[serde(default)]
    pub answers: HashMap<i64, String>,
}

/// Outcome of one difficulty level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LevelResult {
    pub level: i32,
    /// Percentage in 0..=100.
    pub score: f64,
    pub passed: bool,
    pub correct_answers: u32,
    pub total_questions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticFeedback {
    /// One entry per level, ascending.
    pub results: Vec<LevelResult>,
    pub overall_result: String,
    pub recommended_starting_section: String,
    /// Levels passed before the first failure.
    pub levels_passed: u32,
    /// Set when the submission carried no answers at all.
    pub empty_submission: bool,
}

/// DTO for creating a diagnostic question.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_diagnostic_key))]
pub struct CreateDiagnosticQuestionRequest {
    #[validate(range(min = 1))]
    pub course_id: i64,
    #[validate(range(min = 1, max = 100))]
    pub level: i32,
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: String,
    #[validate(length(max = 2000))]
    pub feedback: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub recommended_starting_section: String,
}

fn validate_diagnostic_key(req: &CreateDiagnosticQuestionRequest) -> Result<(), ValidationError> {
    validate_answer_key(&req.options, &req.correct_answer)
}
