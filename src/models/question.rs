// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Anything with a single authoritative answer that a learner's choice is compared against.
pub trait Gradable {
    fn id(&self) -> i64;

    fn correct_answer(&self) -> &str;

    /// Strict string matching against the answer key.
    fn is_correct(&self, selected: &str) -> bool {
        selected == self.correct_answer()
    }
}

/// Represents the 'questions' table: one question of a section exam.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,

    pub exam_id: i64,

    /// Difficulty tier, ascending.
    pub level: i32,

    #[sqlx(rename = "question_text")]
    pub text: String,

    /// Options in display order. Stored as a JSON array.
    #[sqlx(json)]
    pub options: Vec<String>,

    pub correct_answer: String,

    /// Explanation shown after grading.
    pub feedback: Option<String>,

    /// Canonical order within the exam.
    pub position: i32,
}

impl Gradable for Question {
    fn id(&self) -> i64 {
        self.id
    }

    fn correct_answer(&self) -> &str {
        &self.correct_answer
    }
}

/// DTO for creating an exam question.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_question_key))]
pub struct CreateQuestionRequest {
    #[validate(range(min = 1))]
    pub exam_id: i64,
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
    /// Appended after the exam's last question when omitted.
    pub position: Option<i32>,
}

fn validate_question_key(req: &CreateQuestionRequest) -> Result<(), ValidationError> {
    validate_answer_key(&req.options, &req.correct_answer)
}

/// A question needs at least two distinct, bounded options.
pub(crate) fn validate_options(options: &[String]) -> Result<(), ValidationError> {
    if options.len() < 2 {
        return Err(ValidationError::new("at_least_two_options_required"));
    }
    for (i, opt) in options.iter().enumerate() {
        if opt.trim().is_empty() {
            return Err(ValidationError::new("option_cannot_be_blank"));
        }
        if opt.len() > 500 {
            return Err(ValidationError::new("option_too_long"));
        }
        if options[..i].contains(opt) {
            return Err(ValidationError::new("options_must_be_unique"));
        }
    }
    Ok(())
}

/// The answer key must be one of the options, verbatim.
pub(crate) fn validate_answer_key(
    options: &[String],
    correct_answer: &str,
) -> Result<(), ValidationError> {
    if !options.iter().any(|o| o == correct_answer) {
        return Err(ValidationError::new("correct_answer_not_in_options"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(options: &[&str], correct: &str) -> CreateQuestionRequest {
        CreateQuestionRequest {
            exam_id: 1,
            level: 1,
            text: "What is 2 + 2?".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct.to_string(),
            feedback: None,
            position: None,
        }
    }

    #[test]
    fn test_valid_question_passes() {
        assert!(request(&["3", "4", "5"], "4").validate().is_ok());
    }

    #[test]
    fn test_answer_must_be_an_option() {
        let errors = request(&["3", "4"], "22").validate().unwrap_err();
        assert!(errors.to_string().contains("correct_answer_not_in_options"));
    }

    #[test]
    fn test_options_must_be_unique_and_plural() {
        assert!(request(&["4"], "4").validate().is_err());
        assert!(request(&["4", "4"], "4").validate().is_err());
        assert!(request(&["4", "  "], "4").validate().is_err());
    }

    #[test]
    fn test_is_correct_is_strict() {
        let q = Question {
            id: 1,
            exam_id: 1,
            level: 1,
            text: "Capital of France?".to_string(),
            options: vec!["Paris".to_string(), "Lyon".to_string()],
            correct_answer: "Paris".to_string(),
            feedback: None,
            position: 0,
        };
        assert!(q.is_correct("Paris"));
        assert!(!q.is_correct("paris"));
        assert!(!q.is_correct(""));
    }
}
