// src/store/mod.rs

//! Read access to the question banks and persistence of placement results.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::models::{
    diagnostic::{CreateDiagnosticQuestionRequest, DiagnosticFeedback, DiagnosticQuestion},
    placement::PlacementRecord,
    question::{CreateQuestionRequest, Question},
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The row a new record hangs off (course, exam) does not exist.
    #[error("{0} not found")]
    MissingParent(String),
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn course_exists(&self, course_id: i64) -> Result<bool, StoreError>;

    /// All diagnostic questions of a course, ordered by level then id.
    async fn diagnostic_questions(
        &self,
        course_id: i64,
    ) -> Result<Vec<DiagnosticQuestion>, StoreError>;

    async fn exam_exists(&self, exam_id: i64) -> Result<bool, StoreError>;

    /// The exam's questions in canonical order (position, then id).
    async fn exam_questions(&self, exam_id: i64) -> Result<Vec<Question>, StoreError>;

    async fn create_question(&self, req: &CreateQuestionRequest) -> Result<i64, StoreError>;

    async fn create_diagnostic_question(
        &self,
        req: &CreateDiagnosticQuestionRequest,
    ) -> Result<i64, StoreError>;

    /// Upserts the user's placement for a course. Resubmitting overwrites.
    async fn save_placement(
        &self,
        user_id: i64,
        course_id: i64,
        max_level: i32,
        feedback: &DiagnosticFeedback,
    ) -> Result<PlacementRecord, StoreError>;

    async fn placement(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<PlacementRecord>, StoreError>;
}
