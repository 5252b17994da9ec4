// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::PgPool;

use super::{QuizStore, StoreError};
use crate::models::{
    diagnostic::{CreateDiagnosticQuestionRequest, DiagnosticFeedback, DiagnosticQuestion},
    placement::PlacementRecord,
    question::{CreateQuestionRequest, Question},
};

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn course_exists(&self, course_id: i64) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM courses WHERE id = $1)")
                .bind(course_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn diagnostic_questions(
        &self,
        course_id: i64,
    ) -> Result<Vec<DiagnosticQuestion>, StoreError> {
        let questions = sqlx::query_as::<_, DiagnosticQuestion>(
            r#"
            SELECT
                id,
                course_id,
                level,
                question_text,
                options,
                correct_answer,
                feedback,
                recommended_starting_section
            FROM diagnostic_questions
            WHERE course_id = $1
            ORDER BY level, id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch diagnostic questions: {:?}", e);
            e
        })?;

        Ok(questions)
    }

    async fn exam_exists(&self, exam_id: i64) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM exams WHERE id = $1)")
            .bind(exam_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn exam_questions(&self, exam_id: i64) -> Result<Vec<Question>, StoreError> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT
                id,
                exam_id,
                level,
                question_text,
                options,
                correct_answer,
                feedback,
                position
            FROM questions
            WHERE exam_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch exam questions: {:?}", e);
            e
        })?;

        Ok(questions)
    }

    async fn create_question(&self, req: &CreateQuestionRequest) -> Result<i64, StoreError> {
        if !self.exam_exists(req.exam_id).await? {
            return Err(StoreError::MissingParent(format!("Exam {}", req.exam_id)));
        }

        // Without an explicit position the question goes after the exam's last one.
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO questions (exam_id, level, question_text, options, correct_answer, feedback, position)
            VALUES (
                $1, $2, $3, $4, $5, $6,
                COALESCE($7, (SELECT COALESCE(MAX(position), -1) + 1 FROM questions WHERE exam_id = $1))
            )
            RETURNING id
            "#,
        )
        .bind(req.exam_id)
        .bind(req.level)
        .bind(&req.text)
        .bind(sqlx::types::Json(&req.options))
        .bind(&req.correct_answer)
        .bind(&req.feedback)
        .bind(req.position)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn create_diagnostic_question(
        &self,
        req: &CreateDiagnosticQuestionRequest,
    ) -> Result<i64, StoreError> {
        if !self.course_exists(req.course_id).await? {
            return Err(StoreError::MissingParent(format!("Course {}", req.course_id)));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO diagnostic_questions
                (course_id, level, question_text, options, correct_answer, feedback, recommended_starting_section)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(req.course_id)
        .bind(req.level)
        .bind(&req.text)
        .bind(sqlx::types::Json(&req.options))
        .bind(&req.correct_answer)
        .bind(&req.feedback)
        .bind(&req.recommended_starting_section)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn save_placement(
        &self,
        user_id: i64,
        course_id: i64,
        max_level: i32,
        feedback: &DiagnosticFeedback,
    ) -> Result<PlacementRecord, StoreError> {
        // Upsert: a retried submission overwrites instead of duplicating
        let record = sqlx::query_as::<_, PlacementRecord>(
            r#"
            INSERT INTO placement_records
                (user_id, course_id, max_level, levels_passed, recommended_starting_section, overall_result)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, course_id) DO UPDATE SET
                max_level = EXCLUDED.max_level,
                levels_passed = EXCLUDED.levels_passed,
                recommended_starting_section = EXCLUDED.recommended_starting_section,
                overall_result = EXCLUDED.overall_result,
                updated_at = CURRENT_TIMESTAMP
            RETURNING
                user_id,
                course_id,
                max_level,
                levels_passed,
                recommended_starting_section,
                overall_result,
                updated_at
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(max_level)
        .bind(feedback.levels_passed as i32)
        .bind(&feedback.recommended_starting_section)
        .bind(&feedback.overall_result)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert placement record: {:?}", e);
            e
        })?;

        Ok(record)
    }

    async fn placement(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<PlacementRecord>, StoreError> {
        let record = sqlx::query_as::<_, PlacementRecord>(
            r#"
            SELECT
                user_id,
                course_id,
                max_level,
                levels_passed,
                recommended_starting_section,
                overall_result,
                updated_at
            FROM placement_records
            WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
