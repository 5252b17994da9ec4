// src/store/memory.rs

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::{QuizStore, StoreError};
use crate::models::{
    diagnostic::{CreateDiagnosticQuestionRequest, DiagnosticFeedback, DiagnosticQuestion},
    placement::PlacementRecord,
    question::{CreateQuestionRequest, Question},
};

/// In-process store for tests and database-less local runs.
///
/// Locks are never held across an `.await`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    courses: HashSet<i64>,
    exams: HashSet<i64>,
    questions: Vec<Question>,
    diagnostic_questions: Vec<DiagnosticQuestion>,
    placements: HashMap<(i64, i64), PlacementRecord>,
}

impl Inner {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(self, course_id: i64) -> Self {
        self.write(|inner| {
            inner.courses.insert(course_id);
        });
        self
    }

    pub fn with_exam(self, exam_id: i64) -> Self {
        self.write(|inner| {
            inner.exams.insert(exam_id);
        });
        self
    }

    /// Inserts a question as-is, keeping its id.
    pub fn insert_question(&self, question: Question) {
        self.write(|inner| {
            inner.next_id = inner.next_id.max(question.id);
            inner.exams.insert(question.exam_id);
            inner.questions.push(question);
        });
    }

    /// Inserts a diagnostic question as-is, keeping its id.
    pub fn insert_diagnostic_question(&self, question: DiagnosticQuestion) {
        self.write(|inner| {
            inner.next_id = inner.next_id.max(question.id);
            inner.courses.insert(question.course_id);
            inner.diagnostic_questions.push(question);
        });
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn course_exists(&self, course_id: i64) -> Result<bool, StoreError> {
        Ok(self.read(|inner| inner.courses.contains(&course_id)))
    }

    async fn diagnostic_questions(
        &self,
        course_id: i64,
    ) -> Result<Vec<DiagnosticQuestion>, StoreError> {
        let mut questions: Vec<DiagnosticQuestion> = self.read(|inner| {
            inner
                .diagnostic_questions
                .iter()
                .filter(|q| q.course_id == course_id)
                .cloned()
                .collect()
        });
        questions.sort_by_key(|q| (q.level, q.id));
        Ok(questions)
    }

    async fn exam_exists(&self, exam_id: i64) -> Result<bool, StoreError> {
        Ok(self.read(|inner| inner.exams.contains(&exam_id)))
    }

    async fn exam_questions(&self, exam_id: i64) -> Result<Vec<Question>, StoreError> {
        let mut questions: Vec<Question> = self.read(|inner| {
            inner
                .questions
                .iter()
                .filter(|q| q.exam_id == exam_id)
                .cloned()
                .collect()
        });
        questions.sort_by_key(|q| (q.position, q.id));
        Ok(questions)
    }

    async fn create_question(&self, req: &CreateQuestionRequest) -> Result<i64, StoreError> {
        self.write(|inner| {
            if !inner.exams.contains(&req.exam_id) {
                return Err(StoreError::MissingParent(format!("Exam {}", req.exam_id)));
            }

            let position = req.position.unwrap_or_else(|| {
                inner
                    .questions
                    .iter()
                    .filter(|q| q.exam_id == req.exam_id)
                    .map(|q| q.position)
                    .max()
                    .map_or(0, |p| p + 1)
            });

            let id = inner.allocate_id();
            inner.questions.push(Question {
                id,
                exam_id: req.exam_id,
                level: req.level,
                text: req.text.clone(),
                options: req.options.clone(),
                correct_answer: req.correct_answer.clone(),
                feedback: req.feedback.clone(),
                position,
            });
            Ok(id)
        })
    }

    async fn create_diagnostic_question(
        &self,
        req: &CreateDiagnosticQuestionRequest,
    ) -> Result<i64, StoreError> {
        self.write(|inner| {
            if !inner.courses.contains(&req.course_id) {
                return Err(StoreError::MissingParent(format!("Course {}", req.course_id)));
            }

            let id = inner.allocate_id();
            inner.diagnostic_questions.push(DiagnosticQuestion {
                id,
                course_id: req.course_id,
                level: req.level,
                text: req.text.clone(),
                options: req.options.clone(),
                correct_answer: req.correct_answer.clone(),
                feedback: req.feedback.clone(),
                recommended_starting_section: req.recommended_starting_section.clone(),
            });
            Ok(id)
        })
    }

    async fn save_placement(
        &self,
        user_id: i64,
        course_id: i64,
        max_level: i32,
        feedback: &DiagnosticFeedback,
    ) -> Result<PlacementRecord, StoreError> {
        let record = PlacementRecord {
            user_id,
            course_id,
            max_level,
            levels_passed: feedback.levels_passed as i32,
            recommended_starting_section: feedback.recommended_starting_section.clone(),
            overall_result: feedback.overall_result.clone(),
            updated_at: chrono::Utc::now(),
        };

        self.write(|inner| {
            inner
                .placements
                .insert((user_id, course_id), record.clone());
        });
        Ok(record)
    }

    async fn placement(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<PlacementRecord>, StoreError> {
        Ok(self.read(|inner| inner.placements.get(&(user_id, course_id)).cloned()))
    }
}
