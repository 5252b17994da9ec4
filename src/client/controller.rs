// src/client/controller.rs

use super::{
    api::ApiClient,
    session::{Navigation, QuizSession, SessionError},
};
use crate::models::{
    diagnostic::{DiagnosticFeedback, DiagnosticQuestion, DiagnosticSubmission},
    exam::{AnswerSubmission, ExamFeedbackResult, ExamSubmission},
    question::Question,
};

/// Drives a diagnostic: load questions up to a level, answer, submit.
pub struct DiagnosticController {
    api: ApiClient,
    session: QuizSession<DiagnosticQuestion, DiagnosticFeedback>,
    course_id: i64,
    requested_level: i32,
}

impl DiagnosticController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            session: QuizSession::new(),
            course_id: 0,
            requested_level: 1,
        }
    }

    pub fn session(&self) -> &QuizSession<DiagnosticQuestion, DiagnosticFeedback> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut QuizSession<DiagnosticQuestion, DiagnosticFeedback> {
        &mut self.session
    }

    pub async fn load(&mut self, course_id: i64, level: i32) {
        self.course_id = course_id;
        self.requested_level = level;

        let ticket = self.session.begin_load();
        let result = self.api.diagnostic_questions(course_id, Some(level)).await;
        self.session.finish_load(ticket, result);
    }

    /// Highest level among the loaded questions, or the requested one.
    fn max_level(&self) -> i32 {
        self.session
            .questions_state()
            .success()
            .and_then(|qs| qs.iter().map(|q| q.level).max())
            .unwrap_or(self.requested_level)
    }

    /// Advances the cursor; finishing the last question submits.
    pub async fn next(&mut self) -> Result<Navigation, SessionError> {
        let navigation = self.session.next();
        if navigation == Navigation::Finish {
            self.submit().await?;
        }
        Ok(navigation)
    }

    /// Submits the collected answers. Cancelling the returned future leaves
    /// the session in an error state that can be retried.
    pub async fn submit(&mut self) -> Result<(), SessionError> {
        let submission = DiagnosticSubmission {
            course_id: self.course_id,
            max_level: self.max_level(),
            answers: self.session.answers().clone(),
        };

        let pending = self.session.guard_submit()?;
        let result = self.api.submit_diagnostic(&submission).await;
        pending.finish(result);
        Ok(())
    }
}

/// Drives a section exam: load, answer, evaluate.
pub struct ExamController {
    api: ApiClient,
    session: QuizSession<Question, ExamFeedbackResult>,
    exam_id: i64,
}

impl ExamController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            session: QuizSession::new(),
            exam_id: 0,
        }
    }

    pub fn session(&self) -> &QuizSession<Question, ExamFeedbackResult> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut QuizSession<Question, ExamFeedbackResult> {
        &mut self.session
    }

    pub async fn load(&mut self, exam_id: i64) {
        self.exam_id = exam_id;

        let ticket = self.session.begin_load();
        let result = self.api.exam_questions(exam_id).await;
        self.session.finish_load(ticket, result);
    }

    pub async fn next(&mut self) -> Result<Navigation, SessionError> {
        let navigation = self.session.next();
        if navigation == Navigation::Finish {
            self.submit().await?;
        }
        Ok(navigation)
    }

    /// Sends the answers in question order. Cancelling the returned future
    /// leaves the session in an error state that can be retried.
    pub async fn submit(&mut self) -> Result<(), SessionError> {
        let questions = self.session.questions_state();
        let answers: Vec<AnswerSubmission> = questions
            .success()
            .into_iter()
            .flatten()
            .filter_map(|q| {
                self.session
                    .answers()
                    .get(&q.id)
                    .map(|selected| AnswerSubmission {
                        question_id: q.id,
                        selected_answer: selected.clone(),
                    })
            })
            .collect();

        let submission = ExamSubmission {
            exam_id: self.exam_id,
            answers,
        };

        let pending = self.session.guard_submit()?;
        let result = self.api.evaluate_exam(&submission).await;
        pending.finish(result);
        Ok(())
    }
}
