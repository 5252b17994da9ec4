// src/client/session.rs

use std::collections::HashMap;
use std::fmt::Display;

use tokio::sync::watch;

use super::state::{LoadState, StateCell};
use crate::models::question::Gradable;

/// Identifies one load or submit request. Completions carrying an outdated
/// ticket belong to a superseded request and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Result of trying to move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The cursor moved to this index.
    Moved(usize),
    /// The cursor is on the last answered question; time to submit.
    Finish,
    /// The current question has no answer yet, or nothing is loaded.
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("questions are not loaded")]
    NotLoaded,

    #[error("a submission is already in flight")]
    SubmissionInFlight,
}

/// Client-side progression through a question set: load, answer one at a
/// time, submit.
///
/// Question loading and submission are tracked in two independent state
/// cells, so observers can never see a combined illegal state.
#[derive(Debug)]
pub struct QuizSession<Q, R> {
    questions: StateCell<LoadState<Vec<Q>>>,
    submission: StateCell<LoadState<R>>,
    answers: HashMap<i64, String>,
    current_index: usize,
    load_generation: u64,
    submit_generation: u64,
}

impl<Q, R> Default for QuizSession<Q, R> {
    fn default() -> Self {
        Self {
            questions: StateCell::new(LoadState::Idle),
            submission: StateCell::new(LoadState::Idle),
            answers: HashMap::new(),
            current_index: 0,
            load_generation: 0,
            submit_generation: 0,
        }
    }
}

impl<Q, R> QuizSession<Q, R>
where
    Q: Gradable + Clone,
    R: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn questions_state(&self) -> LoadState<Vec<Q>> {
        self.questions.get()
    }

    pub fn submission_state(&self) -> LoadState<R> {
        self.submission.get()
    }

    pub fn subscribe_questions(&self) -> watch::Receiver<LoadState<Vec<Q>>> {
        self.questions.subscribe()
    }

    pub fn subscribe_submission(&self) -> watch::Receiver<LoadState<R>> {
        self.submission.subscribe()
    }

    /// Starts (or restarts) loading. Clears answers, the cursor and any
    /// submission, and supersedes every outstanding request.
    pub fn begin_load(&mut self) -> Ticket {
        self.load_generation += 1;
        self.submit_generation += 1;
        self.answers.clear();
        self.current_index = 0;
        self.questions.set(LoadState::Loading);
        self.submission.set(LoadState::Idle);
        Ticket(self.load_generation)
    }

    /// Applies a load result. Returns false when the ticket is stale.
    pub fn finish_load<E: Display>(&mut self, ticket: Ticket, result: Result<Vec<Q>, E>) -> bool {
        if ticket.0 != self.load_generation {
            tracing::debug!("Discarding stale question load");
            return false;
        }

        match result {
            Ok(questions) => self.questions.set(LoadState::Success(questions)),
            Err(e) => self.questions.set(LoadState::Error(e.to_string())),
        }
        true
    }

    fn loaded_len(&self) -> Option<usize> {
        self.questions.borrow().success().map(Vec::len)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<Q> {
        self.questions
            .borrow()
            .success()
            .and_then(|qs| qs.get(self.current_index).cloned())
    }

    fn current_id(&self) -> Option<i64> {
        self.questions
            .borrow()
            .success()
            .and_then(|qs| qs.get(self.current_index).map(|q| q.id()))
    }

    /// Records the answer for the current question, replacing any earlier choice.
    pub fn select_answer(&mut self, answer: impl Into<String>) -> Result<(), SessionError> {
        if self.submission.borrow().is_loading() {
            return Err(SessionError::SubmissionInFlight);
        }
        let id = self.current_id().ok_or(SessionError::NotLoaded)?;
        self.answers.insert(id, answer.into());
        Ok(())
    }

    pub fn selected_answer(&self) -> Option<&str> {
        let id = self.current_id()?;
        self.answers.get(&id).map(String::as_str)
    }

    pub fn answers(&self) -> &HashMap<i64, String> {
        &self.answers
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.selected_answer().is_some()
    }

    /// Moves forward when the current question is answered. On the last
    /// question reports [`Navigation::Finish`] and keeps the cursor in place.
    pub fn next(&mut self) -> Navigation {
        let Some(len) = self.loaded_len() else {
            return Navigation::Blocked;
        };
        if !self.can_go_next() {
            return Navigation::Blocked;
        }
        if self.current_index + 1 >= len {
            return Navigation::Finish;
        }
        self.current_index += 1;
        Navigation::Moved(self.current_index)
    }

    pub fn previous(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.current_index -= 1;
        true
    }

    /// Marks a submission as in flight.
    pub fn begin_submit(&mut self) -> Result<Ticket, SessionError> {
        if self.loaded_len().is_none() {
            return Err(SessionError::NotLoaded);
        }
        if self.submission.borrow().is_loading() {
            return Err(SessionError::SubmissionInFlight);
        }

        self.submit_generation += 1;
        self.submission.set(LoadState::Loading);
        Ok(Ticket(self.submit_generation))
    }

    /// Applies a submission result. Returns false when the ticket is stale.
    pub fn finish_submit<E: Display>(&mut self, ticket: Ticket, result: Result<R, E>) -> bool {
        if ticket.0 != self.submit_generation {
            tracing::debug!("Discarding stale submission result");
            return false;
        }

        match result {
            Ok(value) => self.submission.set(LoadState::Success(value)),
            Err(e) => self.submission.set(LoadState::Error(e.to_string())),
        }
        true
    }

    /// Gives up on an in-flight submission. Any late result for `ticket` is
    /// discarded and the session accepts answers and retries again.
    ///
    /// Returns false when `ticket` was already settled or superseded.
    pub fn abandon_submit(&mut self, ticket: Ticket) -> bool {
        if ticket.0 != self.submit_generation || !self.submission.borrow().is_loading() {
            return false;
        }

        tracing::debug!("Submission abandoned before completion");
        self.submit_generation += 1;
        self.submission
            .set(LoadState::Error(SUBMISSION_CANCELLED.to_string()));
        true
    }

    /// Like [`begin_submit`](Self::begin_submit), but the returned guard
    /// abandons the submission if it is dropped before being finished.
    pub fn guard_submit(&mut self) -> Result<SubmitGuard<'_, Q, R>, SessionError> {
        let ticket = self.begin_submit()?;
        Ok(SubmitGuard {
            session: Some(self),
            ticket,
        })
    }
}

/// Error message published when an in-flight submission is dropped.
pub const SUBMISSION_CANCELLED: &str = "submission cancelled";

/// An in-flight submission tied to a session.
///
/// Dropping it without calling [`finish`](Self::finish), e.g. when the
/// enclosing future is cancelled, moves the session to an error state
/// from which the learner can retry.
pub struct SubmitGuard<'a, Q, R>
where
    Q: Gradable + Clone,
    R: Clone,
{
    session: Option<&'a mut QuizSession<Q, R>>,
    ticket: Ticket,
}

impl<Q, R> SubmitGuard<'_, Q, R>
where
    Q: Gradable + Clone,
    R: Clone,
{
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn finish<E: Display>(mut self, result: Result<R, E>) -> bool {
        match self.session.take() {
            Some(session) => session.finish_submit(self.ticket, result),
            None => false,
        }
    }
}

impl<Q, R> Drop for SubmitGuard<'_, Q, R>
where
    Q: Gradable + Clone,
    R: Clone,
{
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.abandon_submit(self.ticket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Question;

    fn question(id: i64) -> Question {
        Question {
            id,
            exam_id: 1,
            level: 1,
            text: format!("Question {}", id),
            options: vec!["A".to_string(), "B".to_string()],
            correct_answer: "A".to_string(),
            feedback: None,
            position: id as i32,
        }
    }

    fn loaded(ids: &[i64]) -> QuizSession<Question, u32> {
        let mut session = QuizSession::new();
        let ticket = session.begin_load();
        let questions = ids.iter().map(|id| question(*id)).collect();
        assert!(session.finish_load(ticket, Ok::<_, String>(questions)));
        session
    }

    #[test]
    fn test_next_requires_an_answer() {
        let mut session = loaded(&[1, 2, 3]);
        assert_eq!(session.next(), Navigation::Blocked);

        session.select_answer("B").unwrap();
        assert_eq!(session.next(), Navigation::Moved(1));
        assert_eq!(session.current_question().unwrap().id, 2);
    }

    #[test]
    fn test_cursor_stops_at_last_question() {
        let mut session = loaded(&[1, 2]);
        session.select_answer("A").unwrap();
        session.next();
        session.select_answer("A").unwrap();

        assert_eq!(session.next(), Navigation::Finish);
        assert_eq!(session.next(), Navigation::Finish);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_previous_is_free_and_keeps_answers() {
        let mut session = loaded(&[1, 2]);
        assert!(!session.previous());

        session.select_answer("A").unwrap();
        session.next();
        assert!(session.previous());
        assert_eq!(session.selected_answer(), Some("A"));
    }

    #[test]
    fn test_reselecting_overwrites() {
        let mut session = loaded(&[1]);
        session.select_answer("A").unwrap();
        session.select_answer("B").unwrap();
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.selected_answer(), Some("B"));
    }

    #[test]
    fn test_nothing_to_do_before_load() {
        let mut session: QuizSession<Question, u32> = QuizSession::new();
        assert_eq!(session.next(), Navigation::Blocked);
        assert_eq!(session.select_answer("A"), Err(SessionError::NotLoaded));
        assert_eq!(session.begin_submit(), Err(SessionError::NotLoaded));
    }

    #[test]
    fn test_load_error_is_reported() {
        let mut session: QuizSession<Question, u32> = QuizSession::new();
        let ticket = session.begin_load();
        session.finish_load(ticket, Err::<Vec<Question>, _>("server returned 404"));
        assert_eq!(
            session.questions_state(),
            LoadState::Error("server returned 404".to_string())
        );
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut session: QuizSession<Question, u32> = QuizSession::new();
        let first = session.begin_load();
        let second = session.begin_load();

        assert!(!session.finish_load(first, Ok::<_, String>(vec![question(1)])));
        assert!(session.questions_state().is_loading());

        assert!(session.finish_load(second, Ok::<_, String>(vec![question(2)])));
        assert_eq!(session.current_question().unwrap().id, 2);
    }

    #[test]
    fn test_submission_lifecycle() {
        let mut session = loaded(&[1]);
        session.select_answer("A").unwrap();

        let ticket = session.begin_submit().unwrap();
        assert_eq!(session.begin_submit(), Err(SessionError::SubmissionInFlight));
        assert_eq!(
            session.select_answer("B"),
            Err(SessionError::SubmissionInFlight)
        );
        // Loading state of the questions is untouched by the submission.
        assert!(session.questions_state().success().is_some());

        assert!(session.finish_submit(ticket, Ok::<_, String>(100)));
        assert_eq!(session.submission_state(), LoadState::Success(100));
    }

    #[test]
    fn test_submission_after_reload_is_discarded() {
        let mut session = loaded(&[1]);
        session.select_answer("A").unwrap();
        let ticket = session.begin_submit().unwrap();

        let reload = session.begin_load();
        session.finish_load(reload, Ok::<_, String>(vec![question(5)]));

        assert!(!session.finish_submit(ticket, Ok::<_, String>(100)));
        assert_eq!(session.submission_state(), LoadState::Idle);
        assert!(session.answers().is_empty());
    }

    #[test]
    fn test_abandoned_submission_allows_retry() {
        let mut session = loaded(&[1]);
        session.select_answer("A").unwrap();

        let ticket = session.begin_submit().unwrap();
        assert!(session.abandon_submit(ticket));
        assert_eq!(
            session.submission_state().error(),
            Some(SUBMISSION_CANCELLED)
        );

        // The late response no longer applies.
        assert!(!session.finish_submit(ticket, Ok::<_, String>(100)));
        assert!(!session.abandon_submit(ticket));

        session.select_answer("B").unwrap();
        let retry = session.begin_submit().unwrap();
        assert!(session.finish_submit(retry, Ok::<_, String>(7)));
        assert_eq!(session.submission_state(), LoadState::Success(7));
    }

    #[test]
    fn test_dropped_guard_abandons_submission() {
        let mut session = loaded(&[1]);
        session.select_answer("A").unwrap();

        let guard = session.guard_submit().unwrap();
        drop(guard);
        assert_eq!(
            session.submission_state().error(),
            Some(SUBMISSION_CANCELLED)
        );

        let guard = session.guard_submit().unwrap();
        assert!(guard.finish(Ok::<_, String>(3)));
        assert_eq!(session.submission_state(), LoadState::Success(3));
    }

    #[test]
    fn test_settled_submission_is_not_abandoned() {
        let mut session = loaded(&[1]);
        session.select_answer("A").unwrap();

        let ticket = session.begin_submit().unwrap();
        session.finish_submit(ticket, Ok::<_, String>(1));
        assert!(!session.abandon_submit(ticket));
        assert_eq!(session.submission_state(), LoadState::Success(1));
    }

    #[test]
    fn test_failed_submission_can_be_retried() {
        let mut session = loaded(&[1]);
        session.select_answer("A").unwrap();

        let ticket = session.begin_submit().unwrap();
        session.finish_submit(ticket, Err::<u32, _>("network error"));
        assert_eq!(
            session.submission_state().error(),
            Some("network error")
        );

        let retry = session.begin_submit().unwrap();
        assert!(session.finish_submit(retry, Ok::<_, String>(1)));
    }
}
