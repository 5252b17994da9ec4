// src/client/practice.rs

use std::collections::HashSet;

use crate::models::question::Gradable;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PracticeError {
    #[error("the answer for this question has already been revealed")]
    AlreadyRevealed,

    #[error("select an answer first")]
    NothingSelected,

    #[error("no question to answer")]
    NoQuestion,
}

/// Single-question practice: pick an option, reveal whether it was right,
/// then move on. Revealing locks the choice until the cursor moves.
///
/// Nothing is submitted to the server; this is separate from `QuizSession`.
#[derive(Debug)]
pub struct PracticeSession<Q> {
    questions: Vec<Q>,
    index: usize,
    selected: Option<String>,
    revealed: bool,
    /// Questions whose first reveal was correct.
    correct_ids: HashSet<i64>,
    /// Questions revealed at least once.
    revealed_ids: HashSet<i64>,
}

impl<Q: Gradable> PracticeSession<Q> {
    pub fn new(questions: Vec<Q>) -> Self {
        Self {
            questions,
            index: 0,
            selected: None,
            revealed: false,
            correct_ids: HashSet::new(),
            revealed_ids: HashSet::new(),
        }
    }

    pub fn current(&self) -> Option<&Q> {
        self.questions.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn select(&mut self, answer: impl Into<String>) -> Result<(), PracticeError> {
        if self.current().is_none() {
            return Err(PracticeError::NoQuestion);
        }
        if self.revealed {
            return Err(PracticeError::AlreadyRevealed);
        }
        self.selected = Some(answer.into());
        Ok(())
    }

    /// Reveals correctness of the current choice. Only the first reveal of a
    /// question counts towards the score.
    pub fn reveal(&mut self) -> Result<bool, PracticeError> {
        let question = self.current().ok_or(PracticeError::NoQuestion)?;
        let selected = self.selected.as_deref().ok_or(PracticeError::NothingSelected)?;

        let id = question.id();
        let correct = question.is_correct(selected);

        if self.revealed_ids.insert(id) && correct {
            self.correct_ids.insert(id);
        }
        self.revealed = true;
        Ok(correct)
    }

    /// Moves on after the current question was revealed.
    pub fn next(&mut self) -> bool {
        if !self.revealed || self.index + 1 >= self.questions.len() {
            return false;
        }
        self.index += 1;
        self.reset_choice();
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.reset_choice();
        true
    }

    fn reset_choice(&mut self) {
        self.selected = None;
        self.revealed = false;
    }

    /// (correct on first reveal, questions revealed)
    pub fn score(&self) -> (usize, usize) {
        (self.correct_ids.len(), self.revealed_ids.len())
    }

    pub fn is_complete(&self) -> bool {
        self.revealed_ids.len() == self.questions.len()
    }
}
