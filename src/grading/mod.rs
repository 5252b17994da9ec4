// src/grading/mod.rs

//! Pure scoring logic. Nothing in here touches the database or the network;
//! handlers fetch the authoritative questions and hand them in.

pub mod diagnostic;
pub mod exam;

pub use diagnostic::grade_diagnostic;
pub use exam::grade_exam;

use crate::config::DEFAULT_PASS_THRESHOLD;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradingError {
    #[error("{0}")]
    Validation(String),
}

/// Tunables for diagnostic grading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradingPolicy {
    /// Minimum level score (percentage) that counts as passed.
    pub pass_threshold: f64,
}

impl GradingPolicy {
    pub fn new(pass_threshold: f64) -> Self {
        Self {
            pass_threshold: pass_threshold.clamp(0.0, 100.0),
        }
    }

    pub fn passes(&self, score: f64) -> bool {
        score >= self.pass_threshold
    }
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PASS_THRESHOLD)
    }
}

/// Percentage of correct answers. Zero when there is nothing to grade.
pub(crate) fn percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (correct as f64 / total as f64) * 100.0
}
