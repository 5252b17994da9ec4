// src/grading/diagnostic.rs

use std::collections::HashMap;

use super::{GradingError, GradingPolicy, percentage};
use crate::{
    config::COURSE_MASTERED_SECTION,
    models::{
        diagnostic::{DiagnosticFeedback, DiagnosticQuestion, LevelResult},
        question::Gradable,
    },
};

/// Highest level a diagnostic may ask to grade.
pub const MAX_LEVEL: i32 = 100;

/// Grades a diagnostic submission against the course's question bank.
///
/// * Every level from 1 to `max_level` is graded, in ascending order. Unanswered
///   questions count as incorrect; a level without questions scores 0 and fails.
/// * The first failing level decides the recommended section: the section of the
///   first question (by level, then id) at that level.
/// * When every level passes, the section of the next level above `max_level` is
///   recommended, or [`COURSE_MASTERED_SECTION`] when the bank has nothing higher.
/// * An empty answer map is still graded, but flagged with `empty_submission`.
pub fn grade_diagnostic(
    course_id: i64,
    max_level: i32,
    answers: &HashMap<i64, String>,
    question_bank: &[DiagnosticQuestion],
    policy: &GradingPolicy,
) -> Result<DiagnosticFeedback, GradingError> {
    if !(1..=MAX_LEVEL).contains(&max_level) {
        return Err(GradingError::Validation(format!(
            "maxLevel must be between 1 and {}, got {}",
            MAX_LEVEL, max_level
        )));
    }

    let mut bank: Vec<&DiagnosticQuestion> = question_bank
        .iter()
        .filter(|q| q.course_id == course_id)
        .collect();

    if bank.is_empty() {
        return Err(GradingError::Validation(format!(
            "Course {} has no diagnostic questions",
            course_id
        )));
    }

    bank.sort_by_key(|q| (q.level, q.id));

    let results: Vec<LevelResult> = (1..=max_level)
        .map(|level| grade_level(level, &bank, answers, policy))
        .collect();

    let first_failure = results.iter().find(|r| !r.passed);
    let levels_passed = results.iter().take_while(|r| r.passed).count() as u32;

    let recommended_starting_section = match first_failure {
        Some(failed) => section_for_failed_level(failed.level, &bank),
        None => section_after(max_level, &bank),
    };

    let empty_submission = answers.is_empty();
    let overall_result = summarize(
        &results,
        first_failure,
        &recommended_starting_section,
        empty_submission,
    );

    Ok(DiagnosticFeedback {
        results,
        overall_result,
        recommended_starting_section,
        levels_passed,
        empty_submission,
    })
}

fn grade_level(
    level: i32,
    bank: &[&DiagnosticQuestion],
    answers: &HashMap<i64, String>,
    policy: &GradingPolicy,
) -> LevelResult {
    let mut total = 0;
    let mut correct = 0;

    for q in bank.iter().filter(|q| q.level == level) {
        total += 1;
        if answers.get(&q.id).is_some_and(|a| q.is_correct(a)) {
            correct += 1;
        }
    }

    let score = percentage(correct, total);

    LevelResult {
        level,
        score,
        passed: total > 0 && policy.passes(score),
        correct_answers: correct as u32,
        total_questions: total as u32,
    }
}

/// Section of the first question at `level`, falling back to the nearest lower
/// level that has questions, then to the very first question of the course.
fn section_for_failed_level(level: i32, bank: &[&DiagnosticQuestion]) -> String {
    bank.iter()
        .find(|q| q.level == level)
        .or_else(|| {
            let nearest = bank.iter().rev().find(|q| q.level < level)?;
            bank.iter().find(|q| q.level == nearest.level)
        })
        .or_else(|| bank.first())
        .map(|q| q.recommended_starting_section.clone())
        .unwrap_or_else(|| COURSE_MASTERED_SECTION.to_string())
}

fn section_after(max_level: i32, bank: &[&DiagnosticQuestion]) -> String {
    bank.iter()
        .find(|q| q.level > max_level)
        .map(|q| q.recommended_starting_section.clone())
        .unwrap_or_else(|| COURSE_MASTERED_SECTION.to_string())
}

fn summarize(
    results: &[LevelResult],
    first_failure: Option<&LevelResult>,
    section: &str,
    empty_submission: bool,
) -> String {
    if empty_submission {
        return format!("No answers were submitted. Start at: {}", section);
    }

    match first_failure {
        None => format!(
            "Passed all {} levels. Recommended next: {}",
            results.len(),
            section
        ),
        Some(failed) => {
            let passed = results.iter().take_while(|r| r.passed).count();
            format!(
                "Passed {} of {} levels. Level {} scored {:.0}%. Start at: {}",
                passed,
                results.len(),
                failed.level,
                failed.score,
                section
            )
        }
    }
}
