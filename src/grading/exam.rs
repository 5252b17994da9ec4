// src/grading/exam.rs

use std::collections::HashMap;

use super::percentage;
use crate::models::{
    exam::{AnswerFeedback, AnswerSubmission, ExamFeedbackResult},
    question::{Gradable, Question},
};

/// Percentage bands, checked top-down. The first band whose floor is met wins.
const BANDS: &[Band] = &[
    Band {
        floor: 90,
        message: "Outstanding work! You have mastered this section.",
        recommendation: "You are ready to move on to the next section.",
    },
    Band {
        floor: 75,
        message: "Great job! Just a few details left to polish.",
        recommendation: "Review the questions you missed before moving on.",
    },
    Band {
        floor: 50,
        message: "Good effort. Keep practicing and you will get there.",
        recommendation: "Review the questions you missed and retake the exam.",
    },
    Band {
        floor: 0,
        message: "Don't give up! Every attempt helps you learn.",
        recommendation: "Revisit the section material before retaking the exam.",
    },
];

struct Band {
    floor: u32,
    message: &'static str,
    recommendation: &'static str,
}

fn band_for(percentage: u32) -> &'static Band {
    BANDS
        .iter()
        .find(|b| percentage >= b.floor)
        .unwrap_or(&BANDS[BANDS.len() - 1])
}

/// Grades one exam attempt.
///
/// Every question of the exam is graded in the order given by `questions`, answered
/// or not. When a question id appears more than once in `answers`, the last entry
/// wins. Answers to questions outside the exam are ignored.
pub fn grade_exam(
    exam_id: i64,
    answers: &[AnswerSubmission],
    questions: &[Question],
) -> ExamFeedbackResult {
    // Later entries overwrite earlier ones.
    let selected: HashMap<i64, &str> = answers
        .iter()
        .map(|a| (a.question_id, a.selected_answer.as_str()))
        .collect();

    let feedback_list: Vec<AnswerFeedback> = questions
        .iter()
        .map(|q| {
            let selected_answer = selected.get(&q.id).copied().unwrap_or_default();
            AnswerFeedback {
                question_id: q.id,
                text: q.text.clone(),
                options: q.options.clone(),
                selected_answer: selected_answer.to_string(),
                correct_answer: q.correct_answer.clone(),
                is_correct: !selected_answer.is_empty() && q.is_correct(selected_answer),
                feedback: q.feedback.clone(),
            }
        })
        .collect();

    let correct = feedback_list.iter().filter(|f| f.is_correct).count();
    let total = feedback_list.len();
    let percentage = percentage(correct, total).round() as u32;

    let band = band_for(percentage);
    let mut recommendations = vec![band.recommendation.to_string()];
    recommendations.extend(
        feedback_list
            .iter()
            .filter(|f| !f.is_correct)
            .filter_map(|f| f.feedback.as_ref().map(|fb| format!("{}: {}", f.text, fb))),
    );

    ExamFeedbackResult {
        exam_id,
        feedback_list,
        correct: correct as u32,
        total: total as u32,
        percentage,
        recommendations,
        motivational_message: Some(band.message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, position: i32, correct: &str) -> Question {
        Question {
            id,
            exam_id: 7,
            level: 1,
            text: format!("Question {}", id),
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct_answer: correct.to_string(),
            feedback: None,
            position,
        }
    }

    fn answer(question_id: i64, selected: &str) -> AnswerSubmission {
        AnswerSubmission {
            question_id,
            selected_answer: selected.to_string(),
        }
    }

    #[test]
    fn test_wrong_and_missing_answers() {
        let questions = vec![question(1, 0, "A"), question(2, 1, "B"), question(3, 2, "C")];
        let result = grade_exam(7, &[answer(1, "A"), answer(2, "C")], &questions);

        assert_eq!(result.correct, 1);
        assert_eq!(result.total, 3);
        assert_eq!(result.percentage, 33);
        assert_eq!(result.feedback_list[2].selected_answer, "");
        assert!(!result.feedback_list[2].is_correct);
    }

    #[test]
    fn test_duplicate_answers_last_one_wins() {
        let questions = vec![question(1, 0, "A")];

        let result = grade_exam(7, &[answer(1, "A"), answer(1, "B")], &questions);
        assert_eq!(result.feedback_list[0].selected_answer, "B");
        assert_eq!(result.correct, 0);

        let result = grade_exam(7, &[answer(1, "B"), answer(1, "A")], &questions);
        assert_eq!(result.feedback_list[0].selected_answer, "A");
        assert_eq!(result.correct, 1);
    }

    #[test]
    fn test_feedback_follows_question_order() {
        let questions = vec![question(30, 0, "A"), question(10, 1, "A"), question(20, 2, "A")];
        let result = grade_exam(
            7,
            &[answer(20, "A"), answer(10, "A"), answer(30, "A")],
            &questions,
        );

        let ids: Vec<i64> = result.feedback_list.iter().map(|f| f.question_id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
        assert_eq!(result.percentage, 100);
    }

    #[test]
    fn test_empty_answers_are_all_incorrect() {
        let questions = vec![question(1, 0, "A"), question(2, 1, "B")];
        let result = grade_exam(7, &[], &questions);

        assert_eq!(result.correct, 0);
        assert_eq!(result.total, 2);
        assert_eq!(result.percentage, 0);
        assert!(result.feedback_list.iter().all(|f| !f.is_correct));
    }

    #[test]
    fn test_exam_without_questions() {
        let result = grade_exam(7, &[answer(1, "A")], &[]);
        assert_eq!(result.total, 0);
        assert_eq!(result.percentage, 0);
        assert!(result.feedback_list.is_empty());
    }

    #[test]
    fn test_unknown_question_ids_are_ignored() {
        let questions = vec![question(1, 0, "A")];
        let result = grade_exam(7, &[answer(99, "A"), answer(1, "A")], &questions);
        assert_eq!(result.feedback_list.len(), 1);
        assert_eq!(result.correct, 1);
    }

    #[test]
    fn test_bands_pick_message_and_recommendation() {
        let questions: Vec<Question> = (1..=10).map(|i| question(i, i as i32, "A")).collect();
        let answers_for =
            |n: i64| -> Vec<AnswerSubmission> { (1..=n).map(|i| answer(i, "A")).collect() };

        let top = grade_exam(7, &answers_for(9), &questions);
        assert_eq!(top.percentage, 90);
        assert_eq!(top.motivational_message.as_deref(), Some(BANDS[0].message));

        let good = grade_exam(7, &answers_for(8), &questions);
        assert_eq!(good.motivational_message.as_deref(), Some(BANDS[1].message));

        let fair = grade_exam(7, &answers_for(5), &questions);
        assert_eq!(fair.motivational_message.as_deref(), Some(BANDS[2].message));

        let low = grade_exam(7, &answers_for(4), &questions);
        assert_eq!(low.motivational_message.as_deref(), Some(BANDS[3].message));
        assert_eq!(low.recommendations[0], BANDS[3].recommendation);
    }

    #[test]
    fn test_missed_question_feedback_becomes_recommendation() {
        let mut missed = question(2, 1, "B");
        missed.feedback = Some("Remember the order of operations".to_string());
        let questions = vec![question(1, 0, "A"), missed];

        let result = grade_exam(7, &[answer(1, "A"), answer(2, "A")], &questions);
        assert_eq!(result.recommendations.len(), 2);
        assert_eq!(
            result.recommendations[1],
            "Question 2: Remember the order of operations"
        );
    }

    #[test]
    fn test_grading_is_idempotent() {
        let questions = vec![question(1, 0, "A"), question(2, 1, "B")];
        let answers = vec![answer(2, "B"), answer(1, "C")];
        assert_eq!(
            grade_exam(7, &answers, &questions),
            grade_exam(7, &answers, &questions)
        );
    }
}
