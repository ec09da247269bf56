//! Scoring of submitted answers against an exercise's question set.
//!
//! Grading is pure: the submit route loads the questions, calls [`grade`]
//! and persists the outcome. Completeness is enforced here as well, not
//! only in the browser.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::model::entity::{ExerciseType, Question};

#[derive(Debug, Error)]
pub enum GradingError {
    #[error("submission is missing answers for {missing} question(s)")]
    Incomplete { missing: usize },
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuestionResult {
    pub question_id: Uuid,
    pub correct: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GradedSubmission {
    pub results: Vec<QuestionResult>,
    pub correct_count: usize,
    pub total_questions: usize,
    /// Percentage in [0, 100].
    pub score: i32,
}

/// Grades a complete answer map against the ordered question set.
///
/// Every question must carry a non-blank answer; otherwise the whole
/// submission is rejected before any scoring happens.
pub fn grade(
    exercise_type: ExerciseType,
    questions: &[Question],
    answers: &HashMap<Uuid, String>,
) -> Result<GradedSubmission, GradingError> {
    let missing = questions
        .iter()
        .filter(|q| {
            answers
                .get(&q.id())
                .is_none_or(|a| a.trim().is_empty())
        })
        .count();
    if missing > 0 {
        return Err(GradingError::Incomplete { missing });
    }

    let results: Vec<QuestionResult> = questions
        .iter()
        .map(|q| {
            // the completeness check above guarantees the key exists
            let submitted = &answers[&q.id()];
            QuestionResult {
                question_id: q.id(),
                correct: answer_matches(exercise_type, submitted, q.correct_answer()),
            }
        })
        .collect();

    let correct_count = results.iter().filter(|r| r.correct).count();
    let total_questions = questions.len();
    let score = if total_questions == 0 {
        0
    } else {
        (100.0 * correct_count as f64 / total_questions as f64).round() as i32
    };

    Ok(GradedSubmission {
        results,
        correct_count,
        total_questions,
        score,
    })
}

/// Choice-based types compare verbatim; dictation is free text, so it is
/// compared trimmed and case-insensitively.
fn answer_matches(exercise_type: ExerciseType, submitted: &str, correct: &str) -> bool {
    match exercise_type {
        ExerciseType::Dictation => {
            submitted.trim().to_lowercase() == correct.trim().to_lowercase()
        }
        ExerciseType::Reading | ExerciseType::Listening => submitted == correct,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn question(id: Uuid, correct_answer: &str) -> Question {
        serde_json::from_value(json!({
            "id": id,
            "exercise_id": Uuid::new_v4(),
            "prompt": "prompt",
            "options": "[]",
            "correct_answer": correct_answer,
            "position": 0,
        }))
        .unwrap()
    }

    #[test]
    fn three_of_four_choice_questions_score_75() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let questions: Vec<Question> =
            ids.iter().map(|id| question(*id, "right")).collect();

        let mut answers = HashMap::new();
        answers.insert(ids[0], "right".to_string());
        answers.insert(ids[1], "right".to_string());
        answers.insert(ids[2], "right".to_string());
        answers.insert(ids[3], "wrong".to_string());

        let graded = grade(ExerciseType::Reading, &questions, &answers).unwrap();
        assert_eq!(graded.correct_count, 3);
        assert_eq!(graded.total_questions, 4);
        assert_eq!(graded.score, 75);
    }

    #[test]
    fn full_marks_iff_all_correct() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let questions: Vec<Question> =
            ids.iter().map(|id| question(*id, "a")).collect();

        let all_right: HashMap<Uuid, String> =
            ids.iter().map(|id| (*id, "a".to_string())).collect();
        assert_eq!(
            grade(ExerciseType::Listening, &questions, &all_right)
                .unwrap()
                .score,
            100
        );

        let mut one_wrong = all_right.clone();
        one_wrong.insert(ids[0], "b".to_string());
        let graded = grade(ExerciseType::Listening, &questions, &one_wrong).unwrap();
        assert_eq!(graded.correct_count, 2);
        assert!(graded.score < 100);
    }

    #[test]
    fn dictation_is_trim_and_case_insensitive() {
        let id = Uuid::new_v4();
        let questions = vec![question(id, "paris")];
        let mut answers = HashMap::new();
        answers.insert(id, " Paris ".to_string());

        let graded = grade(ExerciseType::Dictation, &questions, &answers).unwrap();
        assert_eq!(graded.score, 100);
    }

    #[test]
    fn choice_comparison_is_exact() {
        let id = Uuid::new_v4();
        let questions = vec![question(id, "Paris")];
        let mut answers = HashMap::new();
        answers.insert(id, "paris".to_string());

        let graded = grade(ExerciseType::Reading, &questions, &answers).unwrap();
        assert_eq!(graded.correct_count, 0);
    }

    #[test]
    fn missing_answer_rejects_submission() {
        let ids: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
        let questions: Vec<Question> =
            ids.iter().map(|id| question(*id, "a")).collect();

        let mut answers = HashMap::new();
        answers.insert(ids[0], "a".to_string());

        let err = grade(ExerciseType::Reading, &questions, &answers).unwrap_err();
        assert!(matches!(err, GradingError::Incomplete { missing: 1 }));
    }

    #[test]
    fn blank_answer_counts_as_missing() {
        let id = Uuid::new_v4();
        let questions = vec![question(id, "a")];
        let mut answers = HashMap::new();
        answers.insert(id, "   ".to_string());

        assert!(grade(ExerciseType::Dictation, &questions, &answers).is_err());
    }

    #[test]
    fn empty_question_set_scores_zero() {
        let graded = grade(ExerciseType::Reading, &[], &HashMap::new()).unwrap();
        assert_eq!(graded.score, 0);
        assert_eq!(graded.total_questions, 0);
    }
}
