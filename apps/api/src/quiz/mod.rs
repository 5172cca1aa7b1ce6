//! Quiz generation and server-side scoring.
//!
//! Correct answers never leave the server: quizzes are returned without the
//! `correct_option` field and attempts are graded here.

use std::collections::HashMap;

use uuid::Uuid;

pub mod handlers;
pub mod prompts;

/// Grades an attempt against the stored answer key. Unanswered questions
/// score zero; comparison ignores surrounding whitespace and case.
pub fn score_answers(
    answer_key: &[(Uuid, String)],
    submitted: &HashMap<Uuid, String>,
) -> (i32, i32) {
    let total = answer_key.len() as i32;
    let score = answer_key
        .iter()
        .filter(|(question_id, correct)| {
            submitted
                .get(question_id)
                .map(|answer| answer.trim().eq_ignore_ascii_case(correct.trim()))
                .unwrap_or(false)
        })
        .count() as i32;
    (score, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(answers: &[&str]) -> Vec<(Uuid, String)> {
        answers
            .iter()
            .map(|a| (Uuid::new_v4(), a.to_string()))
            .collect()
    }

    #[test]
    fn test_score_all_correct() {
        let answer_key = key(&["Paris", "4", "Rust"]);
        let submitted: HashMap<Uuid, String> = answer_key
            .iter()
            .map(|(id, a)| (*id, a.clone()))
            .collect();
        assert_eq!(score_answers(&answer_key, &submitted), (3, 3));
    }

    #[test]
    fn test_score_ignores_case_and_whitespace() {
        let answer_key = key(&["Paris"]);
        let submitted = HashMap::from([(answer_key[0].0, "  paris ".to_string())]);
        assert_eq!(score_answers(&answer_key, &submitted), (1, 1));
    }

    #[test]
    fn test_unanswered_questions_score_zero() {
        let answer_key = key(&["a", "b"]);
        let submitted = HashMap::from([(answer_key[0].0, "a".to_string())]);
        assert_eq!(score_answers(&answer_key, &submitted), (1, 2));
    }

    #[test]
    fn test_unknown_question_ids_are_ignored() {
        let answer_key = key(&["a"]);
        let submitted = HashMap::from([(Uuid::new_v4(), "a".to_string())]);
        assert_eq!(score_answers(&answer_key, &submitted), (0, 1));
    }

    #[test]
    fn test_empty_quiz() {
        assert_eq!(score_answers(&[], &HashMap::new()), (0, 0));
    }
}
