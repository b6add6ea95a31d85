// src/quiz/patterns.rs

use crate::models::quiz::SubmittedAnswer;

/// Every submitted answer picked the same option letter.
pub const IDENTICAL_ANSWERS: &str = "identical_answers";
/// At least 4 of the 5 most recent results scored 100.
pub const CONSECUTIVE_PERFECT_SCORES: &str = "consecutive_perfect_scores";

const PERFECT_SCORE: i64 = 100;
const RECENT_RESULT_WINDOW: usize = 5;
const PERFECT_SCORE_THRESHOLD: usize = 4;

/// Inspects the submission and the user's recent score history for cheating
/// signatures. Returns the union of triggered pattern tags, possibly empty.
///
/// `recent_scores` must be newest-first and include the score of the
/// submission being evaluated.
pub fn detect(recent_scores: &[i64], answers: &[SubmittedAnswer]) -> Vec<&'static str> {
    let mut tags = Vec::new();

    // A single answer is trivially "identical"; require at least two.
    if answers.len() >= 2 {
        let first = &answers[0].selected;
        if answers.iter().all(|a| &a.selected == first) {
            tags.push(IDENTICAL_ANSWERS);
        }
    }

    let perfect = recent_scores
        .iter()
        .take(RECENT_RESULT_WINDOW)
        .filter(|s| **s == PERFECT_SCORE)
        .count();
    if perfect >= PERFECT_SCORE_THRESHOLD {
        tags.push(CONSECUTIVE_PERFECT_SCORES);
    }

    tags
}
