// src/quiz/sampler.rs

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::AppError;
use crate::models::question::QuizQuestion;

/// Draws `count` question ids from the lesson's active pool, uniformly and
/// without replacement. Each attempt gets an independent draw; the returned
/// order is frozen into the attempt.
///
/// Fails when the pool is smaller than the configured quiz size — a short
/// quiz is never served.
pub fn sample_question_ids<R: Rng + ?Sized>(
    pool: &[QuizQuestion],
    count: i64,
    rng: &mut R,
) -> Result<Vec<i64>, AppError> {
    let count = count.max(0) as usize;
    if pool.len() < count || count == 0 {
        return Err(AppError::ConfigurationError(format!(
            "Question pool has {} active questions, {} required",
            pool.len(),
            count
        )));
    }

    let ids: Vec<i64> = pool.iter().map(|q| q.id).collect();
    Ok(ids.choose_multiple(rng, count).copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sqlx::types::Json;
    use std::collections::HashSet;

    fn question(id: i64) -> QuizQuestion {
        QuizQuestion {
            id,
            lesson_id: 1,
            question: format!("question {}", id),
            options: Json(vec!["A".into(), "B".into(), "C".into(), "D".into()]),
            correct_option: "A".into(),
            active: true,
        }
    }

    #[test]
    fn undersized_pool_is_a_configuration_error() {
        let pool: Vec<QuizQuestion> = (1..=2).map(question).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let err = sample_question_ids(&pool, 3, &mut rng).unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));
    }

    #[test]
    fn empty_quiz_size_is_rejected() {
        let pool: Vec<QuizQuestion> = (1..=5).map(question).collect();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(sample_question_ids(&pool, 0, &mut rng).is_err());
    }

    #[test]
    fn draw_is_without_replacement_and_from_the_pool() {
        let pool: Vec<QuizQuestion> = (1..=10).map(question).collect();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let ids = sample_question_ids(&pool, 4, &mut rng).unwrap();
            assert_eq!(ids.len(), 4);
            let unique: HashSet<i64> = ids.iter().copied().collect();
            assert_eq!(unique.len(), 4);
            assert!(ids.iter().all(|id| (1..=10).contains(id)));
        }
    }

    #[test]
    fn seeded_rng_gives_deterministic_draws() {
        let pool: Vec<QuizQuestion> = (1..=10).map(question).collect();
        let a = sample_question_ids(&pool, 5, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = sample_question_ids(&pool, 5, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn full_pool_draw_uses_every_question() {
        let pool: Vec<QuizQuestion> = (1..=5).map(question).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let ids = sample_question_ids(&pool, 5, &mut rng).unwrap();
        let unique: HashSet<i64> = ids.into_iter().collect();
        assert_eq!(unique, (1..=5).collect());
    }
}
