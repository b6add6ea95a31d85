// src/quiz/attempt.rs

use rand::Rng;
use serde_json::json;
use std::collections::{BTreeSet, HashMap};

use crate::clock::Clock;
use crate::error::AppError;
use crate::models::{
    cheat_flag::{NewCheatFlag, SEVERITY_LOW, SEVERITY_MEDIUM},
    question::PublicQuestion,
    quiz::{
        QuizConfig, StartQuizResponse, SubmitQuizRequest, SubmitQuizResponse, SubmittedAnswer,
    },
};
use crate::quiz::{cooldown, patterns, rate_limit, sampler};
use crate::store::{NewAttempt, QuizStore, StoreError, SubmissionOutcome};

pub const FLAG_INSUFFICIENT_READ_TIME: &str = "insufficient_read_time";
pub const FLAG_FAST_SUBMISSION: &str = "fast_submission";
pub const FLAG_SUSPICIOUS_PATTERN: &str = "suspicious_pattern";

/// Per-lesson policy, falling back to the global defaults when the lesson
/// has no config row.
pub async fn resolved_config(
    store: &dyn QuizStore,
    lesson_id: i64,
) -> Result<QuizConfig, AppError> {
    Ok(store
        .quiz_config(lesson_id)
        .await?
        .unwrap_or_else(|| QuizConfig::defaults_for(lesson_id)))
}

/// True when the submitted answers cover the frozen question set exactly:
/// same ids, no extras, no omissions, no duplicates.
pub fn answers_match_frozen(frozen: &[i64], answers: &[SubmittedAnswer]) -> bool {
    if answers.len() != frozen.len() {
        return false;
    }
    let submitted: BTreeSet<i64> = answers.iter().map(|a| a.question_id).collect();
    if submitted.len() != answers.len() {
        return false;
    }
    let frozen: BTreeSet<i64> = frozen.iter().copied().collect();
    submitted == frozen
}

/// Soft timing check. True when the declared total, the server-observed
/// elapsed time, or any single declared answer time is below the plausible
/// minimum. A suspicious submission is still graded; only the reward is
/// withheld.
pub fn timing_is_suspicious(
    answers: &[SubmittedAnswer],
    declared_total_seconds: i64,
    elapsed_seconds: i64,
    min_time_per_question: i64,
) -> bool {
    let min_expected = answers.len() as i64 * min_time_per_question;
    declared_total_seconds < min_expected
        || elapsed_seconds < min_expected
        || answers
            .iter()
            .any(|a| a.time_spent_seconds < min_time_per_question)
}

/// Grades the answers against the frozen set's answer key.
/// Returns (correct, wrong, score). Score is a rounded percentage over the
/// frozen question count, 0 for an empty frozen set.
pub fn grade(
    frozen: &[i64],
    key: &HashMap<i64, String>,
    answers: &[SubmittedAnswer],
) -> (i64, i64, i64) {
    let frozen: BTreeSet<i64> = frozen.iter().copied().collect();
    let total = frozen.len() as i64;
    if total == 0 {
        return (0, 0, 0);
    }

    let correct = answers
        .iter()
        .filter(|a| frozen.contains(&a.question_id))
        .filter(|a| key.get(&a.question_id) == Some(&a.selected))
        .count() as i64;
    let wrong = total - correct;
    let score = ((correct as f64 / total as f64) * 100.0).round() as i64;
    (correct, wrong, score)
}

/// Starts an attempt for (user, lesson): gate checks in order, then a fresh
/// question draw frozen into the persisted attempt.
pub async fn start<R: Rng + Send>(
    store: &dyn QuizStore,
    clock: &dyn Clock,
    rng: &mut R,
    user_id: i64,
    lesson_id: i64,
) -> Result<StartQuizResponse, AppError> {
    let lesson = store
        .lesson_by_id(lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;

    // One permanent pass/fail record per lesson per user.
    if store.quiz_result(user_id, lesson_id).await?.is_some() {
        return Err(AppError::AlreadyCompleted);
    }

    let rl_status = rate_limit::check_and_maybe_init(store, clock, user_id).await?;
    if !rl_status.can_attempt {
        return Err(AppError::RateLimited(
            rl_status
                .reason
                .unwrap_or_else(|| "Attempt limit reached".to_string()),
        ));
    }

    let cfg = resolved_config(store, lesson_id).await?;

    let cd_status = cooldown::check(store, clock, user_id, lesson_id, cfg.cooldown_seconds).await?;
    if !cd_status.can_attempt {
        return Err(AppError::CooldownActive(cd_status.remaining_seconds));
    }

    let recorded = store.read_seconds(user_id, lesson_id).await?;
    if recorded < cfg.min_read_time_seconds {
        store
            .insert_cheat_flag(NewCheatFlag {
                user_id,
                lesson_id: Some(lesson_id),
                flag_type: FLAG_INSUFFICIENT_READ_TIME.to_string(),
                severity: SEVERITY_LOW.to_string(),
                description: format!(
                    "Attempted quiz on '{}' after {}s of reading ({}s required)",
                    lesson.title, recorded, cfg.min_read_time_seconds
                ),
                metadata: Some(json!({
                    "recorded_seconds": recorded,
                    "required_seconds": cfg.min_read_time_seconds,
                })),
            })
            .await?;
        return Err(AppError::InsufficientReadTime {
            required: cfg.min_read_time_seconds,
            recorded,
        });
    }

    let pool = store.active_questions(lesson_id).await?;
    let question_ids = sampler::sample_question_ids(&pool, cfg.questions_per_quiz, rng)?;

    let now = clock.now();
    let attempt = store
        .insert_attempt(NewAttempt {
            user_id,
            lesson_id,
            question_ids: question_ids.clone(),
            started_at: now,
        })
        .await?;

    rate_limit::record_attempt(store, clock, user_id).await?;

    // Serve questions in the frozen order, answers stripped.
    let by_id: HashMap<i64, _> = pool.into_iter().map(|q| (q.id, q)).collect();
    let questions: Vec<PublicQuestion> = question_ids
        .iter()
        .filter_map(|id| by_id.get(id).cloned())
        .map(PublicQuestion::from)
        .collect();

    tracing::info!(
        "quiz attempt {} started: user={} lesson={} questions={}",
        attempt.id,
        user_id,
        lesson_id,
        questions.len()
    );

    Ok(StartQuizResponse {
        attempt_id: attempt.id,
        lesson_id,
        questions,
        started_at: attempt.started_at,
        min_time_per_question: cfg.min_time_per_question,
        cooldown_seconds: cfg.cooldown_seconds,
    })
}

/// Submits an attempt: timing validation, grading, conditional reward,
/// pattern detection and transactional finalization.
pub async fn submit(
    store: &dyn QuizStore,
    clock: &dyn Clock,
    user_id: i64,
    req: SubmitQuizRequest,
) -> Result<SubmitQuizResponse, AppError> {
    let attempt = store
        .attempt_by_id(req.attempt_id)
        .await?
        .filter(|a| a.user_id == user_id)
        .filter(|a| req.lesson_id.is_none_or(|l| l == a.lesson_id))
        .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

    if attempt.completed_at.is_some() {
        return Err(AppError::AlreadySubmitted);
    }

    let frozen = &attempt.question_ids.0;
    if !answers_match_frozen(frozen, &req.answers) {
        return Err(AppError::AnswerMismatch);
    }

    let cfg = resolved_config(store, attempt.lesson_id).await?;
    let now = clock.now();
    let elapsed = (now - attempt.started_at).num_seconds();

    let flagged_suspicious = timing_is_suspicious(
        &req.answers,
        req.total_time_seconds,
        elapsed,
        cfg.min_time_per_question,
    );

    let questions = store.questions_by_ids(frozen).await?;
    let key: HashMap<i64, String> = questions
        .into_iter()
        .map(|q| (q.id, q.correct_option))
        .collect();

    let (correct, wrong, score) = grade(frozen, &key, &req.answers);
    let passed = score >= cfg.passing_score;

    let tokens_awarded = if passed && !flagged_suspicious {
        cfg.token_reward
    } else {
        0
    };

    // Pattern detection over the submission plus the score history, the
    // current score counted as the newest entry.
    let recent = store.recent_results(user_id, 4).await?;
    let mut scores = vec![score];
    scores.extend(recent.iter().map(|r| r.score));
    let tags = patterns::detect(&scores, &req.answers);

    store
        .finalize_submission(SubmissionOutcome {
            attempt_id: attempt.id,
            user_id,
            lesson_id: attempt.lesson_id,
            completed_at: now,
            total_time_seconds: req.total_time_seconds,
            score,
            correct_count: correct,
            wrong_count: wrong,
            passed,
            flagged_suspicious,
            tokens_awarded,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => AppError::AlreadyCompleted,
            other => other.into(),
        })?;

    if flagged_suspicious {
        let min_expected = req.answers.len() as i64 * cfg.min_time_per_question;
        store
            .insert_cheat_flag(NewCheatFlag {
                user_id,
                lesson_id: Some(attempt.lesson_id),
                flag_type: FLAG_FAST_SUBMISSION.to_string(),
                severity: SEVERITY_MEDIUM.to_string(),
                description: format!(
                    "Quiz submitted in {}s declared / {}s observed, minimum expected {}s",
                    req.total_time_seconds, elapsed, min_expected
                ),
                metadata: Some(json!({
                    "declared_total_seconds": req.total_time_seconds,
                    "elapsed_seconds": elapsed,
                    "min_expected_seconds": min_expected,
                })),
            })
            .await?;
    }

    if !tags.is_empty() {
        store
            .insert_cheat_flag(NewCheatFlag {
                user_id,
                lesson_id: Some(attempt.lesson_id),
                flag_type: FLAG_SUSPICIOUS_PATTERN.to_string(),
                severity: SEVERITY_MEDIUM.to_string(),
                description: format!("Detected patterns: {}", tags.join(", ")),
                metadata: Some(json!({ "patterns": tags })),
            })
            .await?;
    }

    tracing::info!(
        "quiz attempt {} submitted: user={} score={} passed={} suspicious={} tokens={}",
        attempt.id,
        user_id,
        score,
        passed,
        flagged_suspicious,
        tokens_awarded
    );

    let message = if flagged_suspicious {
        Some("Submission completed faster than plausible; reward withheld pending review.".to_string())
    } else {
        None
    };

    Ok(SubmitQuizResponse {
        score,
        correct,
        wrong,
        tokens_awarded,
        passed,
        flagged_suspicious,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::{MemoryStore, NewLesson, NewQuestion, NewUser};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn answer(question_id: i64, selected: &str, secs: i64) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            selected: selected.to_string(),
            time_spent_seconds: secs,
        }
    }

    #[test]
    fn grading_rounds_the_percentage() {
        let frozen = vec![1, 2, 3];
        let key: HashMap<i64, String> = [(1, "A"), (2, "B"), (3, "C")]
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();

        let answers = vec![answer(1, "A", 5), answer(2, "B", 5), answer(3, "D", 5)];
        let (correct, wrong, score) = grade(&frozen, &key, &answers);
        assert_eq!((correct, wrong), (2, 1));
        // 2/3 = 66.67 -> 67, round not truncate
        assert_eq!(score, 67);
    }

    #[test]
    fn empty_frozen_set_scores_zero() {
        let (correct, wrong, score) = grade(&[], &HashMap::new(), &[]);
        assert_eq!((correct, wrong, score), (0, 0, 0));
    }

    #[test]
    fn exact_match_rejects_extras_omissions_and_duplicates() {
        let frozen = vec![1, 2, 3];
        assert!(answers_match_frozen(
            &frozen,
            &[answer(3, "A", 5), answer(1, "A", 5), answer(2, "A", 5)]
        ));
        // omission
        assert!(!answers_match_frozen(
            &frozen,
            &[answer(1, "A", 5), answer(2, "A", 5)]
        ));
        // extra id
        assert!(!answers_match_frozen(
            &frozen,
            &[
                answer(1, "A", 5),
                answer(2, "A", 5),
                answer(3, "A", 5),
                answer(4, "A", 5)
            ]
        ));
        // duplicate id standing in for a missing one
        assert!(!answers_match_frozen(
            &frozen,
            &[answer(1, "A", 5), answer(1, "B", 5), answer(2, "A", 5)]
        ));
    }

    #[test]
    fn timing_flag_matrix() {
        let answers = vec![answer(1, "A", 4), answer(2, "B", 4), answer(3, "C", 4)];
        // All clear: declared 20, elapsed 20, min 3*3=9.
        assert!(!timing_is_suspicious(&answers, 20, 20, 3));
        // Declared total too low.
        assert!(timing_is_suspicious(&answers, 2, 20, 3));
        // Server-observed elapsed too low.
        assert!(timing_is_suspicious(&answers, 20, 5, 3));
        // One per-question time below the minimum.
        let fast_one = vec![answer(1, "A", 1), answer(2, "B", 9), answer(3, "C", 9)];
        assert!(timing_is_suspicious(&fast_one, 20, 20, 3));
    }

    async fn seed_world(store: &MemoryStore) -> (i64, i64) {
        let user = store
            .create_user(NewUser {
                name: "learner".into(),
                email: "learner@example.com".into(),
                password_hash: "h".into(),
                is_admin: false,
                starting_balance: 50,
            })
            .await
            .unwrap();
        let lesson = store
            .create_lesson(NewLesson {
                category: "JAMB".into(),
                title: "Fractions".into(),
                content: "lesson body".into(),
                video_url: None,
                order_index: 0,
            })
            .await
            .unwrap();
        let questions = ["A", "B", "C", "D", "A"]
            .iter()
            .enumerate()
            .map(|(i, correct)| NewQuestion {
                question: format!("q{}", i),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_option: correct.to_string(),
            })
            .collect();
        store.replace_questions(lesson.id, questions).await.unwrap();
        store
            .add_read_seconds(user.id, lesson.id, 35)
            .await
            .unwrap();
        (user.id, lesson.id)
    }

    #[tokio::test]
    async fn passing_submission_awards_tokens_once() {
        let store = MemoryStore::new();
        let clock = ManualClock::new("2026-01-01T00:00:00Z".parse().unwrap());
        let mut rng = StdRng::seed_from_u64(11);
        let (user_id, lesson_id) = seed_world(&store).await;

        let started = start(&store, &clock, &mut rng, user_id, lesson_id)
            .await
            .unwrap();
        assert_eq!(started.questions.len(), 3);

        clock.advance_seconds(20);
        let key: HashMap<i64, String> = store
            .questions_by_ids(&started.questions.iter().map(|q| q.id).collect::<Vec<_>>())
            .await
            .unwrap()
            .into_iter()
            .map(|q| (q.id, q.correct_option))
            .collect();
        let answers: Vec<SubmittedAnswer> = started
            .questions
            .iter()
            .map(|q| answer(q.id, &key[&q.id], 7))
            .collect();

        let result = submit(
            &store,
            &clock,
            user_id,
            SubmitQuizRequest {
                attempt_id: started.attempt_id,
                lesson_id: None,
                answers: answers.clone(),
                total_time_seconds: 20,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.score, 100);
        assert!(result.passed);
        assert!(!result.flagged_suspicious);
        assert_eq!(result.tokens_awarded, 50);
        assert_eq!(store.wallet_balance(user_id).await.unwrap(), Some(100));

        // Terminal attempt: a second submit must not re-grade.
        let err = submit(
            &store,
            &clock,
            user_id,
            SubmitQuizRequest {
                attempt_id: started.attempt_id,
                lesson_id: None,
                answers,
                total_time_seconds: 20,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::AlreadySubmitted));

        // And a permanent result blocks any further start.
        clock.advance_seconds(3600);
        let err = start(&store, &clock, &mut rng, user_id, lesson_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyCompleted));
    }

    #[tokio::test]
    async fn fast_submission_is_flagged_and_unrewarded() {
        let store = MemoryStore::new();
        let clock = ManualClock::new("2026-01-01T00:00:00Z".parse().unwrap());
        let mut rng = StdRng::seed_from_u64(5);
        let (user_id, lesson_id) = seed_world(&store).await;

        let started = start(&store, &clock, &mut rng, user_id, lesson_id)
            .await
            .unwrap();
        clock.advance_seconds(2);

        let key: HashMap<i64, String> = store
            .questions_by_ids(&started.questions.iter().map(|q| q.id).collect::<Vec<_>>())
            .await
            .unwrap()
            .into_iter()
            .map(|q| (q.id, q.correct_option))
            .collect();
        let answers: Vec<SubmittedAnswer> = started
            .questions
            .iter()
            .map(|q| answer(q.id, &key[&q.id], 1))
            .collect();

        let result = submit(
            &store,
            &clock,
            user_id,
            SubmitQuizRequest {
                attempt_id: started.attempt_id,
                lesson_id: None,
                answers,
                total_time_seconds: 2,
            },
        )
        .await
        .unwrap();

        // Perfect score, but no reward and a flag on record.
        assert_eq!(result.score, 100);
        assert!(result.passed);
        assert!(result.flagged_suspicious);
        assert_eq!(result.tokens_awarded, 0);
        assert!(result.message.is_some());
        assert_eq!(store.wallet_balance(user_id).await.unwrap(), Some(50));

        let flags = store.list_cheat_flags(true).await.unwrap();
        assert!(flags.iter().any(|f| f.flag_type == FLAG_FAST_SUBMISSION));
    }

    #[tokio::test]
    async fn unread_lesson_blocks_start_and_flags() {
        let store = MemoryStore::new();
        let clock = ManualClock::new("2026-01-01T00:00:00Z".parse().unwrap());
        let mut rng = StdRng::seed_from_u64(5);
        let (user_id, lesson_id) = seed_world(&store).await;

        let other = store
            .create_user(NewUser {
                name: "skimmer".into(),
                email: "skimmer@example.com".into(),
                password_hash: "h".into(),
                is_admin: false,
                starting_balance: 50,
            })
            .await
            .unwrap();

        let err = start(&store, &clock, &mut rng, other.id, lesson_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientReadTime { .. }));

        let flags = store.list_cheat_flags(true).await.unwrap();
        assert!(
            flags
                .iter()
                .any(|f| f.user_id == other.id && f.flag_type == FLAG_INSUFFICIENT_READ_TIME)
        );
        assert_eq!(flags[0].severity, "low");

        // user_id untouched by the other user's rejection
        assert!(
            start(&store, &clock, &mut rng, user_id, lesson_id)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn mismatched_answer_set_is_rejected_before_grading() {
        let store = MemoryStore::new();
        let clock = ManualClock::new("2026-01-01T00:00:00Z".parse().unwrap());
        let mut rng = StdRng::seed_from_u64(5);
        let (user_id, lesson_id) = seed_world(&store).await;

        let started = start(&store, &clock, &mut rng, user_id, lesson_id)
            .await
            .unwrap();
        clock.advance_seconds(30);

        let err = submit(
            &store,
            &clock,
            user_id,
            SubmitQuizRequest {
                attempt_id: started.attempt_id,
                lesson_id: None,
                answers: vec![answer(999_999, "A", 10)],
                total_time_seconds: 30,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::AnswerMismatch));

        // The attempt stays open for a corrected submission.
        let attempt = store
            .attempt_by_id(started.attempt_id)
            .await
            .unwrap()
            .unwrap();
        assert!(attempt.completed_at.is_none());
    }

    #[tokio::test]
    async fn foreign_attempt_is_not_found() {
        let store = MemoryStore::new();
        let clock = ManualClock::new("2026-01-01T00:00:00Z".parse().unwrap());
        let mut rng = StdRng::seed_from_u64(5);
        let (user_id, lesson_id) = seed_world(&store).await;

        let started = start(&store, &clock, &mut rng, user_id, lesson_id)
            .await
            .unwrap();

        let intruder = store
            .create_user(NewUser {
                name: "other".into(),
                email: "other@example.com".into(),
                password_hash: "h".into(),
                is_admin: false,
                starting_balance: 0,
            })
            .await
            .unwrap();

        let err = submit(
            &store,
            &clock,
            intruder.id,
            SubmitQuizRequest {
                attempt_id: started.attempt_id,
                lesson_id: None,
                answers: vec![],
                total_time_seconds: 10,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
