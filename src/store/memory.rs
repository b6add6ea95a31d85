// src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{
    cheat_flag::{ACTION_TOKENS_REVOKED, CheatFlag, CheatFlagRow, NewCheatFlag},
    lesson::{CategoryCount, Lesson, LessonProgress},
    question::QuizQuestion,
    quiz::{QuizAttempt, QuizConfig, QuizRateLimit, QuizResult, SuspiciousAttemptRow},
    user::User,
    wallet::{Reward, RewardHistoryRow},
};

use super::{
    NewAttempt, NewLesson, NewQuestion, NewUser, QuizStore, ReviewOutcome, StoreError,
    StoreResult, SubmissionOutcome,
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: HashMap<i64, User>,
    wallets: HashMap<i64, i64>,
    lessons: HashMap<i64, Lesson>,
    progress: HashMap<(i64, i64), LessonProgress>,
    questions: HashMap<i64, QuizQuestion>,
    configs: HashMap<i64, QuizConfig>,
    rate_limits: HashMap<i64, QuizRateLimit>,
    attempts: HashMap<i64, QuizAttempt>,
    // keyed by (user_id, lesson_id): the storage-level uniqueness invariant
    results: HashMap<(i64, i64), QuizResult>,
    rewards: Vec<Reward>,
    flags: HashMap<i64, CheatFlag>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// `QuizStore` held entirely in memory behind one mutex, so every trait
/// method is atomic. Used by the test suite in place of Postgres.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store lock poisoned")
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut inner = self.lock();
        if inner.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate(format!(
                "email '{}' already registered",
                new.email
            )));
        }
        let id = inner.next_id();
        let user = User {
            id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            is_admin: new.is_admin,
            created_at: Utc::now(),
        };
        inner.users.insert(id, user.clone());
        inner.wallets.insert(id, new.starting_balance);
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn user_count(&self) -> StoreResult<i64> {
        Ok(self.lock().users.len() as i64)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.lock().users.values().cloned().collect();
        users.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(users)
    }

    async fn set_user_admin(&self, id: i64, is_admin: bool) -> StoreResult<bool> {
        let mut inner = self.lock();
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.is_admin = is_admin;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn wallet_balance(&self, user_id: i64) -> StoreResult<Option<i64>> {
        Ok(self.lock().wallets.get(&user_id).copied())
    }

    async fn reward_history(&self, user_id: i64, limit: i64) -> StoreResult<Vec<RewardHistoryRow>> {
        let inner = self.lock();
        let mut rewards: Vec<&Reward> = inner
            .rewards
            .iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        rewards.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rewards
            .into_iter()
            .take(limit as usize)
            .map(|r| RewardHistoryRow {
                id: r.id,
                lesson_title: inner
                    .lessons
                    .get(&r.lesson_id)
                    .map(|l| l.title.clone())
                    .unwrap_or_default(),
                tokens_earned: r.tokens_earned,
                reversed: r.reversed,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn reward_summary(&self, user_id: i64) -> StoreResult<(i64, i64)> {
        let inner = self.lock();
        let active = inner
            .rewards
            .iter()
            .filter(|r| r.user_id == user_id && !r.reversed);
        let mut total = 0;
        let mut count = 0;
        for r in active {
            total += r.tokens_earned;
            count += 1;
        }
        Ok((total, count))
    }

    async fn create_lesson(&self, new: NewLesson) -> StoreResult<Lesson> {
        let mut inner = self.lock();
        let id = inner.next_id();
        let lesson = Lesson {
            id,
            category: new.category,
            title: new.title,
            content: new.content,
            video_url: new.video_url,
            order_index: new.order_index,
            created_at: Utc::now(),
        };
        inner.lessons.insert(id, lesson.clone());
        Ok(lesson)
    }

    async fn lesson_by_id(&self, id: i64) -> StoreResult<Option<Lesson>> {
        Ok(self.lock().lessons.get(&id).cloned())
    }

    async fn list_lessons(&self) -> StoreResult<Vec<Lesson>> {
        let mut lessons: Vec<Lesson> = self.lock().lessons.values().cloned().collect();
        lessons.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then(a.order_index.cmp(&b.order_index))
        });
        Ok(lessons)
    }

    async fn lessons_by_category(&self, category: &str) -> StoreResult<Vec<Lesson>> {
        let mut lessons: Vec<Lesson> = self
            .lock()
            .lessons
            .values()
            .filter(|l| l.category == category)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.order_index);
        Ok(lessons)
    }

    async fn lesson_categories(&self) -> StoreResult<Vec<CategoryCount>> {
        let inner = self.lock();
        let mut counts: HashMap<String, i64> = HashMap::new();
        for lesson in inner.lessons.values() {
            *counts.entry(lesson.category.clone()).or_insert(0) += 1;
        }
        let mut rows: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        rows.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(rows)
    }

    async fn delete_lesson(&self, id: i64) -> StoreResult<bool> {
        let mut inner = self.lock();
        if inner.lessons.remove(&id).is_none() {
            return Ok(false);
        }
        inner.progress.retain(|(_, lesson_id), _| *lesson_id != id);
        inner.questions.retain(|_, q| q.lesson_id != id);
        inner.configs.remove(&id);
        inner.attempts.retain(|_, a| a.lesson_id != id);
        inner.results.retain(|(_, lesson_id), _| *lesson_id != id);
        inner.rewards.retain(|r| r.lesson_id != id);
        inner.flags.retain(|_, f| f.lesson_id != Some(id));
        Ok(true)
    }

    async fn mark_lesson_completed(&self, user_id: i64, lesson_id: i64) -> StoreResult<()> {
        let mut inner = self.lock();
        let id = inner.next_id();
        let entry = inner
            .progress
            .entry((user_id, lesson_id))
            .or_insert(LessonProgress {
                id,
                user_id,
                lesson_id,
                completed: false,
                read_seconds: 0,
            });
        entry.completed = true;
        Ok(())
    }

    async fn add_read_seconds(
        &self,
        user_id: i64,
        lesson_id: i64,
        seconds: i64,
    ) -> StoreResult<i64> {
        let mut inner = self.lock();
        let id = inner.next_id();
        let entry = inner
            .progress
            .entry((user_id, lesson_id))
            .or_insert(LessonProgress {
                id,
                user_id,
                lesson_id,
                completed: false,
                read_seconds: 0,
            });
        entry.read_seconds += seconds;
        Ok(entry.read_seconds)
    }

    async fn read_seconds(&self, user_id: i64, lesson_id: i64) -> StoreResult<i64> {
        Ok(self
            .lock()
            .progress
            .get(&(user_id, lesson_id))
            .map(|p| p.read_seconds)
            .unwrap_or(0))
    }

    async fn completed_lesson_count(&self, user_id: i64) -> StoreResult<i64> {
        Ok(self
            .lock()
            .progress
            .values()
            .filter(|p| p.user_id == user_id && p.completed)
            .count() as i64)
    }

    async fn replace_questions(
        &self,
        lesson_id: i64,
        questions: Vec<NewQuestion>,
    ) -> StoreResult<usize> {
        let mut inner = self.lock();
        inner.questions.retain(|_, q| q.lesson_id != lesson_id);
        let count = questions.len();
        for q in questions {
            let id = inner.next_id();
            inner.questions.insert(
                id,
                QuizQuestion {
                    id,
                    lesson_id,
                    question: q.question,
                    options: Json(q.options),
                    correct_option: q.correct_option,
                    active: true,
                },
            );
        }
        Ok(count)
    }

    async fn delete_questions(&self, lesson_id: i64) -> StoreResult<()> {
        self.lock()
            .questions
            .retain(|_, q| q.lesson_id != lesson_id);
        Ok(())
    }

    async fn active_questions(&self, lesson_id: i64) -> StoreResult<Vec<QuizQuestion>> {
        let mut questions: Vec<QuizQuestion> = self
            .lock()
            .questions
            .values()
            .filter(|q| q.lesson_id == lesson_id && q.active)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.id);
        Ok(questions)
    }

    async fn questions_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<QuizQuestion>> {
        let inner = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| inner.questions.get(id).cloned())
            .collect())
    }

    async fn quiz_config(&self, lesson_id: i64) -> StoreResult<Option<QuizConfig>> {
        Ok(self.lock().configs.get(&lesson_id).cloned())
    }

    async fn upsert_quiz_config(&self, cfg: &QuizConfig) -> StoreResult<QuizConfig> {
        self.lock().configs.insert(cfg.lesson_id, cfg.clone());
        Ok(cfg.clone())
    }

    async fn rate_limit(&self, user_id: i64) -> StoreResult<Option<QuizRateLimit>> {
        Ok(self.lock().rate_limits.get(&user_id).cloned())
    }

    async fn save_rate_limit(&self, rl: &QuizRateLimit) -> StoreResult<()> {
        self.lock().rate_limits.insert(rl.user_id, rl.clone());
        Ok(())
    }

    async fn insert_attempt(&self, new: NewAttempt) -> StoreResult<QuizAttempt> {
        let mut inner = self.lock();
        let id = inner.next_id();
        let attempt = QuizAttempt {
            id,
            user_id: new.user_id,
            lesson_id: new.lesson_id,
            question_ids: Json(new.question_ids),
            started_at: new.started_at,
            completed_at: None,
            total_time_seconds: None,
            score: None,
            passed: false,
            flagged_suspicious: false,
        };
        inner.attempts.insert(id, attempt.clone());
        Ok(attempt)
    }

    async fn attempt_by_id(&self, id: i64) -> StoreResult<Option<QuizAttempt>> {
        Ok(self.lock().attempts.get(&id).cloned())
    }

    async fn latest_attempt(
        &self,
        user_id: i64,
        lesson_id: i64,
    ) -> StoreResult<Option<QuizAttempt>> {
        Ok(self
            .lock()
            .attempts
            .values()
            .filter(|a| a.user_id == user_id && a.lesson_id == lesson_id)
            .max_by_key(|a| (a.started_at, a.id))
            .cloned())
    }

    async fn quiz_result(&self, user_id: i64, lesson_id: i64) -> StoreResult<Option<QuizResult>> {
        Ok(self.lock().results.get(&(user_id, lesson_id)).cloned())
    }

    async fn recent_results(&self, user_id: i64, limit: i64) -> StoreResult<Vec<QuizResult>> {
        let mut results: Vec<QuizResult> = self
            .lock()
            .results
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        results.truncate(limit as usize);
        Ok(results)
    }

    async fn result_count(&self, user_id: i64) -> StoreResult<i64> {
        Ok(self
            .lock()
            .results
            .values()
            .filter(|r| r.user_id == user_id)
            .count() as i64)
    }

    async fn finalize_submission(&self, outcome: SubmissionOutcome) -> StoreResult<QuizResult> {
        let mut inner = self.lock();
        let key = (outcome.user_id, outcome.lesson_id);
        if inner.results.contains_key(&key) {
            return Err(StoreError::Duplicate(
                "quiz result already exists for this lesson".to_string(),
            ));
        }

        let id = inner.next_id();
        let result = QuizResult {
            id,
            user_id: outcome.user_id,
            lesson_id: outcome.lesson_id,
            attempt_id: Some(outcome.attempt_id),
            score: outcome.score,
            correct_count: outcome.correct_count,
            wrong_count: outcome.wrong_count,
            created_at: outcome.completed_at,
        };
        inner.results.insert(key, result.clone());

        if let Some(attempt) = inner.attempts.get_mut(&outcome.attempt_id) {
            attempt.completed_at = Some(outcome.completed_at);
            attempt.total_time_seconds = Some(outcome.total_time_seconds);
            attempt.score = Some(outcome.score);
            attempt.passed = outcome.passed;
            attempt.flagged_suspicious = outcome.flagged_suspicious;
        }

        if outcome.tokens_awarded > 0 {
            if let Some(balance) = inner.wallets.get_mut(&outcome.user_id) {
                *balance += outcome.tokens_awarded;
            }
            let reward_id = inner.next_id();
            inner.rewards.push(Reward {
                id: reward_id,
                user_id: outcome.user_id,
                lesson_id: outcome.lesson_id,
                tokens_earned: outcome.tokens_awarded,
                reversed: false,
                created_at: outcome.completed_at,
            });
        }

        Ok(result)
    }

    async fn list_suspicious_attempts(&self) -> StoreResult<Vec<SuspiciousAttemptRow>> {
        let inner = self.lock();
        let mut rows: Vec<SuspiciousAttemptRow> = inner
            .attempts
            .values()
            .filter(|a| a.flagged_suspicious && a.completed_at.is_some())
            .map(|a| SuspiciousAttemptRow {
                attempt_id: a.id,
                user_id: a.user_id,
                user_name: inner
                    .users
                    .get(&a.user_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_default(),
                lesson_id: a.lesson_id,
                lesson_title: inner
                    .lessons
                    .get(&a.lesson_id)
                    .map(|l| l.title.clone())
                    .unwrap_or_default(),
                started_at: a.started_at,
                completed_at: a.completed_at,
                total_time_seconds: a.total_time_seconds,
                score: a.score,
                passed: a.passed,
            })
            .collect();
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(rows)
    }

    async fn insert_cheat_flag(&self, new: NewCheatFlag) -> StoreResult<CheatFlag> {
        let mut inner = self.lock();
        let id = inner.next_id();
        let flag = CheatFlag {
            id,
            user_id: new.user_id,
            lesson_id: new.lesson_id,
            flag_type: new.flag_type,
            severity: new.severity,
            description: new.description,
            metadata: new.metadata,
            reviewed: false,
            reviewed_by: None,
            reviewed_at: None,
            action_taken: None,
            created_at: Utc::now(),
        };
        inner.flags.insert(id, flag.clone());
        Ok(flag)
    }

    async fn list_cheat_flags(&self, unreviewed_only: bool) -> StoreResult<Vec<CheatFlagRow>> {
        let inner = self.lock();
        let mut rows: Vec<CheatFlagRow> = inner
            .flags
            .values()
            .filter(|f| !unreviewed_only || !f.reviewed)
            .map(|f| CheatFlagRow {
                id: f.id,
                user_id: f.user_id,
                user_name: inner
                    .users
                    .get(&f.user_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_default(),
                lesson_id: f.lesson_id,
                lesson_title: f
                    .lesson_id
                    .and_then(|id| inner.lessons.get(&id))
                    .map(|l| l.title.clone()),
                flag_type: f.flag_type.clone(),
                severity: f.severity.clone(),
                description: f.description.clone(),
                metadata: f.metadata.clone(),
                reviewed: f.reviewed,
                action_taken: f.action_taken.clone(),
                created_at: f.created_at,
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn review_cheat_flag(
        &self,
        flag_id: i64,
        reviewer_id: i64,
        action: &str,
        reviewed_at: DateTime<Utc>,
    ) -> StoreResult<ReviewOutcome> {
        let mut inner = self.lock();
        let (user_id, lesson_id) = match inner.flags.get(&flag_id) {
            Some(flag) => (flag.user_id, flag.lesson_id),
            None => return Err(StoreError::NotFound),
        };

        let mut tokens_revoked = 0;

        if action == ACTION_TOKENS_REVOKED {
            if let Some(lesson_id) = lesson_id {
                let reward = inner
                    .rewards
                    .iter_mut()
                    .filter(|r| r.user_id == user_id && r.lesson_id == lesson_id && !r.reversed)
                    .max_by_key(|r| (r.created_at, r.id));
                if let Some(reward) = reward {
                    reward.reversed = true;
                    tokens_revoked = reward.tokens_earned;
                }
                if tokens_revoked > 0 {
                    if let Some(balance) = inner.wallets.get_mut(&user_id) {
                        *balance = (*balance - tokens_revoked).max(0);
                    }
                }
            }
        }

        let flag = inner
            .flags
            .get_mut(&flag_id)
            .ok_or(StoreError::NotFound)?;
        flag.reviewed = true;
        flag.reviewed_by = Some(reviewer_id);
        flag.reviewed_at = Some(reviewed_at);
        flag.action_taken = Some(action.to_string());

        Ok(ReviewOutcome {
            flag: flag.clone(),
            tokens_revoked,
        })
    }
}
