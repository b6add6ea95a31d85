// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};

use crate::models::{
    cheat_flag::{ACTION_TOKENS_REVOKED, CheatFlag, CheatFlagRow, NewCheatFlag},
    lesson::{CategoryCount, Lesson},
    question::QuizQuestion,
    quiz::{QuizAttempt, QuizConfig, QuizRateLimit, QuizResult, SuspiciousAttemptRow},
    user::User,
    wallet::{Reward, RewardHistoryRow},
};

use super::{
    NewAttempt, NewLesson, NewQuestion, NewUser, QuizStore, ReviewOutcome, StoreResult,
    SubmissionOutcome,
};

/// `QuizStore` backed by Postgres.
///
/// Uses the runtime query API throughout; multi-step mutations run inside an
/// explicit transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, is_admin, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.is_admin)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO wallets (user_id, token_balance) VALUES ($1, $2)")
            .bind(user.id)
            .bind(new.starting_balance)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin, created_at FROM users ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn set_user_admin(&self, id: i64, is_admin: bool) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET is_admin = $1 WHERE id = $2")
            .bind(is_admin)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn wallet_balance(&self, user_id: i64) -> StoreResult<Option<i64>> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT token_balance FROM wallets WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(balance)
    }

    async fn reward_history(&self, user_id: i64, limit: i64) -> StoreResult<Vec<RewardHistoryRow>> {
        let rows = sqlx::query_as::<_, RewardHistoryRow>(
            r#"
            SELECT r.id, l.title AS lesson_title, r.tokens_earned, r.reversed, r.created_at
            FROM rewards r
            JOIN lessons l ON r.lesson_id = l.id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn reward_summary(&self, user_id: i64) -> StoreResult<(i64, i64)> {
        let row: (Option<i64>, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(tokens_earned), 0), COUNT(*)
            FROM rewards
            WHERE user_id = $1 AND reversed = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok((row.0.unwrap_or(0), row.1))
    }

    async fn create_lesson(&self, new: NewLesson) -> StoreResult<Lesson> {
        let lesson = sqlx::query_as::<_, Lesson>(
            r#"
            INSERT INTO lessons (category, title, content, video_url, order_index)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, category, title, content, video_url, order_index, created_at
            "#,
        )
        .bind(&new.category)
        .bind(&new.title)
        .bind(&new.content)
        .bind(&new.video_url)
        .bind(new.order_index)
        .fetch_one(&self.pool)
        .await?;
        Ok(lesson)
    }

    async fn lesson_by_id(&self, id: i64) -> StoreResult<Option<Lesson>> {
        let lesson = sqlx::query_as::<_, Lesson>(
            "SELECT id, category, title, content, video_url, order_index, created_at FROM lessons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lesson)
    }

    async fn list_lessons(&self) -> StoreResult<Vec<Lesson>> {
        let lessons = sqlx::query_as::<_, Lesson>(
            "SELECT id, category, title, content, video_url, order_index, created_at FROM lessons ORDER BY category, order_index",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(lessons)
    }

    async fn lessons_by_category(&self, category: &str) -> StoreResult<Vec<Lesson>> {
        let lessons = sqlx::query_as::<_, Lesson>(
            "SELECT id, category, title, content, video_url, order_index, created_at FROM lessons WHERE category = $1 ORDER BY order_index",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(lessons)
    }

    async fn lesson_categories(&self) -> StoreResult<Vec<CategoryCount>> {
        let rows = sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM lessons GROUP BY category ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_lesson(&self, id: i64) -> StoreResult<bool> {
        // Dependent rows go via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_lesson_completed(&self, user_id: i64, lesson_id: i64) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO lesson_progress (user_id, lesson_id, completed)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (user_id, lesson_id) DO UPDATE SET completed = TRUE
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_read_seconds(
        &self,
        user_id: i64,
        lesson_id: i64,
        seconds: i64,
    ) -> StoreResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO lesson_progress (user_id, lesson_id, read_seconds)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, lesson_id)
                DO UPDATE SET read_seconds = lesson_progress.read_seconds + EXCLUDED.read_seconds
            RETURNING read_seconds
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .bind(seconds)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn read_seconds(&self, user_id: i64, lesson_id: i64) -> StoreResult<i64> {
        let seconds: Option<i64> = sqlx::query_scalar(
            "SELECT read_seconds FROM lesson_progress WHERE user_id = $1 AND lesson_id = $2",
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(seconds.unwrap_or(0))
    }

    async fn completed_lesson_count(&self, user_id: i64) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lesson_progress WHERE user_id = $1 AND completed = TRUE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn replace_questions(
        &self,
        lesson_id: i64,
        questions: Vec<NewQuestion>,
    ) -> StoreResult<usize> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM quiz_questions WHERE lesson_id = $1")
            .bind(lesson_id)
            .execute(&mut *tx)
            .await?;

        let count = questions.len();
        for q in questions {
            sqlx::query(
                r#"
                INSERT INTO quiz_questions (lesson_id, question, options, correct_option, active)
                VALUES ($1, $2, $3, $4, TRUE)
                "#,
            )
            .bind(lesson_id)
            .bind(&q.question)
            .bind(Json(&q.options))
            .bind(&q.correct_option)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(count)
    }

    async fn delete_questions(&self, lesson_id: i64) -> StoreResult<()> {
        sqlx::query("DELETE FROM quiz_questions WHERE lesson_id = $1")
            .bind(lesson_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn active_questions(&self, lesson_id: i64) -> StoreResult<Vec<QuizQuestion>> {
        let questions = sqlx::query_as::<_, QuizQuestion>(
            "SELECT id, lesson_id, question, options, correct_option, active FROM quiz_questions WHERE lesson_id = $1 AND active = TRUE",
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn questions_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<QuizQuestion>> {
        let questions = sqlx::query_as::<_, QuizQuestion>(
            "SELECT id, lesson_id, question, options, correct_option, active FROM quiz_questions WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn quiz_config(&self, lesson_id: i64) -> StoreResult<Option<QuizConfig>> {
        let cfg = sqlx::query_as::<_, QuizConfig>(
            r#"
            SELECT lesson_id, questions_per_quiz, token_reward, passing_score,
                   cooldown_seconds, min_read_time_seconds, min_time_per_question
            FROM quiz_configs WHERE lesson_id = $1
            "#,
        )
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cfg)
    }

    async fn upsert_quiz_config(&self, cfg: &QuizConfig) -> StoreResult<QuizConfig> {
        let cfg = sqlx::query_as::<_, QuizConfig>(
            r#"
            INSERT INTO quiz_configs
                (lesson_id, questions_per_quiz, token_reward, passing_score,
                 cooldown_seconds, min_read_time_seconds, min_time_per_question)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (lesson_id) DO UPDATE SET
                questions_per_quiz = EXCLUDED.questions_per_quiz,
                token_reward = EXCLUDED.token_reward,
                passing_score = EXCLUDED.passing_score,
                cooldown_seconds = EXCLUDED.cooldown_seconds,
                min_read_time_seconds = EXCLUDED.min_read_time_seconds,
                min_time_per_question = EXCLUDED.min_time_per_question
            RETURNING lesson_id, questions_per_quiz, token_reward, passing_score,
                      cooldown_seconds, min_read_time_seconds, min_time_per_question
            "#,
        )
        .bind(cfg.lesson_id)
        .bind(cfg.questions_per_quiz)
        .bind(cfg.token_reward)
        .bind(cfg.passing_score)
        .bind(cfg.cooldown_seconds)
        .bind(cfg.min_read_time_seconds)
        .bind(cfg.min_time_per_question)
        .fetch_one(&self.pool)
        .await?;
        Ok(cfg)
    }

    async fn rate_limit(&self, user_id: i64) -> StoreResult<Option<QuizRateLimit>> {
        let rl = sqlx::query_as::<_, QuizRateLimit>(
            r#"
            SELECT user_id, hourly_attempts, daily_attempts,
                   hourly_reset_at, daily_reset_at, last_attempt_at
            FROM quiz_rate_limits WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rl)
    }

    async fn save_rate_limit(&self, rl: &QuizRateLimit) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO quiz_rate_limits
                (user_id, hourly_attempts, daily_attempts,
                 hourly_reset_at, daily_reset_at, last_attempt_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                hourly_attempts = EXCLUDED.hourly_attempts,
                daily_attempts = EXCLUDED.daily_attempts,
                hourly_reset_at = EXCLUDED.hourly_reset_at,
                daily_reset_at = EXCLUDED.daily_reset_at,
                last_attempt_at = EXCLUDED.last_attempt_at
            "#,
        )
        .bind(rl.user_id)
        .bind(rl.hourly_attempts)
        .bind(rl.daily_attempts)
        .bind(rl.hourly_reset_at)
        .bind(rl.daily_reset_at)
        .bind(rl.last_attempt_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_attempt(&self, new: NewAttempt) -> StoreResult<QuizAttempt> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (user_id, lesson_id, question_ids, started_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, lesson_id, question_ids, started_at, completed_at,
                      total_time_seconds, score, passed, flagged_suspicious
            "#,
        )
        .bind(new.user_id)
        .bind(new.lesson_id)
        .bind(Json(&new.question_ids))
        .bind(new.started_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn attempt_by_id(&self, id: i64) -> StoreResult<Option<QuizAttempt>> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            SELECT id, user_id, lesson_id, question_ids, started_at, completed_at,
                   total_time_seconds, score, passed, flagged_suspicious
            FROM quiz_attempts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn latest_attempt(
        &self,
        user_id: i64,
        lesson_id: i64,
    ) -> StoreResult<Option<QuizAttempt>> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            SELECT id, user_id, lesson_id, question_ids, started_at, completed_at,
                   total_time_seconds, score, passed, flagged_suspicious
            FROM quiz_attempts
            WHERE user_id = $1 AND lesson_id = $2
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn quiz_result(&self, user_id: i64, lesson_id: i64) -> StoreResult<Option<QuizResult>> {
        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT id, user_id, lesson_id, attempt_id, score, correct_count, wrong_count, created_at
            FROM quiz_results WHERE user_id = $1 AND lesson_id = $2
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(result)
    }

    async fn recent_results(&self, user_id: i64, limit: i64) -> StoreResult<Vec<QuizResult>> {
        let results = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT id, user_id, lesson_id, attempt_id, score, correct_count, wrong_count, created_at
            FROM quiz_results
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }

    async fn result_count(&self, user_id: i64) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_results WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn finalize_submission(&self, outcome: SubmissionOutcome) -> StoreResult<QuizResult> {
        let mut tx = self.pool.begin().await?;

        // The unique (user_id, lesson_id) index makes a concurrent duplicate
        // submit abort here before any wallet mutation.
        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            INSERT INTO quiz_results
                (user_id, lesson_id, attempt_id, score, correct_count, wrong_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, lesson_id, attempt_id, score, correct_count, wrong_count, created_at
            "#,
        )
        .bind(outcome.user_id)
        .bind(outcome.lesson_id)
        .bind(outcome.attempt_id)
        .bind(outcome.score)
        .bind(outcome.correct_count)
        .bind(outcome.wrong_count)
        .bind(outcome.completed_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE quiz_attempts
            SET completed_at = $1, total_time_seconds = $2, score = $3,
                passed = $4, flagged_suspicious = $5
            WHERE id = $6
            "#,
        )
        .bind(outcome.completed_at)
        .bind(outcome.total_time_seconds)
        .bind(outcome.score)
        .bind(outcome.passed)
        .bind(outcome.flagged_suspicious)
        .bind(outcome.attempt_id)
        .execute(&mut *tx)
        .await?;

        if outcome.tokens_awarded > 0 {
            sqlx::query("UPDATE wallets SET token_balance = token_balance + $1 WHERE user_id = $2")
                .bind(outcome.tokens_awarded)
                .bind(outcome.user_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                INSERT INTO rewards (user_id, lesson_id, tokens_earned, created_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(outcome.user_id)
            .bind(outcome.lesson_id)
            .bind(outcome.tokens_awarded)
            .bind(outcome.completed_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(result)
    }

    async fn list_suspicious_attempts(&self) -> StoreResult<Vec<SuspiciousAttemptRow>> {
        let rows = sqlx::query_as::<_, SuspiciousAttemptRow>(
            r#"
            SELECT a.id AS attempt_id, a.user_id, u.name AS user_name,
                   a.lesson_id, l.title AS lesson_title,
                   a.started_at, a.completed_at, a.total_time_seconds, a.score, a.passed
            FROM quiz_attempts a
            JOIN users u ON a.user_id = u.id
            JOIN lessons l ON a.lesson_id = l.id
            WHERE a.flagged_suspicious = TRUE AND a.completed_at IS NOT NULL
            ORDER BY a.completed_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_cheat_flag(&self, new: NewCheatFlag) -> StoreResult<CheatFlag> {
        let flag = sqlx::query_as::<_, CheatFlag>(
            r#"
            INSERT INTO cheat_flags (user_id, lesson_id, flag_type, severity, description, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, lesson_id, flag_type, severity, description, metadata,
                      reviewed, reviewed_by, reviewed_at, action_taken, created_at
            "#,
        )
        .bind(new.user_id)
        .bind(new.lesson_id)
        .bind(&new.flag_type)
        .bind(&new.severity)
        .bind(&new.description)
        .bind(&new.metadata)
        .fetch_one(&self.pool)
        .await?;
        Ok(flag)
    }

    async fn list_cheat_flags(&self, unreviewed_only: bool) -> StoreResult<Vec<CheatFlagRow>> {
        let mut sql = String::from(
            r#"
            SELECT f.id, f.user_id, u.name AS user_name,
                   f.lesson_id, l.title AS lesson_title,
                   f.flag_type, f.severity, f.description, f.metadata,
                   f.reviewed, f.action_taken, f.created_at
            FROM cheat_flags f
            JOIN users u ON f.user_id = u.id
            LEFT JOIN lessons l ON f.lesson_id = l.id
            "#,
        );
        if unreviewed_only {
            sql.push_str(" WHERE f.reviewed = FALSE");
        }
        sql.push_str(" ORDER BY f.created_at DESC, f.id DESC");

        let rows = sqlx::query_as::<_, CheatFlagRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn review_cheat_flag(
        &self,
        flag_id: i64,
        reviewer_id: i64,
        action: &str,
        reviewed_at: DateTime<Utc>,
    ) -> StoreResult<ReviewOutcome> {
        let mut tx = self.pool.begin().await?;

        let flag = sqlx::query_as::<_, CheatFlag>(
            r#"
            SELECT id, user_id, lesson_id, flag_type, severity, description, metadata,
                   reviewed, reviewed_by, reviewed_at, action_taken, created_at
            FROM cheat_flags WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(flag_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut tokens_revoked = 0;

        if action == ACTION_TOKENS_REVOKED {
            if let Some(lesson_id) = flag.lesson_id {
                let reward = sqlx::query_as::<_, Reward>(
                    r#"
                    SELECT id, user_id, lesson_id, tokens_earned, reversed, created_at
                    FROM rewards
                    WHERE user_id = $1 AND lesson_id = $2 AND reversed = FALSE
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                    FOR UPDATE
                    "#,
                )
                .bind(flag.user_id)
                .bind(lesson_id)
                .fetch_optional(&mut *tx)
                .await?;

                if let Some(reward) = reward {
                    sqlx::query("UPDATE rewards SET reversed = TRUE WHERE id = $1")
                        .bind(reward.id)
                        .execute(&mut *tx)
                        .await?;

                    sqlx::query(
                        r#"
                        UPDATE wallets
                        SET token_balance = GREATEST(token_balance - $1, 0)
                        WHERE user_id = $2
                        "#,
                    )
                    .bind(reward.tokens_earned)
                    .bind(flag.user_id)
                    .execute(&mut *tx)
                    .await?;

                    tokens_revoked = reward.tokens_earned;
                }
            }
        }

        let flag = sqlx::query_as::<_, CheatFlag>(
            r#"
            UPDATE cheat_flags
            SET reviewed = TRUE, reviewed_by = $1, reviewed_at = $2, action_taken = $3
            WHERE id = $4
            RETURNING id, user_id, lesson_id, flag_type, severity, description, metadata,
                      reviewed, reviewed_by, reviewed_at, action_taken, created_at
            "#,
        )
        .bind(reviewer_id)
        .bind(reviewed_at)
        .bind(action)
        .bind(flag_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ReviewOutcome {
            flag,
            tokens_revoked,
        })
    }
}
