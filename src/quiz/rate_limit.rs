// src/quiz/rate_limit.rs

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::config::{
    DAILY_ATTEMPT_LIMIT, DAILY_WINDOW_SECONDS, HOURLY_ATTEMPT_LIMIT, HOURLY_WINDOW_SECONDS,
};
use crate::error::AppError;
use crate::models::quiz::QuizRateLimit;
use crate::store::QuizStore;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone)]
pub struct RateLimitStatus {
    pub can_attempt: bool,
    pub hourly_remaining: i64,
    pub daily_remaining: i64,
    pub reason: Option<String>,
}

/// Rolls expired windows forward. Resets are lazy: nothing runs in the
/// background, counters are corrected whenever they are read.
/// Returns true when a window was reset and the row needs saving.
pub fn apply_lazy_resets(rl: &mut QuizRateLimit, now: DateTime<Utc>) -> bool {
    let mut changed = false;
    if (now - rl.hourly_reset_at).num_seconds() >= HOURLY_WINDOW_SECONDS {
        rl.hourly_attempts = 0;
        rl.hourly_reset_at = now;
        changed = true;
    }
    if (now - rl.daily_reset_at).num_seconds() >= DAILY_WINDOW_SECONDS {
        rl.daily_attempts = 0;
        rl.daily_reset_at = now;
        changed = true;
    }
    changed
}

/// Evaluates the counters against the fixed limits.
pub fn status_of(rl: &QuizRateLimit) -> RateLimitStatus {
    let hourly_remaining = (HOURLY_ATTEMPT_LIMIT - rl.hourly_attempts).max(0);
    let daily_remaining = (DAILY_ATTEMPT_LIMIT - rl.daily_attempts).max(0);

    let reason = if rl.hourly_attempts >= HOURLY_ATTEMPT_LIMIT {
        Some(format!(
            "Hourly attempt limit of {} reached",
            HOURLY_ATTEMPT_LIMIT
        ))
    } else if rl.daily_attempts >= DAILY_ATTEMPT_LIMIT {
        Some(format!(
            "Daily attempt limit of {} reached",
            DAILY_ATTEMPT_LIMIT
        ))
    } else {
        None
    };

    RateLimitStatus {
        can_attempt: reason.is_none(),
        hourly_remaining,
        daily_remaining,
        reason,
    }
}

/// Checks the user's attempt budget, creating a zeroed counter row on the
/// first check for this user.
pub async fn check_and_maybe_init(
    store: &dyn QuizStore,
    clock: &dyn Clock,
    user_id: i64,
) -> Result<RateLimitStatus, AppError> {
    let now = clock.now();

    let mut rl = match store.rate_limit(user_id).await? {
        Some(rl) => rl,
        None => {
            let rl = QuizRateLimit::new(user_id, now);
            store.save_rate_limit(&rl).await?;
            rl
        }
    };

    if apply_lazy_resets(&mut rl, now) {
        store.save_rate_limit(&rl).await?;
    }

    Ok(status_of(&rl))
}

/// Consumes one attempt from both windows. Called only after an attempt is
/// actually started, never at submit.
pub async fn record_attempt(
    store: &dyn QuizStore,
    clock: &dyn Clock,
    user_id: i64,
) -> Result<(), AppError> {
    let now = clock.now();

    let mut rl = match store.rate_limit(user_id).await? {
        Some(rl) => rl,
        None => QuizRateLimit::new(user_id, now),
    };

    apply_lazy_resets(&mut rl, now);
    rl.hourly_attempts += 1;
    rl.daily_attempts += 1;
    rl.last_attempt_at = Some(now);

    store.save_rate_limit(&rl).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_time() -> DateTime<Utc> {
        "2026-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn fresh_counters_allow_attempts() {
        let rl = QuizRateLimit::new(1, base_time());
        let status = status_of(&rl);
        assert!(status.can_attempt);
        assert_eq!(status.hourly_remaining, HOURLY_ATTEMPT_LIMIT);
        assert_eq!(status.daily_remaining, DAILY_ATTEMPT_LIMIT);
    }

    #[test]
    fn hourly_limit_blocks_with_reason() {
        let mut rl = QuizRateLimit::new(1, base_time());
        rl.hourly_attempts = HOURLY_ATTEMPT_LIMIT;
        rl.daily_attempts = HOURLY_ATTEMPT_LIMIT;
        let status = status_of(&rl);
        assert!(!status.can_attempt);
        assert_eq!(status.hourly_remaining, 0);
        // The other window still reports its remaining budget.
        assert_eq!(
            status.daily_remaining,
            DAILY_ATTEMPT_LIMIT - HOURLY_ATTEMPT_LIMIT
        );
        assert!(status.reason.unwrap().contains("Hourly"));
    }

    #[test]
    fn daily_limit_blocks_even_after_hourly_reset() {
        let mut rl = QuizRateLimit::new(1, base_time());
        rl.hourly_attempts = 2;
        rl.daily_attempts = DAILY_ATTEMPT_LIMIT;
        let status = status_of(&rl);
        assert!(!status.can_attempt);
        assert!(status.reason.unwrap().contains("Daily"));
    }

    #[test]
    fn hourly_window_resets_after_3600_seconds() {
        let mut rl = QuizRateLimit::new(1, base_time());
        rl.hourly_attempts = HOURLY_ATTEMPT_LIMIT;
        rl.daily_attempts = HOURLY_ATTEMPT_LIMIT;

        let just_before = base_time() + Duration::seconds(HOURLY_WINDOW_SECONDS - 1);
        assert!(!apply_lazy_resets(&mut rl, just_before));
        assert!(!status_of(&rl).can_attempt);

        let at_boundary = base_time() + Duration::seconds(HOURLY_WINDOW_SECONDS);
        assert!(apply_lazy_resets(&mut rl, at_boundary));
        assert_eq!(rl.hourly_attempts, 0);
        assert_eq!(rl.hourly_reset_at, at_boundary);
        // Daily window untouched.
        assert_eq!(rl.daily_attempts, HOURLY_ATTEMPT_LIMIT);
        assert!(status_of(&rl).can_attempt);
    }

    #[test]
    fn daily_window_resets_after_86400_seconds() {
        let mut rl = QuizRateLimit::new(1, base_time());
        rl.daily_attempts = DAILY_ATTEMPT_LIMIT;

        let next_day = base_time() + Duration::seconds(DAILY_WINDOW_SECONDS);
        assert!(apply_lazy_resets(&mut rl, next_day));
        assert_eq!(rl.daily_attempts, 0);
        assert!(status_of(&rl).can_attempt);
    }
}
