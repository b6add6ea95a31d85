// src/quiz/cooldown.rs

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::AppError;
use crate::store::QuizStore;

/// Outcome of a cooldown check.
#[derive(Debug, Clone, Copy)]
pub struct CooldownStatus {
    pub can_attempt: bool,
    /// Whole seconds until the next attempt is allowed; 0 when allowed.
    pub remaining_seconds: i64,
}

/// Seconds left of the cooldown, rounded down. 0 when the cooldown elapsed.
pub fn remaining_seconds(
    last_started_at: DateTime<Utc>,
    now: DateTime<Utc>,
    cooldown_seconds: i64,
) -> i64 {
    let elapsed = (now - last_started_at).num_seconds();
    (cooldown_seconds - elapsed).max(0)
}

/// Enforces minimum spacing between attempt starts on the same lesson.
/// A user with no prior attempt is always allowed.
pub async fn check(
    store: &dyn QuizStore,
    clock: &dyn Clock,
    user_id: i64,
    lesson_id: i64,
    cooldown_seconds: i64,
) -> Result<CooldownStatus, AppError> {
    let last = store.latest_attempt(user_id, lesson_id).await?;

    let remaining = match last {
        Some(attempt) => remaining_seconds(attempt.started_at, clock.now(), cooldown_seconds),
        None => 0,
    };

    Ok(CooldownStatus {
        can_attempt: remaining == 0,
        remaining_seconds: remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_time() -> DateTime<Utc> {
        "2026-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn remaining_counts_down_in_whole_seconds() {
        let started = base_time();
        let now = started + Duration::milliseconds(12500);
        // 30s cooldown, 12.5s elapsed -> 18s left (12s counted, floor).
        assert_eq!(remaining_seconds(started, now, 30), 18);
    }

    #[test]
    fn elapsed_cooldown_allows() {
        let started = base_time();
        assert_eq!(
            remaining_seconds(started, started + Duration::seconds(30), 30),
            0
        );
        assert_eq!(
            remaining_seconds(started, started + Duration::seconds(31), 30),
            0
        );
    }

    #[test]
    fn immediate_retry_is_blocked_for_full_window() {
        let started = base_time();
        assert_eq!(remaining_seconds(started, started, 30), 30);
    }
}
