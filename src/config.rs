// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Attempt-start budget per rolling hour, shared across all lessons.
pub const HOURLY_ATTEMPT_LIMIT: i64 = 10;
/// Attempt-start budget per rolling day.
pub const DAILY_ATTEMPT_LIMIT: i64 = 30;
pub const HOURLY_WINDOW_SECONDS: i64 = 3600;
pub const DAILY_WINDOW_SECONDS: i64 = 86400;

/// Applied when a lesson has no quiz config row.
pub const DEFAULT_QUESTIONS_PER_QUIZ: i64 = 3;
pub const DEFAULT_TOKEN_REWARD: i64 = 50;
pub const DEFAULT_PASSING_SCORE: i64 = 70;
pub const DEFAULT_COOLDOWN_SECONDS: i64 = 30;
pub const DEFAULT_MIN_READ_TIME_SECONDS: i64 = 30;
pub const DEFAULT_MIN_TIME_PER_QUESTION: i64 = 3;

/// Tokens seeded into every wallet at signup.
pub const SIGNUP_TOKEN_BONUS: i64 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        }
    }
}
