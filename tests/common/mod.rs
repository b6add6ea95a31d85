// tests/common/mod.rs

use std::sync::Arc;

use reads_backend::clock::ManualClock;
use reads_backend::config::Config;
use reads_backend::notify::LogNotifier;
use reads_backend::routes;
use reads_backend::state::AppState;
use reads_backend::store::MemoryStore;
use serde_json::{Value, json};

/// A running test server backed by the in-memory store and a manual clock.
///
/// The clock handle is shared with the server, so tests can cross rate-limit
/// windows and cooldowns without sleeping.
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub clock: Arc<ManualClock>,
}

/// Spawns the app on a random port.
pub async fn spawn_app() -> TestApp {
    let clock = Arc::new(ManualClock::new("2026-01-01T00:00:00Z".parse().unwrap()));

    let config = Config {
        database_url: String::new(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
    };

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        config,
        clock: clock.clone(),
        notifier: Arc::new(LogNotifier),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        clock,
    }
}

impl TestApp {
    /// Registers a user and returns the bearer token. The first signup on a
    /// fresh app becomes the admin.
    pub async fn signup(&self, name: &str) -> String {
        let email = format!("{}_{}@example.com", name, &uuid::Uuid::new_v4().to_string()[..8]);
        let response = self
            .client
            .post(format!("{}/api/auth/signup", self.address))
            .json(&json!({
                "name": name,
                "email": email,
                "password": "password123"
            }))
            .send()
            .await
            .expect("Failed to execute signup");
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// Creates a lesson as admin and returns its id.
    pub async fn create_lesson(&self, admin_token: &str, title: &str) -> i64 {
        let response = self
            .client
            .post(format!("{}/api/admin/lessons", self.address))
            .bearer_auth(admin_token)
            .json(&json!({
                "category": "JAMB",
                "title": title,
                "content": "<p>Lesson body text.</p>"
            }))
            .send()
            .await
            .expect("Failed to create lesson");
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    /// Uploads a question pool. Each entry is the correct option letter; the
    /// question text embeds it so tests can answer right or wrong on purpose.
    pub async fn upload_questions(&self, admin_token: &str, lesson_id: i64, correct: &[&str]) {
        let questions: Vec<Value> = correct
            .iter()
            .enumerate()
            .map(|(i, letter)| {
                json!({
                    "question": format!("q{} answer:{}", i, letter),
                    "options": ["A", "B", "C", "D"],
                    "correct_option": letter
                })
            })
            .collect();

        let response = self
            .client
            .post(format!(
                "{}/api/admin/lessons/{}/questions",
                self.address, lesson_id
            ))
            .bearer_auth(admin_token)
            .json(&json!({ "questions": questions }))
            .send()
            .await
            .expect("Failed to upload questions");
        assert_eq!(response.status().as_u16(), 201);
    }

    /// Records enough read time on the lesson to clear the default gate.
    pub async fn read_lesson(&self, token: &str, lesson_id: i64) {
        let response = self
            .client
            .post(format!(
                "{}/api/lessons/{}/read-time",
                self.address, lesson_id
            ))
            .bearer_auth(token)
            .json(&json!({ "seconds": 60 }))
            .send()
            .await
            .expect("Failed to record read time");
        assert_eq!(response.status().as_u16(), 200);
    }

    pub async fn start_quiz(&self, token: &str, lesson_id: i64) -> reqwest::Response {
        self.client
            .post(format!("{}/api/quiz/start", self.address))
            .bearer_auth(token)
            .json(&json!({ "lesson_id": lesson_id }))
            .send()
            .await
            .expect("Failed to start quiz")
    }

    /// Submits answers for the attempt. `correct` decides whether each answer
    /// uses the letter embedded in the question text or a wrong one.
    pub async fn submit_quiz(
        &self,
        token: &str,
        start_body: &Value,
        correct: bool,
        seconds_per_question: i64,
    ) -> reqwest::Response {
        let questions = start_body["questions"].as_array().unwrap();
        let answers: Vec<Value> = questions
            .iter()
            .map(|q| {
                let text = q["question"].as_str().unwrap();
                let right = text.rsplit("answer:").next().unwrap();
                let selected = if correct {
                    right.to_string()
                } else {
                    // Any letter other than the right one.
                    if right == "A" { "B".to_string() } else { "A".to_string() }
                };
                json!({
                    "question_id": q["id"],
                    "selected": selected,
                    "time_spent_seconds": seconds_per_question
                })
            })
            .collect();
        let total: i64 = seconds_per_question * questions.len() as i64;

        self.client
            .post(format!("{}/api/quiz/submit", self.address))
            .bearer_auth(token)
            .json(&json!({
                "attempt_id": start_body["attempt_id"],
                "lesson_id": start_body["lesson_id"],
                "answers": answers,
                "total_time_seconds": total
            }))
            .send()
            .await
            .expect("Failed to submit quiz")
    }

    pub async fn balance(&self, token: &str) -> i64 {
        let response = self
            .client
            .get(format!("{}/api/wallet/balance", self.address))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to fetch balance");
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        body["token_balance"].as_i64().unwrap()
    }
}
