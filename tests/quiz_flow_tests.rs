// tests/quiz_flow_tests.rs

mod common;

use common::spawn_app;
use serde_json::Value;

#[tokio::test]
async fn passing_quiz_awards_tokens_and_locks_the_lesson() {
    // Arrange
    let app = spawn_app().await;
    let admin = app.signup("admin").await;
    let user = app.signup("learner").await;
    let lesson_id = app.create_lesson(&admin, "Fractions").await;
    app.upload_questions(&admin, lesson_id, &["A", "B", "C", "D", "A"])
        .await;
    app.read_lesson(&user, lesson_id).await;

    // Act
    let start = app.start_quiz(&user, lesson_id).await;
    assert_eq!(start.status().as_u16(), 200);
    let start_body: Value = start.json().await.unwrap();
    assert_eq!(start_body["questions"].as_array().unwrap().len(), 3);
    // Served questions must not leak the answer key.
    for q in start_body["questions"].as_array().unwrap() {
        assert!(q.get("correct_option").is_none());
    }

    app.clock.advance_seconds(30);
    let submit = app.submit_quiz(&user, &start_body, true, 10).await;

    // Assert
    assert_eq!(submit.status().as_u16(), 200);
    let body: Value = submit.json().await.unwrap();
    assert_eq!(body["score"], 100);
    assert_eq!(body["passed"], true);
    assert_eq!(body["flagged_suspicious"], false);
    assert_eq!(body["tokens_awarded"], 50);

    // Signup bonus 50 + reward 50.
    assert_eq!(app.balance(&user).await, 100);

    // The permanent result blocks any further attempt on this lesson.
    app.clock.advance_seconds(3600);
    let again = app.start_quiz(&user, lesson_id).await;
    assert_eq!(again.status().as_u16(), 409);
}

#[tokio::test]
async fn failing_quiz_awards_nothing() {
    let app = spawn_app().await;
    let admin = app.signup("admin").await;
    let user = app.signup("learner").await;
    let lesson_id = app.create_lesson(&admin, "Algebra").await;
    app.upload_questions(&admin, lesson_id, &["A", "B", "C", "D"])
        .await;
    app.read_lesson(&user, lesson_id).await;

    let start = app.start_quiz(&user, lesson_id).await;
    let start_body: Value = start.json().await.unwrap();

    app.clock.advance_seconds(30);
    let submit = app.submit_quiz(&user, &start_body, false, 10).await;

    assert_eq!(submit.status().as_u16(), 200);
    let body: Value = submit.json().await.unwrap();
    assert_eq!(body["score"], 0);
    assert_eq!(body["passed"], false);
    assert_eq!(body["tokens_awarded"], 0);
    assert_eq!(app.balance(&user).await, 50);
}

#[tokio::test]
async fn fast_submission_is_graded_but_not_rewarded() {
    let app = spawn_app().await;
    let admin = app.signup("admin").await;
    let user = app.signup("learner").await;
    let lesson_id = app.create_lesson(&admin, "Geometry").await;
    app.upload_questions(&admin, lesson_id, &["A", "B", "C", "D"])
        .await;
    app.read_lesson(&user, lesson_id).await;

    let start = app.start_quiz(&user, lesson_id).await;
    let start_body: Value = start.json().await.unwrap();

    // 2 seconds for a 3-question quiz, well under the 9s minimum.
    app.clock.advance_seconds(2);
    let submit = app.submit_quiz(&user, &start_body, true, 1).await;

    assert_eq!(submit.status().as_u16(), 200);
    let body: Value = submit.json().await.unwrap();
    assert_eq!(body["score"], 100);
    assert_eq!(body["passed"], true);
    assert_eq!(body["flagged_suspicious"], true);
    assert_eq!(body["tokens_awarded"], 0);
    assert!(body["message"].as_str().is_some());
    assert_eq!(app.balance(&user).await, 50);
}

#[tokio::test]
async fn attempt_is_terminal_after_submission() {
    let app = spawn_app().await;
    let admin = app.signup("admin").await;
    let user = app.signup("learner").await;
    let lesson_id = app.create_lesson(&admin, "Physics").await;
    app.upload_questions(&admin, lesson_id, &["A", "B", "C", "D"])
        .await;
    app.read_lesson(&user, lesson_id).await;

    let start = app.start_quiz(&user, lesson_id).await;
    let start_body: Value = start.json().await.unwrap();

    app.clock.advance_seconds(30);
    let first = app.submit_quiz(&user, &start_body, true, 10).await;
    assert_eq!(first.status().as_u16(), 200);

    let second = app.submit_quiz(&user, &start_body, true, 10).await;
    assert_eq!(second.status().as_u16(), 400);
    let body: Value = second.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("already submitted"));
}

#[tokio::test]
async fn cooldown_blocks_an_immediate_restart() {
    let app = spawn_app().await;
    let admin = app.signup("admin").await;
    let user = app.signup("learner").await;
    let lesson_id = app.create_lesson(&admin, "Chemistry").await;
    app.upload_questions(&admin, lesson_id, &["A", "B", "C", "D"])
        .await;
    app.read_lesson(&user, lesson_id).await;

    let first = app.start_quiz(&user, lesson_id).await;
    assert_eq!(first.status().as_u16(), 200);

    // Retry within the 30s cooldown.
    app.clock.advance_seconds(10);
    let blocked = app.start_quiz(&user, lesson_id).await;
    assert_eq!(blocked.status().as_u16(), 429);
    let body: Value = blocked.json().await.unwrap();
    assert_eq!(body["cooldown_remaining"], 20);

    // Past the cooldown the abandoned attempt does not block a new one.
    app.clock.advance_seconds(20);
    let allowed = app.start_quiz(&user, lesson_id).await;
    assert_eq!(allowed.status().as_u16(), 200);
}

#[tokio::test]
async fn hourly_rate_limit_blocks_the_eleventh_start() {
    let app = spawn_app().await;
    let admin = app.signup("admin").await;
    let user = app.signup("learner").await;
    let lesson_id = app.create_lesson(&admin, "Biology").await;
    app.upload_questions(&admin, lesson_id, &["A", "B", "C", "D"])
        .await;
    app.read_lesson(&user, lesson_id).await;

    // 10 starts, spaced past the cooldown but inside the hourly window.
    for _ in 0..10 {
        let response = app.start_quiz(&user, lesson_id).await;
        assert_eq!(response.status().as_u16(), 200);
        app.clock.advance_seconds(30);
    }

    let blocked = app.start_quiz(&user, lesson_id).await;
    assert_eq!(blocked.status().as_u16(), 429);
    let body: Value = blocked.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Hourly"));

    // After the window rolls over the budget is back.
    app.clock.advance_seconds(3600);
    let allowed = app.start_quiz(&user, lesson_id).await;
    assert_eq!(allowed.status().as_u16(), 200);
}

#[tokio::test]
async fn unread_lesson_cannot_be_attempted() {
    let app = spawn_app().await;
    let admin = app.signup("admin").await;
    let user = app.signup("learner").await;
    let lesson_id = app.create_lesson(&admin, "History").await;
    app.upload_questions(&admin, lesson_id, &["A", "B", "C", "D"])
        .await;

    // No read-time heartbeat at all.
    let response = app.start_quiz(&user, lesson_id).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("read"));
}

#[tokio::test]
async fn undersized_question_pool_is_reported() {
    let app = spawn_app().await;
    let admin = app.signup("admin").await;
    let user = app.signup("learner").await;
    let lesson_id = app.create_lesson(&admin, "Economics").await;
    // Default quiz size is 3; only 2 questions uploaded.
    app.upload_questions(&admin, lesson_id, &["A", "B"]).await;
    app.read_lesson(&user, lesson_id).await;

    let response = app.start_quiz(&user, lesson_id).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn status_reports_budgets_and_cooldown() {
    let app = spawn_app().await;
    let admin = app.signup("admin").await;
    let user = app.signup("learner").await;
    let lesson_id = app.create_lesson(&admin, "Literature").await;
    app.upload_questions(&admin, lesson_id, &["A", "B", "C", "D"])
        .await;
    app.read_lesson(&user, lesson_id).await;

    let status_url = format!("{}/api/quiz/{}/status", app.address, lesson_id);

    let fresh: Value = app
        .client
        .get(&status_url)
        .bearer_auth(&user)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fresh["can_attempt"], true);
    assert_eq!(fresh["hourly_attempts_remaining"], 10);
    assert_eq!(fresh["daily_attempts_remaining"], 30);

    let start = app.start_quiz(&user, lesson_id).await;
    assert_eq!(start.status().as_u16(), 200);

    let cooling: Value = app
        .client
        .get(&status_url)
        .bearer_auth(&user)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cooling["can_attempt"], false);
    assert_eq!(cooling["cooldown_remaining"], 30);
    assert_eq!(cooling["hourly_attempts_remaining"], 9);
}

#[tokio::test]
async fn mismatched_answers_leave_the_attempt_open() {
    let app = spawn_app().await;
    let admin = app.signup("admin").await;
    let user = app.signup("learner").await;
    let lesson_id = app.create_lesson(&admin, "Government").await;
    app.upload_questions(&admin, lesson_id, &["A", "B", "C", "D"])
        .await;
    app.read_lesson(&user, lesson_id).await;

    let start = app.start_quiz(&user, lesson_id).await;
    let start_body: Value = start.json().await.unwrap();
    app.clock.advance_seconds(30);

    // Answers for question ids that were never served.
    let rejected = app
        .client
        .post(format!("{}/api/quiz/submit", app.address))
        .bearer_auth(&user)
        .json(&serde_json::json!({
            "attempt_id": start_body["attempt_id"],
            "answers": [
                { "question_id": 999_901, "selected": "A", "time_spent_seconds": 10 },
                { "question_id": 999_902, "selected": "B", "time_spent_seconds": 10 },
                { "question_id": 999_903, "selected": "C", "time_spent_seconds": 10 }
            ],
            "total_time_seconds": 30
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status().as_u16(), 400);

    // A corrected submission still goes through.
    let accepted = app.submit_quiz(&user, &start_body, true, 10).await;
    assert_eq!(accepted.status().as_u16(), 200);
}

#[tokio::test]
async fn quiz_routes_require_a_token() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(format!("{}/api/quiz/start", app.address))
        .json(&serde_json::json!({ "lesson_id": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}
