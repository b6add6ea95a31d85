// src/routes.rs

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{admin, auth, lessons, quiz, wallet};
use crate::state::AppState;
use crate::utils::jwt::{admin_middleware, auth_middleware};

/// Builds the full application router.
///
/// /api/auth/signup and /api/auth/login are public; everything else under
/// /api requires a bearer token, and /api/admin additionally requires the
/// admin role.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login));

    let user_routes = Router::new()
        .route("/auth/profile", get(auth::profile))
        .route("/auth/stats", get(auth::stats))
        .route("/lessons/categories", get(lessons::categories))
        .route("/lessons/category/{category}", get(lessons::by_category))
        .route("/lessons/{id}", get(lessons::detail))
        .route("/lessons/{id}/read-time", post(lessons::read_time))
        .route("/quiz/{lesson_id}/status", get(quiz::status))
        .route("/quiz/start", post(quiz::start))
        .route("/quiz/submit", post(quiz::submit))
        .route("/wallet/balance", get(wallet::balance))
        .route("/wallet/history", get(wallet::history))
        .route("/wallet/summary", get(wallet::summary))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::promote_user))
        .route("/lessons", get(admin::list_lessons))
        .route("/lessons", post(admin::create_lesson))
        .route("/lessons/{id}", delete(admin::delete_lesson))
        .route(
            "/lessons/{lesson_id}/questions",
            post(admin::upload_questions),
        )
        .route(
            "/lessons/{lesson_id}/questions",
            delete(admin::delete_questions),
        )
        .route(
            "/lessons/{lesson_id}/quiz-config",
            get(admin::get_quiz_config),
        )
        .route(
            "/lessons/{lesson_id}/quiz-config",
            put(admin::update_quiz_config),
        )
        .route("/suspicious-attempts", get(admin::suspicious_attempts))
        .route("/cheat-flags", get(admin::list_flags))
        .route("/cheat-flags/{id}/review", put(admin::review_flag))
        // auth runs first, then the role check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = public_routes
        .merge(user_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
