// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, quiz, results, submission},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quizzes, online attempts).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (repository + config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Anonymous taker surface: stripped quiz view and attempt submission.
    let public_quiz_routes = Router::new()
        .route("/online/{id}", get(quiz::get_online_quiz))
        .route("/online/{id}/submit", post(submission::submit_online_attempt));

    let protected_quiz_routes = Router::new()
        .route("/", post(quiz::create_quiz).get(quiz::list_quizzes))
        .route("/online", post(quiz::create_online_quiz))
        .route("/{id}", get(quiz::get_quiz))
        .route("/{id}/take", get(quiz::get_quiz_for_taker))
        .route("/{id}/answers", post(submission::submit_answers))
        .route("/{id}/results", get(results::get_own_results))
        .route("/{id}/students", get(results::get_creator_results))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    let quiz_routes = public_quiz_routes.merge(protected_quiz_routes);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
