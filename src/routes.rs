// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempt, profile, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Attempt routes and statistics require a valid bearer token.
/// * Leaderboards are public; the full attempt listing of a quiz is admin only.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let attempt_routes = Router::new()
        .route(
            "/",
            get(attempt::list_my_attempts).post(attempt::start_attempt),
        )
        .route("/{id}", get(attempt::get_attempt))
        .route("/{id}/submit", post(attempt::submit_attempt))
        .route("/{id}/result", get(attempt::get_result))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let quiz_routes = Router::new()
        .route("/{id}/leaderboard", get(quiz::get_leaderboard))
        // Auth first, then Admin check
        .merge(
            Router::new()
                .route("/{id}/attempts", get(quiz::list_quiz_attempts))
                .layer(middleware::from_fn(admin_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let user_routes = Router::new()
        .route("/me/statistics", get(profile::get_my_statistics))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/attempts", attempt_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/users", user_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
