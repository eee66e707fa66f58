// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    config::LEADERBOARD_DEFAULT_TOP,
    error::AppError,
    models::attempt::LeaderboardParams,
    services::{AttemptService, LeaderboardService},
};

/// Retrieves the top attempts of a quiz (`?top=N`, 1..=100, default 10).
pub async fn get_leaderboard(
    State(service): State<Arc<LeaderboardService>>,
    Path(quiz_id): Path<i64>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let top = params.top.unwrap_or(LEADERBOARD_DEFAULT_TOP);
    let leaderboard = service.get_leaderboard(quiz_id, top).await?;

    Ok(Json(leaderboard))
}

/// Lists every completed attempt of a quiz in leaderboard order.
/// Admin only.
pub async fn list_quiz_attempts(
    State(service): State<Arc<AttemptService>>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let list = service.list_quiz_attempts(quiz_id).await?;
    Ok(Json(list))
}
