// src/handlers/attempt.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::attempt::{StartAttemptRequest, SubmitAttemptRequest},
    services::AttemptService,
    utils::jwt::Claims,
};

/// Starts a new attempt on an active quiz.
/// Returns 201 Created and the attempt summary.
pub async fn start_attempt(
    State(service): State<Arc<AttemptService>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;
    let summary = service.start_attempt(payload.quiz_id, user_id).await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// Submits the full answer set of an attempt and returns the scored result.
pub async fn submit_attempt(
    State(service): State<Arc<AttemptService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;
    let result = service.submit_attempt(id, user_id, &payload.answers).await?;

    Ok(Json(result))
}

pub async fn get_attempt(
    State(service): State<Arc<AttemptService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let summary = service.get_attempt(id, claims.user_id()?).await?;
    Ok(Json(summary))
}

/// Result breakdown of a completed attempt, as scored at submission time.
pub async fn get_result(
    State(service): State<Arc<AttemptService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = service.get_result(id, claims.user_id()?).await?;
    Ok(Json(result))
}

/// Lists the current user's attempts, newest first.
pub async fn list_my_attempts(
    State(service): State<Arc<AttemptService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let list = service.list_user_attempts(claims.user_id()?).await?;
    Ok(Json(list))
}
