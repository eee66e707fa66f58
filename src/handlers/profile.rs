use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{error::AppError, services::StatisticsService, utils::jwt::Claims};

/// Get current user's attempt statistics.
pub async fn get_my_statistics(
    State(service): State<Arc<StatisticsService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let stats = service.get(claims.user_id()?).await?;
    Ok(Json(stats))
}
