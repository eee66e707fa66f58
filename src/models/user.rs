// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Aggregated statistics stored on the user record.
/// Always recomputed from the user's completed attempts, never incremented.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserStatistics {
    pub user_id: i64,
    pub total_attempts: i64,
    pub average_score: f64,
}

impl UserStatistics {
    pub fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            total_attempts: 0,
            average_score: 0.0,
        }
    }
}
