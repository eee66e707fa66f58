use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    repository::{AttemptRepository, ContentStore, StatisticsRepository},
    services::{AttemptService, LeaderboardService, StatisticsService},
};

#[derive(Clone)]
pub struct AppState {
    pub attempts: Arc<AttemptService>,
    pub leaderboard: Arc<LeaderboardService>,
    pub statistics: Arc<StatisticsService>,
    pub config: Config,
}

impl AppState {
    /// Wires the engine services on top of the given storage adapters.
    pub fn new(
        config: Config,
        content: Arc<dyn ContentStore>,
        attempts: Arc<dyn AttemptRepository>,
        statistics: Arc<dyn StatisticsRepository>,
    ) -> Self {
        let statistics = StatisticsService::new(attempts.clone(), statistics);
        Self {
            attempts: Arc::new(AttemptService::new(
                content,
                attempts.clone(),
                statistics.clone(),
            )),
            leaderboard: Arc::new(LeaderboardService::new(attempts)),
            statistics: Arc::new(statistics),
            config,
        }
    }
}

impl FromRef<AppState> for Arc<AttemptService> {
    fn from_ref(state: &AppState) -> Self {
        state.attempts.clone()
    }
}

impl FromRef<AppState> for Arc<LeaderboardService> {
    fn from_ref(state: &AppState) -> Self {
        state.leaderboard.clone()
    }
}

impl FromRef<AppState> for Arc<StatisticsService> {
    fn from_ref(state: &AppState) -> Self {
        state.statistics.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
