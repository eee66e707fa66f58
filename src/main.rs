// src/main.rs

use std::{sync::Arc, time::Duration};

use quiz_arena::{
    config::{Config, StorageKind},
    models::quiz::Quiz,
    repository::{MemoryStore, PostgresStore},
    routes,
    state::AppState,
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment (.env included)
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let state = match config.storage {
        StorageKind::Postgres => {
            let pool = connect_with_retry(&config).await?;

            tracing::info!("Running migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations applied successfully.");

            let store = Arc::new(PostgresStore::new(pool));
            AppState::new(config.clone(), store.clone(), store.clone(), store)
        }
        StorageKind::Memory => {
            let store = Arc::new(MemoryStore::new());
            if let Some(path) = &config.quiz_seed_file {
                let quizzes: Vec<Quiz> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
                tracing::info!("Seeding {} quizzes from {}", quizzes.len(), path);
                for quiz in quizzes {
                    store.insert_quiz(quiz)?;
                }
            }
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            AppState::new(config.clone(), store.clone(), store.clone(), store)
        }
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    tracing::info!("Listening on {}", config.server_addr);

    // Start the server
    axum::serve(listener, app).await?;
    Ok(())
}

/// Connects to Postgres, retrying while the database comes up.
async fn connect_with_retry(config: &Config) -> Result<PgPool, Box<dyn std::error::Error>> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or("DATABASE_URL must be set")?;

    let mut retry_count = 0;
    loop {
        match PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!("Database connected...");
                return Ok(pool);
            }
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    tracing::error!("Failed to connect to database after 5 retries: {}", e);
                    return Err(e.into());
                }
                tracing::warn!(
                    "Database not ready, retrying in 2s... (Attempt {})",
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}
