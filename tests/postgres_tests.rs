// tests/postgres_tests.rs
//
// Runs against a real database: `DATABASE_URL=... cargo test -- --ignored`

use std::sync::Arc;

use quiz_arena::{
    models::{attempt::AnswerSubmission, user::UserStatistics},
    repository::{AttemptRepository, PostgresStore, StatisticsRepository},
    services::{AttemptError, AttemptService, LeaderboardService, StatisticsService},
};
use sqlx::{PgPool, postgres::PgPoolOptions};

async fn connect() -> PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}

/// Seeds a user and an active quiz with two questions.
/// Returns (user_id, quiz_id, [(question_id, correct_choice, wrong_choice)]).
async fn seed(pool: &PgPool) -> (i64, i64, Vec<(i64, i64, i64)>) {
    let username = format!("u_{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0));
    let (user_id,): (i64,) =
        sqlx::query_as("INSERT INTO users (username) VALUES ($1) RETURNING id")
            .bind(&username)
            .fetch_one(pool)
            .await
            .unwrap();

    let (quiz_id,): (i64,) = sqlx::query_as(
        "INSERT INTO quizzes (title, is_active, owner_id) VALUES ($1, TRUE, $2) RETURNING id",
    )
    .bind("Bracket sets")
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap();

    let mut questions = Vec::new();
    for i in 0..2 {
        let (question_id,): (i64,) =
            sqlx::query_as("INSERT INTO questions (quiz_id, text) VALUES ($1, $2) RETURNING id")
                .bind(quiz_id)
                .bind(format!("Question {}", i))
                .fetch_one(pool)
                .await
                .unwrap();

        let mut ids = Vec::new();
        for correct in [true, false] {
            let (choice_id,): (i64,) = sqlx::query_as(
                "INSERT INTO choices (question_id, text, is_correct) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(question_id)
            .bind(if correct { "Right" } else { "Wrong" })
            .bind(correct)
            .fetch_one(pool)
            .await
            .unwrap();
            ids.push(choice_id);
        }
        questions.push((question_id, ids[0], ids[1]));
    }

    (user_id, quiz_id, questions)
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn postgres_attempt_lifecycle() {
    let pool = connect().await;
    let (user_id, quiz_id, questions) = seed(&pool).await;

    let store = Arc::new(PostgresStore::new(pool));
    let statistics = StatisticsService::new(store.clone(), store.clone());
    let service = AttemptService::new(store.clone(), store.clone(), statistics);
    let leaderboard = LeaderboardService::new(store.clone());

    let attempt = service.start_attempt(quiz_id, user_id).await.unwrap();
    let answers: Vec<AnswerSubmission> = vec![
        AnswerSubmission {
            question_id: questions[0].0,
            choice_id: questions[0].1,
        },
        AnswerSubmission {
            question_id: questions[1].0,
            choice_id: questions[1].2,
        },
    ];

    let (a, b) = tokio::join!(
        service.submit_attempt(attempt.id, user_id, &answers),
        service.submit_attempt(attempt.id, user_id, &answers)
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert!(matches!(
        a.err().or(b.err()),
        Some(AttemptError::AlreadyCompleted)
    ));

    let stored = store.find_attempt(attempt.id).await.unwrap().unwrap();
    assert_eq!(stored.score, 50);
    assert_eq!(store.list_answers(attempt.id).await.unwrap().len(), 2);

    let result = service.get_result(attempt.id, user_id).await.unwrap();
    assert_eq!(result.correct_answers, 1);

    let stats = store.fetch_statistics(user_id).await.unwrap().unwrap();
    assert_eq!(stats.total_attempts, 1);
    assert_eq!(stats.average_score, 50.0);

    let board = leaderboard.get_leaderboard(quiz_id, 10).await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].attempt.id, attempt.id);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn postgres_statistics_for_missing_user_fail() {
    let pool = connect().await;

    let (missing,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(id), 0) + 1000 FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();

    let store = Arc::new(PostgresStore::new(pool));
    let result = store.save_statistics(&UserStatistics::empty(missing)).await;
    assert!(result.is_err());

    let statistics = StatisticsService::new(store.clone(), store);
    assert!(statistics.recompute(missing).await.is_err());
}
