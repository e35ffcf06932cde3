#![cfg(feature = "postgres-tests")]

use chrono::{NaiveDate, TimeZone, Utc};
use sqlx::{PgPool, Row};

use lento_backend_storage::{CompletionRepository, StorageError};

async fn seed_user_and_task(pool: &PgPool) -> Result<(i64, i64), sqlx::Error> {
    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind("gate-user")
    .bind("gate@example.com")
    .bind("salt$hash")
    .fetch_one(pool)
    .await?;

    let task_id: i64 =
        sqlx::query_scalar("INSERT INTO tasks (user_id, name) VALUES ($1, $2) RETURNING id")
            .bind(user_id)
            .bind("晨跑")
            .fetch_one(pool)
            .await?;

    Ok((user_id, task_id))
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[sqlx::test(migrations = "../../migrations")]
async fn second_completion_same_day_is_rejected(pool: PgPool) -> Result<(), sqlx::Error> {
    let (_, task_id) = seed_user_and_task(&pool).await?;
    let repo = CompletionRepository::new(pool.clone());
    let today = day(2024, 3, 10);
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();

    let first = repo
        .insert(task_id, now, today, Some("早起打卡"), Some(4))
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("insert failed: {e}")))?;
    assert!(first > 0);

    let second = repo.insert(task_id, now, today, None, None).await;
    assert!(matches!(second, Err(StorageError::Duplicate)));

    // Exactly one row survives the duplicate attempt.
    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM completions WHERE task_id = $1")
        .bind(task_id)
        .fetch_one(&pool)
        .await?
        .get("n");
    assert_eq!(count, 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn next_day_completion_is_allowed(pool: PgPool) -> Result<(), sqlx::Error> {
    let (_, task_id) = seed_user_and_task(&pool).await?;
    let repo = CompletionRepository::new(pool.clone());

    for d in 10..=11 {
        let now = Utc.with_ymd_and_hms(2024, 3, d, 9, 0, 0).unwrap();
        repo.insert(task_id, now, day(2024, 3, d), None, None)
            .await
            .map_err(|e| sqlx::Error::Protocol(format!("insert failed: {e}")))?;
    }

    let days = repo
        .days_for_task(task_id)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("days_for_task failed: {e}")))?;
    assert_eq!(days, vec![day(2024, 3, 10), day(2024, 3, 11)]);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn undo_is_idempotent_and_restores_state(pool: PgPool) -> Result<(), sqlx::Error> {
    let (user_id, task_id) = seed_user_and_task(&pool).await?;
    let repo = CompletionRepository::new(pool.clone());
    let today = day(2024, 3, 10);
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();

    repo.insert(task_id, now, today, None, None)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("insert failed: {e}")))?;

    let removed = repo
        .delete_for_day(task_id, user_id, today)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("delete failed: {e}")))?;
    assert_eq!(removed, 1);

    // Second undo finds nothing; the store is back at the pre-completion state.
    let removed_again = repo
        .delete_for_day(task_id, user_id, today)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("delete failed: {e}")))?;
    assert_eq!(removed_again, 0);

    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM completions WHERE task_id = $1")
        .bind(task_id)
        .fetch_one(&pool)
        .await?
        .get("n");
    assert_eq!(count, 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn undo_ignores_tasks_of_other_users(pool: PgPool) -> Result<(), sqlx::Error> {
    let (_, task_id) = seed_user_and_task(&pool).await?;
    let stranger: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind("stranger")
    .bind("stranger@example.com")
    .bind("salt$hash")
    .fetch_one(&pool)
    .await?;

    let repo = CompletionRepository::new(pool.clone());
    let today = day(2024, 3, 10);
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
    repo.insert(task_id, now, today, None, None)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("insert failed: {e}")))?;

    let removed = repo
        .delete_for_day(task_id, stranger, today)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("delete failed: {e}")))?;
    assert_eq!(removed, 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_task_cascades_completions(pool: PgPool) -> Result<(), sqlx::Error> {
    let (_, task_id) = seed_user_and_task(&pool).await?;
    let repo = CompletionRepository::new(pool.clone());
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
    repo.insert(task_id, now, day(2024, 3, 10), None, None)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("insert failed: {e}")))?;

    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(task_id)
        .execute(&pool)
        .await?;

    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM completions WHERE task_id = $1")
        .bind(task_id)
        .fetch_one(&pool)
        .await?
        .get("n");
    assert_eq!(count, 0);

    Ok(())
}
