#![cfg(feature = "postgres-tests")]

use chrono::{NaiveDate, TimeZone, Utc};
use sqlx::PgPool;

use lento_backend_storage::{CompletionRepository, TaskRepository};

async fn seed_user(pool: &PgPool, username: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(username)
    .bind(format!("{username}@example.com"))
    .bind("salt$hash")
    .fetch_one(pool)
    .await
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn storage_err(e: lento_backend_storage::StorageError) -> sqlx::Error {
    sqlx::Error::Protocol(format!("storage error: {e}"))
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_get_update_delete_roundtrip(pool: PgPool) -> Result<(), sqlx::Error> {
    let user_id = seed_user(&pool, "crud-user").await?;
    let repo = TaskRepository::new(pool.clone());

    let task = repo
        .create(user_id, "冥想", Some("睡前十分钟"), 2, 3, 4, Some("健康"), "#22c55e", "moon")
        .await
        .map_err(storage_err)?;
    assert_eq!(task.name, "冥想");
    assert_eq!(task.importance, 4);
    assert!(task.is_active);
    assert!(task.last_done_date.is_none());

    let fetched = repo.get(task.id, user_id).await.map_err(storage_err)?;
    assert!(fetched.is_some());

    // Ownership check: another user cannot see it.
    let other = seed_user(&pool, "other-user").await?;
    assert!(repo.get(task.id, other).await.map_err(storage_err)?.is_none());

    let updated = repo
        .update(
            task.id, user_id, None, None, Some(5), None, None, None, None, None, Some(false),
        )
        .await
        .map_err(storage_err)?
        .expect("task exists");
    assert_eq!(updated.energy_cost, 5);
    assert!(!updated.is_active);
    // Untouched fields keep their values.
    assert_eq!(updated.expected_interval, 3);

    assert!(repo.delete(task.id, user_id).await.map_err(storage_err)?);
    assert!(!repo.delete(task.id, user_id).await.map_err(storage_err)?);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_filters_by_active_and_category(pool: PgPool) -> Result<(), sqlx::Error> {
    let user_id = seed_user(&pool, "filter-user").await?;
    let repo = TaskRepository::new(pool.clone());

    let running = repo
        .create(user_id, "跑步", None, 3, 2, 5, Some("运动"), "#6366f1", "star")
        .await
        .map_err(storage_err)?;
    let reading = repo
        .create(user_id, "读书", None, 2, 7, 3, Some("学习"), "#6366f1", "star")
        .await
        .map_err(storage_err)?;
    repo.update(
        reading.id, user_id, None, None, None, None, None, None, None, None, Some(false),
    )
    .await
    .map_err(storage_err)?;

    let active = repo
        .list(user_id, Some(true), None, 0, 100)
        .await
        .map_err(storage_err)?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, running.id);

    let sport = repo
        .list(user_id, None, Some("运动"), 0, 100)
        .await
        .map_err(storage_err)?;
    assert_eq!(sport.len(), 1);

    let all = repo.list(user_id, None, None, 0, 100).await.map_err(storage_err)?;
    assert_eq!(all.len(), 2);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn active_states_carry_completion_summary(pool: PgPool) -> Result<(), sqlx::Error> {
    let user_id = seed_user(&pool, "state-user").await?;
    let tasks = TaskRepository::new(pool.clone());
    let completions = CompletionRepository::new(pool.clone());

    let done_today = tasks
        .create(user_id, "喝水", None, 1, 1, 2, None, "#6366f1", "star")
        .await
        .map_err(storage_err)?;
    let done_before = tasks
        .create(user_id, "拉伸", None, 2, 3, 3, None, "#6366f1", "star")
        .await
        .map_err(storage_err)?;
    let never_done = tasks
        .create(user_id, "写日记", None, 2, 7, 3, None, "#6366f1", "star")
        .await
        .map_err(storage_err)?;

    let today = day(2024, 3, 10);
    completions
        .insert(
            done_today.id,
            Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap(),
            today,
            None,
            None,
        )
        .await
        .map_err(storage_err)?;
    completions
        .insert(
            done_before.id,
            Utc.with_ymd_and_hms(2024, 3, 6, 7, 0, 0).unwrap(),
            day(2024, 3, 6),
            None,
            None,
        )
        .await
        .map_err(storage_err)?;

    let states = tasks
        .list_active_states(user_id, today)
        .await
        .map_err(storage_err)?;
    assert_eq!(states.len(), 3);

    let by_id = |id: i64| states.iter().find(|s| s.id == id).expect("state present");
    assert!(by_id(done_today.id).is_completed_today);
    assert_eq!(by_id(done_today.id).last_done_date, Some(today));
    assert!(!by_id(done_before.id).is_completed_today);
    assert_eq!(by_id(done_before.id).last_done_date, Some(day(2024, 3, 6)));
    assert!(by_id(never_done.id).last_done_date.is_none());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn as_of_states_ignore_later_completions(pool: PgPool) -> Result<(), sqlx::Error> {
    let user_id = seed_user(&pool, "asof-user").await?;
    let tasks = TaskRepository::new(pool.clone());
    let completions = CompletionRepository::new(pool.clone());

    let task = tasks
        .create(user_id, "散步", None, 1, 2, 3, None, "#6366f1", "star")
        .await
        .map_err(storage_err)?;

    for d in [3, 8] {
        completions
            .insert(
                task.id,
                Utc.with_ymd_and_hms(2024, 3, d, 7, 0, 0).unwrap(),
                day(2024, 3, d),
                None,
                None,
            )
            .await
            .map_err(storage_err)?;
    }

    let states = tasks
        .list_active_states_as_of(user_id, day(2024, 3, 5))
        .await
        .map_err(storage_err)?;
    assert_eq!(states[0].last_done_date, Some(day(2024, 3, 3)));
    assert!(!states[0].is_completed_today);

    Ok(())
}
