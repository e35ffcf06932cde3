//! Completion repository: the write side of the completion gate and the
//! range reads behind the rollups.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::StorageError;

/// One completion joined with its task's energy cost, for rollup sums.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EnergyRow {
    pub completed_on: NaiveDate,
    pub energy_cost: i32,
}

/// Completion repository.
#[derive(Clone)]
pub struct CompletionRepository {
    pool: PgPool,
}

impl CompletionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a completion for the given local day.
    ///
    /// A single INSERT; the `uniq_completion_per_day` constraint serializes
    /// concurrent calls, so exactly one of two racing inserts wins and the
    /// loser observes `StorageError::Duplicate` with no side effect.
    pub async fn insert(
        &self,
        task_id: i64,
        completed_at: DateTime<Utc>,
        completed_on: NaiveDate,
        note: Option<&str>,
        mood: Option<i32>,
    ) -> Result<i64, StorageError> {
        sqlx::query_scalar(
            r#"
            INSERT INTO completions (task_id, completed_at, completed_on, note, mood)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(task_id)
        .bind(completed_at)
        .bind(completed_on)
        .bind(note)
        .bind(mood)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::from_query)
    }

    /// Delete the day's completion for a task the user owns. Returns the
    /// number of rows removed (0 or 1, per the uniqueness invariant).
    pub async fn delete_for_day(
        &self,
        task_id: i64,
        user_id: i64,
        day: NaiveDate,
    ) -> Result<u64, StorageError> {
        let result = sqlx::query(
            r#"
            DELETE FROM completions c
            USING tasks t
            WHERE c.task_id = $1
              AND t.id = c.task_id
              AND t.user_id = $2
              AND c.completed_on = $3
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(day)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Query)?;

        Ok(result.rows_affected())
    }

    /// Completions of all the user's tasks in `[from, to]`, with each task's
    /// energy cost.
    pub async fn energy_rows(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EnergyRow>, StorageError> {
        sqlx::query_as::<_, EnergyRow>(
            r#"
            SELECT c.completed_on, t.energy_cost
            FROM completions c
            JOIN tasks t ON t.id = c.task_id
            WHERE t.user_id = $1 AND c.completed_on BETWEEN $2 AND $3
            ORDER BY c.completed_on
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// Per-day completion counts in `[from, to]`, for the heatmap.
    pub async fn counts_by_day(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>, StorageError> {
        sqlx::query_as::<_, (NaiveDate, i64)>(
            r#"
            SELECT c.completed_on, COUNT(*)
            FROM completions c
            JOIN tasks t ON t.id = c.task_id
            WHERE t.user_id = $1 AND c.completed_on BETWEEN $2 AND $3
            GROUP BY c.completed_on
            ORDER BY c.completed_on
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// Distinct completion days of one task, ascending. Feeds the streak
    /// computation.
    pub async fn days_for_task(&self, task_id: i64) -> Result<Vec<NaiveDate>, StorageError> {
        sqlx::query_scalar(
            "SELECT DISTINCT completed_on FROM completions WHERE task_id = $1 ORDER BY completed_on",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }
}
