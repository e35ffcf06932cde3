//! Daily log repository: the cached per-(user, day) rollup.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::StorageError;

/// Daily log record from database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyLogRow {
    pub user_id: i64,
    pub log_date: NaiveDate,
    pub energy_spent: i32,
    pub tasks_completed: i32,
    pub daily_score: Option<f64>,
    pub overall_health: Option<f64>,
}

/// Daily log repository.
#[derive(Clone)]
pub struct DailyLogRepository {
    pool: PgPool,
}

impl DailyLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Write the day's rollup, replacing any previous value. A single atomic
    /// upsert, so concurrent refreshes cannot leave a partial row.
    pub async fn upsert(
        &self,
        user_id: i64,
        log_date: NaiveDate,
        energy_spent: i32,
        tasks_completed: i32,
        daily_score: Option<f64>,
        overall_health: Option<f64>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO daily_logs (user_id, log_date, energy_spent, tasks_completed,
                                    daily_score, overall_health)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, log_date) DO UPDATE SET
                energy_spent = EXCLUDED.energy_spent,
                tasks_completed = EXCLUDED.tasks_completed,
                daily_score = EXCLUDED.daily_score,
                overall_health = EXCLUDED.overall_health
            "#,
        )
        .bind(user_id)
        .bind(log_date)
        .bind(energy_spent)
        .bind(tasks_completed)
        .bind(daily_score)
        .bind(overall_health)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Query)?;

        Ok(())
    }

    /// Logs in `[from, to]`, ascending by date.
    pub async fn range(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyLogRow>, StorageError> {
        sqlx::query_as::<_, DailyLogRow>(
            r#"
            SELECT user_id, log_date, energy_spent, tasks_completed, daily_score, overall_health
            FROM daily_logs
            WHERE user_id = $1 AND log_date BETWEEN $2 AND $3
            ORDER BY log_date
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }
}
