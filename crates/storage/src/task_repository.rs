//! Task repository: CRUD plus the enriched state reads the engine consumes.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use lento_backend_domain::TaskState;

use crate::StorageError;

/// Stored task row, with the derived `last_done` completion summary.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub energy_cost: i32,
    pub expected_interval: i32,
    pub importance: i32,
    pub category: Option<String>,
    pub color: String,
    pub icon: String,
    pub is_active: bool,
    pub last_done_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal row for building engine task states.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskStateRow {
    pub id: i64,
    pub name: String,
    pub energy_cost: i32,
    pub expected_interval: i32,
    pub importance: i32,
    pub last_done_date: Option<NaiveDate>,
    pub is_completed_today: bool,
    pub color: String,
    pub icon: String,
}

impl TaskStateRow {
    pub fn into_state(self) -> TaskState {
        TaskState {
            id: self.id,
            name: self.name,
            energy_cost: self.energy_cost,
            expected_interval: self.expected_interval,
            importance: self.importance,
            last_done_date: self.last_done_date,
            urgency: 0.0,
            health: 100,
            is_completed_today: self.is_completed_today,
            color: self.color,
            icon: self.icon,
        }
    }
}

const TASK_SELECT: &str = r#"
    SELECT t.id, t.user_id, t.name, t.description, t.energy_cost,
           t.expected_interval, t.importance, t.category, t.color, t.icon,
           t.is_active, MAX(c.completed_on) AS last_done_date,
           t.created_at, t.updated_at
    FROM tasks t
    LEFT JOIN completions c ON c.task_id = t.id
"#;

/// Task repository.
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_id: i64,
        name: &str,
        description: Option<&str>,
        energy_cost: i32,
        expected_interval: i32,
        importance: i32,
        category: Option<&str>,
        color: &str,
        icon: &str,
    ) -> Result<TaskRow, StorageError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tasks (user_id, name, description, energy_cost,
                               expected_interval, importance, category, color, icon)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(description)
        .bind(energy_cost)
        .bind(expected_interval)
        .bind(importance)
        .bind(category)
        .bind(color)
        .bind(icon)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Query)?;

        self.get(id, user_id)
            .await?
            .ok_or(StorageError::Query(sqlx::Error::RowNotFound))
    }

    pub async fn get(&self, id: i64, user_id: i64) -> Result<Option<TaskRow>, StorageError> {
        sqlx::query_as::<_, TaskRow>(&format!(
            "{TASK_SELECT} WHERE t.id = $1 AND t.user_id = $2 GROUP BY t.id"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    pub async fn list(
        &self,
        user_id: i64,
        is_active: Option<bool>,
        category: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<TaskRow>, StorageError> {
        sqlx::query_as::<_, TaskRow>(&format!(
            "{TASK_SELECT}
             WHERE t.user_id = $1
               AND ($2::boolean IS NULL OR t.is_active = $2)
               AND ($3::varchar IS NULL OR t.category = $3)
             GROUP BY t.id
             ORDER BY t.id
             OFFSET $4 LIMIT $5"
        ))
        .bind(user_id)
        .bind(is_active)
        .bind(category)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// Partial update; absent fields keep their current values.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        name: Option<&str>,
        description: Option<&str>,
        energy_cost: Option<i32>,
        expected_interval: Option<i32>,
        importance: Option<i32>,
        category: Option<&str>,
        color: Option<&str>,
        icon: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Option<TaskRow>, StorageError> {
        let updated = sqlx::query(
            r#"
            UPDATE tasks SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                energy_cost = COALESCE($5, energy_cost),
                expected_interval = COALESCE($6, expected_interval),
                importance = COALESCE($7, importance),
                category = COALESCE($8, category),
                color = COALESCE($9, color),
                icon = COALESCE($10, icon),
                is_active = COALESCE($11, is_active),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(description)
        .bind(energy_cost)
        .bind(expected_interval)
        .bind(importance)
        .bind(category)
        .bind(color)
        .bind(icon)
        .bind(is_active)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Query)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id, user_id).await
    }

    /// Delete a task; completions cascade. Returns whether a row was removed.
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Active tasks enriched with `last_done_date` and `is_completed_today`,
    /// as one point-in-time read.
    pub async fn list_active_states(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<Vec<TaskStateRow>, StorageError> {
        sqlx::query_as::<_, TaskStateRow>(
            r#"
            SELECT t.id, t.name, t.energy_cost, t.expected_interval, t.importance,
                   MAX(c.completed_on) AS last_done_date,
                   COALESCE(BOOL_OR(c.completed_on = $2), false) AS is_completed_today,
                   t.color, t.icon
            FROM tasks t
            LEFT JOIN completions c ON c.task_id = t.id
            WHERE t.user_id = $1 AND t.is_active
            GROUP BY t.id
            ORDER BY t.id
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// Same as [`list_active_states`], but the completion summary only sees
    /// completions up to `cutoff`. Used by the weekly/monthly rollups.
    ///
    /// [`list_active_states`]: Self::list_active_states
    pub async fn list_active_states_as_of(
        &self,
        user_id: i64,
        cutoff: NaiveDate,
    ) -> Result<Vec<TaskStateRow>, StorageError> {
        sqlx::query_as::<_, TaskStateRow>(
            r#"
            SELECT t.id, t.name, t.energy_cost, t.expected_interval, t.importance,
                   MAX(c.completed_on) FILTER (WHERE c.completed_on <= $2) AS last_done_date,
                   false AS is_completed_today,
                   t.color, t.icon
            FROM tasks t
            LEFT JOIN completions c ON c.task_id = t.id
            WHERE t.user_id = $1 AND t.is_active
            GROUP BY t.id
            ORDER BY t.id
            "#,
        )
        .bind(user_id)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }
}
