//! User repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::StorageError;

/// User record from database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub daily_energy_budget: i32,
    pub max_daily_tasks: i32,
    pub created_at: DateTime<Utc>,
}

/// User repository.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user. A duplicate username or email surfaces as
    /// `StorageError::Duplicate` via the unique constraints.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow, StorageError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash,
                      daily_energy_budget, max_daily_tasks, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::from_query)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<UserRow>, StorageError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, daily_energy_budget, max_daily_tasks, created_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, StorageError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, daily_energy_budget, max_daily_tasks, created_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, StorageError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, daily_energy_budget, max_daily_tasks, created_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// Update the daily policy; absent fields keep their current values.
    pub async fn update_settings(
        &self,
        id: i64,
        daily_energy_budget: Option<i32>,
        max_daily_tasks: Option<i32>,
    ) -> Result<Option<UserRow>, StorageError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET
                daily_energy_budget = COALESCE($2, daily_energy_budget),
                max_daily_tasks = COALESCE($3, max_daily_tasks),
                updated_at = now()
            WHERE id = $1
            RETURNING id, username, email, password_hash,
                      daily_energy_budget, max_daily_tasks, created_at
            "#,
        )
        .bind(id)
        .bind(daily_energy_budget)
        .bind(max_daily_tasks)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Query)
    }
}
