//! Task CRUD handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use lento_backend_domain::{DomainError, TaskCreate, TaskResponse, TaskUpdate};
use lento_backend_storage::TaskRow;

use crate::AppState;
use crate::middleware::auth::AuthUser;

/// Listing filters.
#[derive(Debug, Default, serde::Deserialize)]
pub struct TaskListQuery {
    pub is_active: Option<bool>,
    pub category: Option<String>,
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

fn task_response(task: TaskRow) -> TaskResponse {
    TaskResponse {
        id: task.id,
        name: task.name,
        description: task.description,
        energy_cost: task.energy_cost,
        expected_interval: task.expected_interval,
        importance: task.importance,
        category: task.category,
        color: task.color,
        icon: task.icon,
        is_active: task.is_active,
        last_done_date: task.last_done_date,
        created_at: task.created_at,
        updated_at: task.updated_at,
    }
}

/// List the user's tasks, optionally filtered by active flag and category.
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, DomainError> {
    let limit = query.limit.unwrap_or(100).clamp(1, 500);

    let tasks = state
        .task_repo
        .list(
            user_id,
            query.is_active,
            query.category.as_deref(),
            query.skip.max(0),
            limit,
        )
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

    Ok(Json(tasks.into_iter().map(task_response).collect()))
}

/// Get a single task.
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, DomainError> {
    let task = state
        .task_repo
        .get(id, user_id)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?
        .ok_or_else(|| DomainError::NotFound("任务不存在".to_string()))?;

    Ok(Json(task_response(task)))
}

/// Create a task.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<TaskCreate>,
) -> Result<(StatusCode, Json<TaskResponse>), DomainError> {
    req.validate().map_err(DomainError::from_validation_errors)?;

    let task = state
        .task_repo
        .create(
            user_id,
            &req.name,
            req.description.as_deref(),
            req.energy_cost,
            req.expected_interval,
            req.importance,
            req.category.as_deref(),
            &req.color,
            &req.icon,
        )
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

    tracing::info!(user_id, task_id = task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task_response(task))))
}

/// Partially update a task.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<TaskUpdate>,
) -> Result<Json<TaskResponse>, DomainError> {
    req.validate().map_err(DomainError::from_validation_errors)?;

    let task = state
        .task_repo
        .update(
            id,
            user_id,
            req.name.as_deref(),
            req.description.as_deref(),
            req.energy_cost,
            req.expected_interval,
            req.importance,
            req.category.as_deref(),
            req.color.as_deref(),
            req.icon.as_deref(),
            req.is_active,
        )
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?
        .ok_or_else(|| DomainError::NotFound("任务不存在".to_string()))?;

    Ok(Json(task_response(task)))
}

/// Delete a task; its completions cascade.
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, DomainError> {
    let deleted = state
        .task_repo
        .delete(id, user_id)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

    if !deleted {
        return Err(DomainError::NotFound("任务不存在".to_string()));
    }

    tracing::info!(user_id, task_id = id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}
