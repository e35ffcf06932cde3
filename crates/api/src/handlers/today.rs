//! Today view composer and the completion gate endpoints.

use std::cmp::Ordering;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use validator::Validate;

use lento_backend_domain::{
    CompleteTaskRequest, CompleteTaskResponse, DomainError, TaskState, TaskStatus, TodayView,
    UncompleteTaskResponse, engine, messages, recommend_tasks,
};
use lento_backend_storage::{StorageError, UserRow};

use crate::AppState;
use crate::middleware::auth::AuthUser;

fn db_err(err: StorageError) -> DomainError {
    DomainError::Database(err.to_string())
}

async fn load_user(state: &AppState, user_id: i64) -> Result<UserRow, DomainError> {
    state
        .user_repo
        .get_by_id(user_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::Unauthorized("User no longer exists".to_string()))
}

async fn load_states(
    state: &AppState,
    user_id: i64,
    today: NaiveDate,
) -> Result<Vec<TaskState>, DomainError> {
    Ok(state
        .task_repo
        .list_active_states(user_id, today)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|row| row.into_state())
        .collect())
}

/// Snapshot of the user's day: recommendations, score, health and message.
pub async fn get_today_view(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TodayView>, DomainError> {
    let user = load_user(&state, user_id).await?;
    let today = state.clock.today();

    let mut states = load_states(&state, user_id, today).await?;

    if states.is_empty() {
        return Ok(Json(TodayView {
            date: today,
            energy_budget: user.daily_energy_budget,
            energy_spent: 0,
            energy_remaining: user.daily_energy_budget,
            recommended_tasks: Vec::new(),
            other_tasks: Vec::new(),
            overall_health: engine::calculate_overall_health(&[]),
            daily_score: None,
            motivational_message: messages::daily_message(100.0, 0, None, today),
        }));
    }

    engine::annotate(&mut states, today);

    let completed: Vec<TaskState> = states
        .iter()
        .filter(|t| t.is_completed_today)
        .cloned()
        .collect();
    let overall_health = engine::calculate_overall_health(&states);
    let most_urgent = states
        .iter()
        .filter(|t| !t.is_completed_today)
        .max_by(|a, b| a.urgency.partial_cmp(&b.urgency).unwrap_or(Ordering::Equal))
        .cloned();

    let motivational_message = messages::daily_message(
        overall_health.score,
        states.len(),
        most_urgent.as_ref(),
        today,
    );

    let (recommended, others) = recommend_tasks(
        states,
        user.daily_energy_budget,
        user.max_daily_tasks,
        today,
    );

    let energy_spent: i32 = completed.iter().map(|t| t.energy_cost).sum();
    let daily_score = (!completed.is_empty())
        .then(|| engine::calculate_daily_score(&completed, user.daily_energy_budget));

    Ok(Json(TodayView {
        date: today,
        energy_budget: user.daily_energy_budget,
        energy_spent,
        energy_remaining: user.daily_energy_budget - energy_spent,
        recommended_tasks: recommended
            .iter()
            .map(|t| TaskStatus::from_state(t, today))
            .collect(),
        other_tasks: others
            .iter()
            .map(|t| TaskStatus::from_state(t, today))
            .collect(),
        overall_health,
        daily_score,
        motivational_message,
    }))
}

/// Mark a task done today. At most one completion per task per local day;
/// the unique index resolves concurrent calls, so the loser gets 400 with
/// no side effect.
pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<i64>,
    body: Option<Json<CompleteTaskRequest>>,
) -> Result<(StatusCode, Json<CompleteTaskResponse>), DomainError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    req.validate().map_err(DomainError::from_validation_errors)?;

    let task = state
        .task_repo
        .get(task_id, user_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::NotFound("任务不存在".to_string()))?;

    let now = state.clock.now();
    let today = state.clock.today();

    let completion_id = state
        .completion_repo
        .insert(task_id, now, today, req.note.as_deref(), req.mood)
        .await
        .map_err(|e| match e {
            StorageError::Duplicate => DomainError::AlreadyCompleted("今天已经完成过了".to_string()),
            other => db_err(other),
        })?;

    refresh_daily_log(&state, user_id, today).await?;

    tracing::info!(user_id, task_id, completion_id, "Task completed");

    Ok((
        StatusCode::CREATED,
        Json(CompleteTaskResponse {
            success: true,
            message: format!("已完成: {} ✓", task.name),
            completion_id,
        }),
    ))
}

/// Undo today's completion of a task.
pub async fn uncomplete_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<i64>,
) -> Result<Json<UncompleteTaskResponse>, DomainError> {
    let today = state.clock.today();

    let removed = state
        .completion_repo
        .delete_for_day(task_id, user_id, today)
        .await
        .map_err(db_err)?;

    if removed == 0 {
        return Err(DomainError::NotFound("未找到今日完成记录".to_string()));
    }

    refresh_daily_log(&state, user_id, today).await?;

    tracing::info!(user_id, task_id, "Completion undone");

    Ok(Json(UncompleteTaskResponse {
        success: true,
        message: "已撤销完成".to_string(),
    }))
}

/// Recompute the cached daily rollup after a successful completion change.
async fn refresh_daily_log(
    state: &AppState,
    user_id: i64,
    today: NaiveDate,
) -> Result<(), DomainError> {
    let user = load_user(state, user_id).await?;
    let mut states = load_states(state, user_id, today).await?;
    engine::annotate(&mut states, today);

    let completed: Vec<TaskState> = states
        .iter()
        .filter(|t| t.is_completed_today)
        .cloned()
        .collect();
    let energy_spent: i32 = completed.iter().map(|t| t.energy_cost).sum();
    let daily_score = (!completed.is_empty())
        .then(|| engine::calculate_daily_score(&completed, user.daily_energy_budget).total_score);
    let overall_health = engine::calculate_overall_health(&states);

    state
        .daily_log_repo
        .upsert(
            user_id,
            today,
            energy_spent,
            completed.len() as i32,
            daily_score,
            Some(overall_health.score),
        )
        .await
        .map_err(db_err)
}
