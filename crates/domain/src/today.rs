//! Today-view snapshot types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::{DailyScore, OverallHealth, TaskState, UrgencyLevel, urgency_level};

/// A task entry in the today view.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatus {
    pub id: i64,
    pub name: String,
    pub energy_cost: i32,
    pub urgency: f64,
    pub urgency_level: UrgencyLevel,
    pub health: i32,
    pub last_done: Option<NaiveDate>,
    pub days_since: Option<i64>,
    pub expected_interval: i32,
    pub is_completed_today: bool,
    pub icon: String,
    pub color: String,
}

impl TaskStatus {
    pub fn from_state(state: &TaskState, today: NaiveDate) -> Self {
        Self {
            id: state.id,
            name: state.name.clone(),
            energy_cost: state.energy_cost,
            urgency: state.urgency,
            urgency_level: urgency_level(state.urgency),
            health: state.health,
            last_done: state.last_done_date,
            days_since: state.days_since(today),
            expected_interval: state.expected_interval,
            is_completed_today: state.is_completed_today,
            icon: state.icon.clone(),
            color: state.color.clone(),
        }
    }
}

/// Composite snapshot for (user, today).
#[derive(Debug, Serialize)]
pub struct TodayView {
    pub date: NaiveDate,
    pub energy_budget: i32,
    pub energy_spent: i32,
    pub energy_remaining: i32,
    pub recommended_tasks: Vec<TaskStatus>,
    pub other_tasks: Vec<TaskStatus>,
    pub overall_health: OverallHealth,
    pub daily_score: Option<DailyScore>,
    pub motivational_message: String,
}

/// Optional body for marking a task done.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompleteTaskRequest {
    pub note: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub mood: Option<i32>,
}

/// Response for a successful mark_done.
#[derive(Debug, Serialize)]
pub struct CompleteTaskResponse {
    pub success: bool,
    pub message: String,
    pub completion_id: i64,
}

/// Response for a successful undo.
#[derive(Debug, Serialize)]
pub struct UncompleteTaskResponse {
    pub success: bool,
    pub message: String,
}
