//! Stats rollup response types.

use chrono::NaiveDate;
use serde::Serialize;

/// One day of the daily rollup; gaps in the log are zero-filled.
#[derive(Debug, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub energy_spent: i32,
    pub tasks_completed: i32,
    pub daily_score: Option<f64>,
    pub overall_health: Option<f64>,
}

/// Trailing 7-day window rollup.
#[derive(Debug, Serialize)]
pub struct WeeklyStats {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_energy_spent: i32,
    pub total_tasks_completed: i64,
    pub average_daily_score: f64,
    pub average_health: f64,
    pub completion_rate: f64,
}

/// Calendar month rollup.
#[derive(Debug, Serialize)]
pub struct MonthlyStats {
    pub month: u32,
    pub year: i32,
    pub total_energy_spent: i32,
    pub total_tasks_completed: i64,
    pub average_daily_score: f64,
    pub average_health: f64,
    pub completion_rate: f64,
    pub active_days: i64,
}

/// One heatmap cell.
#[derive(Debug, Serialize)]
pub struct HeatmapDataPoint {
    pub date: NaiveDate,
    pub value: i64,
}

/// Completion-count heatmap over a trailing range.
#[derive(Debug, Serialize)]
pub struct HeatmapData {
    pub data: Vec<HeatmapDataPoint>,
    pub min_value: i64,
    pub max_value: i64,
}

/// Per-task history summary.
#[derive(Debug, Serialize)]
pub struct TaskStats {
    pub task_id: i64,
    pub task_name: String,
    pub total_completions: i64,
    pub longest_streak: i64,
    pub current_streak: i64,
    pub completion_rate: f64,
    pub average_health: f64,
    pub last_completed: Option<NaiveDate>,
}

/// Longest run of consecutive completion days. `days` must be distinct and
/// ascending.
pub fn longest_streak(days: &[NaiveDate]) -> i64 {
    if days.is_empty() {
        return 0;
    }

    let mut longest = 0i64;
    let mut streak = 1i64;
    for pair in days.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            streak += 1;
            longest = longest.max(streak);
        } else {
            streak = 1;
        }
    }
    longest.max(streak)
}

/// Length of the run ending today; 0 unless today itself is completed.
pub fn current_streak(days: &[NaiveDate], today: NaiveDate) -> i64 {
    if days.last() != Some(&today) {
        return 0;
    }

    let mut streak = 1i64;
    for pair in days.windows(2).rev() {
        if (pair[1] - pair[0]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}
