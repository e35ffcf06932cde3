//! Stats rollup handlers: daily, weekly, monthly, heatmap and per-task.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{Datelike, Days, NaiveDate};

use lento_backend_domain::engine::{round1, round2};
use lento_backend_domain::{
    DailyStats, DomainError, HeatmapData, HeatmapDataPoint, MonthlyStats, TaskStats, WeeklyStats,
    current_streak, engine, longest_streak,
};
use lento_backend_storage::{DailyLogRow, StorageError};

use crate::AppState;
use crate::middleware::auth::AuthUser;

/// Range selector for the daily rollup and heatmap.
#[derive(Debug, serde::Deserialize)]
pub struct DaysQuery {
    pub days: Option<u32>,
}

/// Range selector for the weekly rollup.
#[derive(Debug, serde::Deserialize)]
pub struct WeeksQuery {
    pub weeks: Option<u32>,
}

/// Range selector for the monthly rollup.
#[derive(Debug, serde::Deserialize)]
pub struct MonthsQuery {
    pub months: Option<u32>,
}

fn db_err(err: StorageError) -> DomainError {
    DomainError::Database(err.to_string())
}

/// Per-day rollup over the trailing `days` window, gaps zero-filled.
pub async fn daily_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DaysQuery>,
) -> Result<Json<Vec<DailyStats>>, DomainError> {
    let days = query.days.unwrap_or(7).clamp(1, 365);
    let today = state.clock.today();
    let start = today - Days::new(u64::from(days - 1));

    let logs = state
        .daily_log_repo
        .range(user_id, start, today)
        .await
        .map_err(db_err)?;
    let by_date: HashMap<NaiveDate, &DailyLogRow> =
        logs.iter().map(|log| (log.log_date, log)).collect();

    let result = (0..days)
        .map(|offset| {
            let date = start + Days::new(u64::from(offset));
            match by_date.get(&date) {
                Some(log) => DailyStats {
                    date,
                    energy_spent: log.energy_spent,
                    tasks_completed: log.tasks_completed,
                    daily_score: log.daily_score,
                    overall_health: log.overall_health,
                },
                None => DailyStats {
                    date,
                    energy_spent: 0,
                    tasks_completed: 0,
                    daily_score: None,
                    overall_health: None,
                },
            }
        })
        .collect();

    Ok(Json(result))
}

/// Rollup over trailing 7-day windows, most recent first.
pub async fn weekly_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<WeeksQuery>,
) -> Result<Json<Vec<WeeklyStats>>, DomainError> {
    let weeks = query.weeks.unwrap_or(4).clamp(1, 52);
    let today = state.clock.today();

    let mut result = Vec::with_capacity(weeks as usize);
    for i in 0..weeks {
        let week_end = today - Days::new(u64::from(7 * i));
        let week_start = week_end - Days::new(6);

        let window = period_rollup(&state, user_id, week_start, week_end).await?;
        // tasks * days, ignoring per-task intervals (kept from the source
        // model).
        let total_expected = window.task_count * 7;
        let completion_rate = if total_expected > 0 {
            round2(window.total_completed as f64 / total_expected as f64)
        } else {
            0.0
        };

        result.push(WeeklyStats {
            week_start,
            week_end,
            total_energy_spent: window.total_energy,
            total_tasks_completed: window.total_completed,
            average_daily_score: window.average_daily_score,
            average_health: window.average_health,
            completion_rate,
        });
    }

    Ok(Json(result))
}

/// Rollup over calendar months, most recent first.
pub async fn monthly_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<MonthsQuery>,
) -> Result<Json<Vec<MonthlyStats>>, DomainError> {
    let months = query.months.unwrap_or(6).clamp(1, 24);
    let today = state.clock.today();

    let mut result = Vec::with_capacity(months as usize);
    for i in 0..months {
        let mut year = today.year();
        let mut month = today.month() as i32 - i as i32;
        while month <= 0 {
            month += 12;
            year -= 1;
        }
        let Some((start, end)) = month_bounds(year, month as u32) else {
            continue;
        };

        let window = period_rollup(&state, user_id, start, end).await?;
        let days_in_month = (end - start).num_days() + 1;
        let total_expected = window.task_count * days_in_month;
        let completion_rate = if total_expected > 0 {
            round2(window.total_completed as f64 / total_expected as f64)
        } else {
            0.0
        };

        result.push(MonthlyStats {
            month: month as u32,
            year,
            total_energy_spent: window.total_energy,
            total_tasks_completed: window.total_completed,
            average_daily_score: window.average_daily_score,
            average_health: window.average_health,
            completion_rate,
            active_days: window.active_days,
        });
    }

    Ok(Json(result))
}

/// Per-day completion counts over the trailing `days` window.
pub async fn heatmap(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DaysQuery>,
) -> Result<Json<HeatmapData>, DomainError> {
    let days = query.days.unwrap_or(365).clamp(1, 730);
    let today = state.clock.today();
    let start = today - Days::new(u64::from(days - 1));

    let counts: HashMap<NaiveDate, i64> = state
        .completion_repo
        .counts_by_day(user_id, start, today)
        .await
        .map_err(db_err)?
        .into_iter()
        .collect();

    let mut data = Vec::with_capacity(days as usize);
    let mut max_value = 0i64;
    for offset in 0..days {
        let date = start + Days::new(u64::from(offset));
        let value = counts.get(&date).copied().unwrap_or(0);
        max_value = max_value.max(value);
        data.push(HeatmapDataPoint { date, value });
    }

    Ok(Json(HeatmapData {
        data,
        min_value: 0,
        max_value,
    }))
}

/// History summary for one task.
pub async fn task_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<i64>,
) -> Result<Json<TaskStats>, DomainError> {
    let task = state
        .task_repo
        .get(task_id, user_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::NotFound("任务不存在".to_string()))?;

    let today = state.clock.today();
    let days = state
        .completion_repo
        .days_for_task(task_id)
        .await
        .map_err(db_err)?;

    let total_completions = days.len() as i64;
    let last_completed = days.last().copied();

    let expected_completions = (today - task.created_at.date_naive()).num_days() as f64
        / f64::from(task.expected_interval);
    let completion_rate = if expected_completions > 0.0 {
        round2(total_completions as f64 / expected_completions)
    } else {
        0.0
    };

    let average_health = if days.is_empty() {
        0.0
    } else {
        round1(f64::from(engine::calculate_health(
            last_completed,
            task.expected_interval,
            today,
        )))
    };

    Ok(Json(TaskStats {
        task_id: task.id,
        task_name: task.name,
        total_completions,
        longest_streak: longest_streak(&days),
        current_streak: current_streak(&days, today),
        completion_rate,
        average_health,
        last_completed,
    }))
}

/// Shared per-period aggregates for the weekly/monthly rollups.
struct PeriodRollup {
    total_energy: i32,
    total_completed: i64,
    active_days: i64,
    task_count: i64,
    average_daily_score: f64,
    average_health: f64,
}

async fn period_rollup(
    state: &AppState,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PeriodRollup, DomainError> {
    let rows = state
        .completion_repo
        .energy_rows(user_id, start, end)
        .await
        .map_err(db_err)?;
    let total_energy: i32 = rows.iter().map(|r| r.energy_cost).sum();
    let total_completed = rows.len() as i64;
    let active_days = {
        let mut dates: Vec<NaiveDate> = rows.iter().map(|r| r.completed_on).collect();
        dates.dedup();
        dates.len() as i64
    };

    // Health as each task stood at the end of the period.
    let mut states: Vec<_> = state
        .task_repo
        .list_active_states_as_of(user_id, end)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|row| row.into_state())
        .collect();
    engine::annotate(&mut states, end);
    let overall = engine::calculate_overall_health(&states);

    let logs = state
        .daily_log_repo
        .range(user_id, start, end)
        .await
        .map_err(db_err)?;
    let average_daily_score = if logs.is_empty() {
        0.0
    } else {
        let score_sum: f64 = logs.iter().filter_map(|l| l.daily_score).sum();
        round1(score_sum / logs.len() as f64)
    };

    Ok(PeriodRollup {
        total_energy,
        total_completed,
        active_days,
        task_count: states.len() as i64,
        average_daily_score,
        average_health: overall.score,
    })
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)? - Days::new(1);
    Some((start, end))
}
