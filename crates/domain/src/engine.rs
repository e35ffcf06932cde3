//! The numerical core: urgency, health, daily score and aggregate health.
//!
//! Every function here is pure and total on values satisfying the data-model
//! invariants; failures can only originate at the request boundary or the
//! completion gate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Transient per-task state fed to the engine.
///
/// Built from stored rows plus the completion summary; `urgency` and `health`
/// are filled in by [`annotate`] and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskState {
    pub id: i64,
    pub name: String,
    pub energy_cost: i32,
    pub expected_interval: i32,
    pub importance: i32,
    pub last_done_date: Option<NaiveDate>,
    pub urgency: f64,
    pub health: i32,
    pub is_completed_today: bool,
    pub color: String,
    pub icon: String,
}

impl TaskState {
    pub fn days_since(&self, today: NaiveDate) -> Option<i64> {
        self.last_done_date.map(|d| (today - d).num_days())
    }
}

/// Urgency bands, half-open over the real line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Low,
    Normal,
    High,
    Critical,
}

impl UrgencyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Normal => "normal",
            UrgencyLevel::High => "high",
            UrgencyLevel::Critical => "critical",
        }
    }
}

/// A task with urgency at or past this threshold escapes the energy budget.
pub const CRITICAL_URGENCY: f64 = 2.0;

fn effective_interval(expected_interval: i32) -> f64 {
    if expected_interval <= 0 {
        1.0
    } else {
        f64::from(expected_interval)
    }
}

/// Round to 2 decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 1 decimal, half away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Task urgency: overdue-ness scaled by an overdue log penalty and the
/// importance weight. A task never done counts as twice its interval overdue.
pub fn calculate_urgency(
    last_done_date: Option<NaiveDate>,
    expected_interval: i32,
    importance: i32,
    today: NaiveDate,
) -> f64 {
    let interval = effective_interval(expected_interval);

    let days_since = match last_done_date {
        Some(done) => (today - done).num_days() as f64,
        None => interval * 2.0,
    };

    let base_urgency = days_since / interval;

    let overdue_days = (days_since - interval).max(0.0);
    let overdue_factor = 1.0 + (1.0 + overdue_days * 0.3).ln();

    // importance 1-5 -> 0.6-1.4
    let importance_weight = 0.6 + f64::from(importance - 1) * 0.2;

    round2(base_urgency * overdue_factor * importance_weight)
}

/// Task health in [10, 100]: 100 just after completion, 50 at the expected
/// interval, floor 10 past it. 30 for a task with no history.
pub fn calculate_health(
    last_done_date: Option<NaiveDate>,
    expected_interval: i32,
    today: NaiveDate,
) -> i32 {
    let Some(done) = last_done_date else {
        return 30;
    };

    let interval = effective_interval(expected_interval);
    let days_since = (today - done).num_days();

    if days_since == 0 {
        return 100;
    }

    let days = days_since as f64;
    if days <= interval {
        let decay_per_day = 50.0 / interval;
        (100.0 - days * decay_per_day).floor() as i32
    } else {
        let extra_days = days - interval;
        let extra_decay = (extra_days * (30.0 / interval)).min(40.0);
        ((50.0 - extra_decay).floor() as i32).max(10)
    }
}

/// Classify an urgency scalar. Negative values (unreachable from
/// [`calculate_urgency`]) fall into `Low`.
pub fn urgency_level(urgency: f64) -> UrgencyLevel {
    if urgency >= CRITICAL_URGENCY {
        UrgencyLevel::Critical
    } else if urgency >= 1.3 {
        UrgencyLevel::High
    } else if urgency >= 0.7 {
        UrgencyLevel::Normal
    } else {
        UrgencyLevel::Low
    }
}

/// Fill in the derived `urgency` and `health` fields for every task.
pub fn annotate(tasks: &mut [TaskState], today: NaiveDate) {
    for task in tasks.iter_mut() {
        task.urgency = calculate_urgency(
            task.last_done_date,
            task.expected_interval,
            task.importance,
            today,
        );
        task.health = calculate_health(task.last_done_date, task.expected_interval, today);
    }
}

/// Daily score record with grade and message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyScore {
    pub base_score: f64,
    pub urgent_bonus: f64,
    pub total_score: f64,
    pub grade: String,
    pub message: String,
    pub energy_spent: i32,
    pub tasks_completed: i32,
}

/// Score the day from the set of completions made today.
///
/// Pure in `{energy_cost, urgency}` of the completed tasks and the budget;
/// not path-dependent on completion order.
pub fn calculate_daily_score(completed_tasks: &[TaskState], daily_energy_budget: i32) -> DailyScore {
    if completed_tasks.is_empty() {
        return DailyScore {
            base_score: 0.0,
            urgent_bonus: 0.0,
            total_score: 0.0,
            grade: "rest".to_string(),
            message: "今天是休息日 🌙".to_string(),
            energy_spent: 0,
            tasks_completed: 0,
        };
    }

    let energy_spent: i32 = completed_tasks.iter().map(|t| t.energy_cost).sum();
    let urgency_sum: f64 = completed_tasks.iter().map(|t| t.urgency).sum();

    let energy_ratio = f64::from(energy_spent) / f64::from(daily_energy_budget.max(1));
    let base_score = (energy_ratio * 100.0).min(100.0);

    let urgent_bonus = (urgency_sum * 3.0).min(20.0);

    let total_score = (base_score + urgent_bonus).min(120.0);

    let (grade, message) = if total_score >= 100.0 {
        ("excellent", "太棒了！超额完成！ 🌟")
    } else if total_score >= 80.0 {
        ("good", "干得不错！保持下去 💪")
    } else if total_score >= 50.0 {
        ("okay", "不错的一天！ 👍")
    } else {
        ("light", "轻松的一天也很好 🌿")
    };

    DailyScore {
        base_score: round1(base_score),
        urgent_bonus: round1(urgent_bonus),
        total_score: round1(total_score),
        grade: grade.to_string(),
        message: message.to_string(),
        energy_spent,
        tasks_completed: completed_tasks.len() as i32,
    }
}

/// Aggregate health with a qualitative band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverallHealth {
    pub score: f64,
    pub status: String,
    pub icon: String,
    pub message: String,
}

/// Importance-weighted mean of per-task health.
pub fn calculate_overall_health(tasks: &[TaskState]) -> OverallHealth {
    if tasks.is_empty() {
        return OverallHealth {
            score: 100.0,
            status: "empty".to_string(),
            icon: "🌱".to_string(),
            message: "添加你的第一个习惯吧！".to_string(),
        };
    }

    let weighted_sum: f64 = tasks
        .iter()
        .map(|t| f64::from(t.health) * f64::from(t.importance))
        .sum();
    let weight_total: f64 = tasks.iter().map(|t| f64::from(t.importance)).sum();
    let avg_health = weighted_sum / weight_total;

    let (status, icon, message) = if avg_health >= 80.0 {
        ("thriving", "🌳", "习惯花园一片繁茂！")
    } else if avg_health >= 60.0 {
        ("healthy", "🌿", "整体状态良好")
    } else if avg_health >= 40.0 {
        ("needs_attention", "🌱", "有些习惯需要关注了")
    } else {
        ("struggling", "🥀", "花园需要照料了...")
    };

    OverallHealth {
        score: round1(avg_health),
        status: status.to_string(),
        icon: icon.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::TaskState;
    use chrono::NaiveDate;

    pub fn state(id: i64, energy_cost: i32, interval: i32, importance: i32) -> TaskState {
        TaskState {
            id,
            name: format!("task-{id}"),
            energy_cost,
            expected_interval: interval,
            importance,
            last_done_date: None,
            urgency: 0.0,
            health: 100,
            is_completed_today: false,
            color: "#6366f1".to_string(),
            icon: "star".to_string(),
        }
    }

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
