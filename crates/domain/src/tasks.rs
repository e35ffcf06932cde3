//! Task request/response types with boundary validation.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^#[0-9a-fA-F]{6}$").expect("valid color pattern"));

fn default_energy_cost() -> i32 {
    2
}

fn default_expected_interval() -> i32 {
    2
}

fn default_importance() -> i32 {
    3
}

fn default_color() -> String {
    "#6366f1".to_string()
}

fn default_icon() -> String {
    "star".to_string()
}

/// Task creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 5))]
    #[serde(default = "default_energy_cost")]
    pub energy_cost: i32,
    #[validate(range(min = 1, max = 30))]
    #[serde(default = "default_expected_interval")]
    pub expected_interval: i32,
    #[validate(range(min = 1, max = 5))]
    #[serde(default = "default_importance")]
    pub importance: i32,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[validate(regex(path = *COLOR_RE))]
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

/// Partial task update.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub energy_cost: Option<i32>,
    #[validate(range(min = 1, max = 30))]
    pub expected_interval: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub importance: Option<i32>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[validate(regex(path = *COLOR_RE))]
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

/// Task response, with the derived completion summary.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
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

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn create(name: &str, color: &str) -> TaskCreate {
        TaskCreate {
            name: name.to_string(),
            description: None,
            energy_cost: 2,
            expected_interval: 2,
            importance: 3,
            category: None,
            color: color.to_string(),
            icon: "star".to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_task() {
        assert!(create("晨跑", "#6366f1").validate().is_ok());
    }

    #[test]
    fn rejects_bad_color_and_empty_name() {
        assert!(create("晨跑", "#66f").validate().is_err());
        assert!(create("晨跑", "6366f1").validate().is_err());
        assert!(create("", "#6366f1").validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        let mut task = create("晨跑", "#6366f1");
        task.energy_cost = 6;
        assert!(task.validate().is_err());
        task.energy_cost = 5;
        task.expected_interval = 31;
        assert!(task.validate().is_err());
        task.expected_interval = 30;
        task.importance = 0;
        assert!(task.validate().is_err());
    }
}
