//! Motivational message selection. Deterministic; no random choice.

use chrono::NaiveDate;

use crate::engine::{CRITICAL_URGENCY, TaskState};

/// Pick the daily message from aggregate health, task count and the most
/// urgent pending task.
pub fn daily_message(
    health_score: f64,
    tasks_count: usize,
    most_urgent_task: Option<&TaskState>,
    today: NaiveDate,
) -> String {
    if tasks_count == 0 {
        return "新的一天，新的开始！添加你想培养的习惯吧 ✨".to_string();
    }

    if let Some(task) = most_urgent_task {
        if task.urgency >= CRITICAL_URGENCY {
            let days = match task.last_done_date {
                Some(done) => (today - done).num_days().to_string(),
                None => "很久".to_string(),
            };
            return format!("{}已经等你{}天了，今天来打个卡？ 📝", task.name, days);
        }
    }

    if health_score >= 80.0 {
        "所有习惯都保持得很好！今天继续加油 💪".to_string()
    } else if health_score >= 60.0 {
        "状态不错！选一两个任务完成就很棒了 🎯".to_string()
    } else if health_score >= 40.0 {
        "有些习惯在想念你了，今天看看它们？ 🌱".to_string()
    } else {
        "别担心，每天进步一点点就好 🌈".to_string()
    }
}
