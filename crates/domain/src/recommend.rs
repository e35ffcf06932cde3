//! Daily task selection under the energy budget and task-count caps.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::engine::{self, CRITICAL_URGENCY, TaskState};

/// Partition tasks into today's recommendations and the rest.
///
/// Tasks already completed today are listed first and widen the cap, so the
/// UI can show completed and suggested tasks together. Critical tasks
/// (urgency >= 2.0) are admitted regardless of the remaining budget; the
/// value pass then fills up by urgency per unit energy. The first
/// forward-looking task is admitted even when it does not fit the budget,
/// provided nothing has consumed the budget yet.
///
/// The result is always a total partition of the input; empty input yields
/// two empty lists.
pub fn recommend_tasks(
    mut tasks: Vec<TaskState>,
    daily_energy_budget: i32,
    max_tasks: i32,
    today: NaiveDate,
) -> (Vec<TaskState>, Vec<TaskState>) {
    engine::annotate(&mut tasks, today);

    let completed_today: Vec<&TaskState> =
        tasks.iter().filter(|t| t.is_completed_today).collect();
    let available: Vec<&TaskState> = tasks.iter().filter(|t| !t.is_completed_today).collect();

    let cap = (max_tasks as usize) + completed_today.len();
    let mut remaining_energy = daily_energy_budget;
    for task in &completed_today {
        remaining_energy -= task.energy_cost;
    }

    let mut recommended_ids: Vec<i64> = completed_today.iter().map(|t| t.id).collect();

    // Critical pass: budget does not apply, the cap does.
    let mut critical: Vec<&TaskState> = available
        .iter()
        .copied()
        .filter(|t| t.urgency >= CRITICAL_URGENCY)
        .collect();
    critical.sort_by(|a, b| cmp_desc(a.urgency, b.urgency).then(a.id.cmp(&b.id)));
    for task in critical {
        if recommended_ids.len() >= cap {
            break;
        }
        recommended_ids.push(task.id);
        remaining_energy -= task.energy_cost;
    }

    // Value pass: urgency per unit energy, admitted while the budget holds.
    let mut normal: Vec<&TaskState> = available
        .iter()
        .copied()
        .filter(|t| t.urgency < CRITICAL_URGENCY)
        .collect();
    normal.sort_by(|a, b| cmp_desc(value_ratio(a), value_ratio(b)).then(a.id.cmp(&b.id)));
    for task in normal {
        if recommended_ids.len() >= cap {
            break;
        }
        if task.energy_cost <= remaining_energy || remaining_energy == daily_energy_budget {
            recommended_ids.push(task.id);
            remaining_energy -= task.energy_cost;
        }
    }

    let mut recommended = Vec::with_capacity(recommended_ids.len());
    for id in &recommended_ids {
        if let Some(task) = tasks.iter().find(|t| t.id == *id) {
            recommended.push(task.clone());
        }
    }
    let others: Vec<TaskState> = tasks
        .into_iter()
        .filter(|t| !recommended_ids.contains(&t.id))
        .collect();

    (recommended, others)
}

fn value_ratio(task: &TaskState) -> f64 {
    task.urgency / f64::from(task.energy_cost.max(1))
}

fn cmp_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{day, state};
    use chrono::NaiveDate;

    fn with_urgency_one(id: i64, energy_cost: i32, today: NaiveDate) -> TaskState {
        // days_since == interval and importance 3 give exactly urgency 1.0.
        let mut task = state(id, energy_cost, 4, 3);
        task.last_done_date = Some(today - chrono::Days::new(4));
        task
    }

    #[test]
    fn critical_task_is_recommended_over_budget() {
        let today = day(2024, 3, 10);
        let mut task = state(1, 3, 2, 5);
        task.last_done_date = Some(day(2024, 3, 4));

        let (recommended, others) = recommend_tasks(vec![task], 15, 5, today);
        assert_eq!(recommended.len(), 1);
        assert!(others.is_empty());
        assert_eq!(recommended[0].urgency, 7.51);
    }

    #[test]
    fn value_pass_prefers_urgency_per_energy() {
        let today = day(2024, 3, 10);
        let tasks = vec![
            with_urgency_one(7, 2, today),
            with_urgency_one(4, 3, today),
        ];

        let (recommended, others) = recommend_tasks(tasks, 4, 5, today);
        // Ratios 0.5 vs 0.33: id 7 admitted (cost 2 <= 4); id 4 rejected
        // (cost 3 > remaining 2, and remaining no longer equals the budget).
        assert_eq!(recommended.iter().map(|t| t.id).collect::<Vec<_>>(), [7]);
        assert_eq!(others.iter().map(|t| t.id).collect::<Vec<_>>(), [4]);
    }

    #[test]
    fn first_task_free_only_before_budget_is_touched() {
        let today = day(2024, 3, 10);
        let mut done = state(1, 3, 7, 3);
        done.is_completed_today = true;
        done.last_done_date = Some(today);
        let pending = with_urgency_one(2, 4, today);

        // A completion already consumed energy 3 of budget 2: remaining is -1,
        // which is not the untouched budget, so the oversized task is skipped.
        let (recommended, others) =
            recommend_tasks(vec![done.clone(), pending.clone()], 2, 5, today);
        assert_eq!(recommended.iter().map(|t| t.id).collect::<Vec<_>>(), [1]);
        assert_eq!(others.iter().map(|t| t.id).collect::<Vec<_>>(), [2]);

        // Without the completion the budget is untouched and the same task
        // is admitted even though it exceeds the budget.
        let (recommended, others) = recommend_tasks(vec![pending], 2, 5, today);
        assert_eq!(recommended.iter().map(|t| t.id).collect::<Vec<_>>(), [2]);
        assert!(others.is_empty());
    }

    #[test]
    fn completed_today_widens_the_cap() {
        let today = day(2024, 3, 10);
        let mut tasks: Vec<TaskState> = (1..=3)
            .map(|id| {
                let mut t = state(id, 1, 7, 3);
                t.is_completed_today = true;
                t.last_done_date = Some(today);
                t
            })
            .collect();
        tasks.push(with_urgency_one(10, 1, today));

        let (recommended, _) = recommend_tasks(tasks, 20, 1, today);
        // cap = max_tasks + completed = 4: all three completions plus one pick.
        assert_eq!(recommended.len(), 4);
        assert!(recommended.iter().take(3).all(|t| t.is_completed_today));
    }

    #[test]
    fn partition_is_total_and_disjoint() {
        let today = day(2024, 3, 10);
        let mut tasks = Vec::new();
        for id in 1..=8 {
            let mut t = state(id, (id % 5 + 1) as i32, (id % 7 + 1) as i32, (id % 5 + 1) as i32);
            if id % 3 == 0 {
                t.last_done_date = Some(today - chrono::Days::new(id as u64));
            }
            if id == 4 {
                t.is_completed_today = true;
                t.last_done_date = Some(today);
            }
            tasks.push(t);
        }

        let input_ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        let (recommended, others) = recommend_tasks(tasks, 10, 3, today);

        let mut seen: Vec<i64> = recommended
            .iter()
            .chain(others.iter())
            .map(|t| t.id)
            .collect();
        seen.sort_unstable();
        let mut expected = input_ids;
        expected.sort_unstable();
        assert_eq!(seen, expected);
        assert!(recommended.len() <= 3 + 1);
    }

    #[test]
    fn criticals_sort_by_urgency_then_id() {
        let today = day(2024, 3, 10);
        let mut a = state(5, 1, 1, 5);
        a.last_done_date = Some(day(2024, 3, 1));
        let mut b = state(2, 1, 1, 5);
        b.last_done_date = Some(day(2024, 3, 1));
        let mut c = state(9, 1, 1, 5);
        c.last_done_date = Some(day(2024, 2, 1));

        let (recommended, _) = recommend_tasks(vec![a, b, c], 30, 10, today);
        // c is most overdue; a and b tie and fall back to id order.
        assert_eq!(recommended.iter().map(|t| t.id).collect::<Vec<_>>(), [9, 2, 5]);
    }

    #[test]
    fn empty_input_yields_empty_partition() {
        let (recommended, others) = recommend_tasks(Vec::new(), 15, 5, day(2024, 3, 10));
        assert!(recommended.is_empty());
        assert!(others.is_empty());
    }
}
