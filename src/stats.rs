//! Derived dashboard aggregates: status counts, progress percentages, D-day.
//!
//! Everything here is pure. Counts are recomputed from scratch on every call;
//! callers never patch them incrementally.

use chrono::{Local, NaiveDate};

use crate::types::{Dashboard, Task, TaskStatus};

/// Status counts over a task collection.
///
/// `total` may exceed the sum of the three buckets when out-of-set statuses
/// are present — those count only toward `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub total: usize,
}

/// Count tasks by canonical status.
pub fn recompute(tasks: &[Task]) -> DashboardCounts {
    let mut counts = DashboardCounts {
        total: tasks.len(),
        ..Default::default()
    };
    for task in tasks {
        match task.status {
            TaskStatus::Pending => counts.pending += 1,
            TaskStatus::InProgress => counts.in_progress += 1,
            TaskStatus::Completed => counts.completed += 1,
            TaskStatus::Other(_) => {}
        }
    }
    counts
}

/// Recompute a dashboard's counts from its own task list.
pub fn apply_counts(dashboard: &mut Dashboard) {
    let counts = recompute(&dashboard.tasks);
    dashboard.total_tasks = counts.total;
    dashboard.pending_tasks = counts.pending;
    dashboard.in_progress_tasks = counts.in_progress;
    dashboard.completed_tasks = counts.completed;
}

/// Integer progress percentages per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub pending: u32,
    pub in_progress: u32,
    pub completed: u32,
}

/// `round(count/total*100)` per bucket; all zero when the dashboard is empty.
pub fn progress_percent(dashboard: &Dashboard) -> Progress {
    if dashboard.total_tasks == 0 {
        return Progress::default();
    }
    let pct = |count: usize| ((count as f64 / dashboard.total_tasks as f64) * 100.0).round() as u32;
    Progress {
        pending: pct(dashboard.pending_tasks),
        in_progress: pct(dashboard.in_progress_tasks),
        completed: pct(dashboard.completed_tasks),
    }
}

/// Signed day count from today (local midnight) to a due date.
///
/// Returns `None` for empty or unparsable dates. Accepts `-`, `.`, and `/`
/// as date separators since extracted contract text is not uniform.
pub fn days_until(date: &str) -> Option<i64> {
    days_until_from(date, Local::now().date_naive())
}

/// Same as [`days_until`] with an injectable "today" for deterministic tests.
pub fn days_until_from(date: &str, today: NaiveDate) -> Option<i64> {
    let due = parse_date(date.trim())?;
    Some((due - today).num_days())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Some(d);
        }
    }
    None
}

/// D-day label: `D+n` past due, `D-Day` today, `D-n` upcoming.
pub fn dday_label(days: i64) -> String {
    match days {
        d if d < 0 => format!("D+{}", d.abs()),
        0 => "D-Day".to_string(),
        d => format!("D-{}", d),
    }
}

/// Urgency bucket for border/highlight selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Urgency {
    Overdue,
    Imminent,
    Soon,
    #[default]
    Normal,
}

/// Bucket a task's due-date distance. Completed tasks are never urgent,
/// regardless of date.
pub fn urgency(days: Option<i64>, status: &TaskStatus) -> Urgency {
    if *status == TaskStatus::Completed {
        return Urgency::Normal;
    }
    match days {
        Some(d) if d < 0 => Urgency::Overdue,
        Some(d) if d <= 3 => Urgency::Imminent,
        Some(d) if d <= 7 => Urgency::Soon,
        _ => Urgency::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskPriority;

    fn task(status: &str) -> Task {
        Task {
            contract_id: 1,
            contract_name: None,
            task_id: "TASK-001".to_string(),
            task_name: "t".to_string(),
            phase: String::new(),
            due_date: None,
            priority: TaskPriority::default(),
            status: status.to_string().into(),
            assignee_id: None,
            assignee_name: None,
            note: None,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_counts_sum_invariant() {
        let tasks = vec![task("대기"), task("진행중"), task("완료"), task("대기")];
        let counts = recompute(&tasks);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(
            counts.pending + counts.in_progress + counts.completed,
            counts.total
        );
    }

    #[test]
    fn test_out_of_set_status_counts_only_in_total() {
        let tasks = vec![task("대기"), task("보류")];
        let counts = recompute(&tasks);
        assert_eq!(counts.total, 2);
        assert_eq!(counts.pending + counts.in_progress + counts.completed, 1);
    }

    #[test]
    fn test_progress_zero_total() {
        let dashboard = Dashboard::default();
        assert_eq!(progress_percent(&dashboard), Progress::default());
    }

    #[test]
    fn test_progress_rounding() {
        let mut dashboard = Dashboard {
            tasks: vec![task("대기"), task("진행중"), task("완료")],
            ..Default::default()
        };
        apply_counts(&mut dashboard);
        let p = progress_percent(&dashboard);
        // 1/3 rounds to 33
        assert_eq!(p.pending, 33);
        assert_eq!(p.in_progress, 33);
        assert_eq!(p.completed, 33);
    }

    #[test]
    fn test_days_until_signs() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(days_until_from("2026-08-24", today), Some(0));
        assert_eq!(days_until_from("2026-08-27", today), Some(3));
        assert_eq!(days_until_from("2026-08-20", today), Some(-4));
        assert_eq!(days_until_from("", today), None);
        assert_eq!(days_until_from("미정", today), None);
        assert_eq!(days_until_from("2026.09.01", today), Some(8));
    }

    #[test]
    fn test_dday_label_roundtrip() {
        // label uniquely reconstructs sign and magnitude
        assert_eq!(dday_label(-4), "D+4");
        assert_eq!(dday_label(0), "D-Day");
        assert_eq!(dday_label(3), "D-3");
    }

    #[test]
    fn test_urgency_buckets() {
        let pending = TaskStatus::Pending;
        assert_eq!(urgency(Some(-1), &pending), Urgency::Overdue);
        assert_eq!(urgency(Some(0), &pending), Urgency::Imminent);
        assert_eq!(urgency(Some(3), &pending), Urgency::Imminent);
        assert_eq!(urgency(Some(7), &pending), Urgency::Soon);
        assert_eq!(urgency(Some(8), &pending), Urgency::Normal);
        assert_eq!(urgency(None, &pending), Urgency::Normal);
    }

    #[test]
    fn test_completed_is_never_urgent() {
        assert_eq!(urgency(Some(-10), &TaskStatus::Completed), Urgency::Normal);
    }
}
