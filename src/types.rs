//! Core data model: tasks, dashboards, contract schedules, teams, notifications.
//!
//! The wire format uses Korean status/priority labels ("대기", "보통", ...).
//! Both enums are closed with an explicit `Other(String)` variant: the server
//! tolerates out-of-set values, so we preserve them verbatim instead of
//! failing deserialization. Out-of-set statuses count toward `total_tasks`
//! but toward none of the three canonical buckets.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Status & priority
// ============================================================================

pub const STATUS_PENDING: &str = "대기";
pub const STATUS_IN_PROGRESS: &str = "진행중";
pub const STATUS_COMPLETED: &str = "완료";

/// Task status. Canonical labels plus a pass-through for anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => STATUS_PENDING,
            TaskStatus::InProgress => STATUS_IN_PROGRESS,
            TaskStatus::Completed => STATUS_COMPLETED,
            TaskStatus::Other(s) => s,
        }
    }

    /// True for the three labels the dashboard buckets by.
    pub fn is_canonical(&self) -> bool {
        !matches!(self, TaskStatus::Other(_))
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            STATUS_PENDING => TaskStatus::Pending,
            STATUS_IN_PROGRESS => TaskStatus::InProgress,
            STATUS_COMPLETED => TaskStatus::Completed,
            _ => TaskStatus::Other(s),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(s: TaskStatus) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority. Defaults to "보통" like the server does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskPriority {
    Urgent,
    High,
    Normal,
    Low,
    Other(String),
}

impl TaskPriority {
    pub fn as_str(&self) -> &str {
        match self {
            TaskPriority::Urgent => "긴급",
            TaskPriority::High => "높음",
            TaskPriority::Normal => "보통",
            TaskPriority::Low => "낮음",
            TaskPriority::Other(s) => s,
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Normal
    }
}

impl From<String> for TaskPriority {
    fn from(s: String) -> Self {
        match s.as_str() {
            "긴급" => TaskPriority::Urgent,
            "높음" => TaskPriority::High,
            "보통" => TaskPriority::Normal,
            "낮음" => TaskPriority::Low,
            _ => TaskPriority::Other(s),
        }
    }
}

impl From<TaskPriority> for String {
    fn from(p: TaskPriority) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tasks & dashboard
// ============================================================================

/// A file attached to a task. Appended/removed as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    #[serde(default)]
    pub url: String,
}

/// A task within a contract. Identity is `(contract_id, task_id)` —
/// `task_id` ("TASK-001" style) is unique only within its contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub contract_id: i64,
    #[serde(default)]
    pub contract_name: Option<String>,
    pub task_id: String,
    pub task_name: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub assignee_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Aggregated task view for a team or personal scope.
///
/// Counts are recomputed wholesale from `tasks` after every structural
/// change — never incrementally patched — so they can't drift.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub total_tasks: usize,
    #[serde(default)]
    pub pending_tasks: usize,
    #[serde(default)]
    pub in_progress_tasks: usize,
    #[serde(default)]
    pub completed_tasks: usize,
}

// ============================================================================
// Contract schedule (extraction working copy)
// ============================================================================

/// One phase of a contract schedule, as extracted from the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub phase: String,
    #[serde(default)]
    pub schedule_type: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deliverables: Option<Vec<String>>,
}

/// Contract metadata plus its phase schedules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractSchedule {
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub contractor: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub contract_date: Option<String>,
    #[serde(default)]
    pub contract_start_date: Option<String>,
    #[serde(default)]
    pub contract_end_date: Option<String>,
    #[serde(default)]
    pub total_duration_days: Option<i64>,
    #[serde(default)]
    pub contract_amount: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_due_date: Option<String>,
    #[serde(default)]
    pub schedules: Vec<ScheduleItem>,
    #[serde(default)]
    pub milestones: Option<Vec<String>>,
}

/// A task row inside an extraction result (not yet bound to a contract id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskItem {
    pub task_id: String,
    pub task_name: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
}

/// Editable working copy produced by extraction or by loading a saved
/// contract. Edits mutate it in place; nothing persists until an explicit
/// save through the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default)]
    pub contract_schedule: Option<ContractSchedule>,
    #[serde(default)]
    pub task_list: Option<Vec<TaskItem>>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

impl ExtractionResult {
    /// Append a task, assigning the next TASK-nnn id the way the server
    /// does. Returns the id actually used.
    pub fn add_task(&mut self, mut task: TaskItem) -> String {
        let list = self.task_list.get_or_insert_with(Vec::new);
        if task.task_id.is_empty() {
            task.task_id = next_task_id(list);
        }
        let id = task.task_id.clone();
        list.push(task);
        id
    }

    /// Remove a task by id. Returns true if something was removed.
    pub fn delete_task(&mut self, task_id: &str) -> bool {
        match self.task_list.as_mut() {
            Some(list) => {
                let before = list.len();
                list.retain(|t| t.task_id != task_id);
                list.len() != before
            }
            None => false,
        }
    }

    pub fn add_schedule(&mut self, item: ScheduleItem) {
        self.contract_schedule
            .get_or_insert_with(ContractSchedule::default)
            .schedules
            .push(item);
    }

    /// Remove a schedule row by position. Returns true if in range.
    pub fn delete_schedule(&mut self, index: usize) -> bool {
        match self.contract_schedule.as_mut() {
            Some(cs) if index < cs.schedules.len() => {
                cs.schedules.remove(index);
                true
            }
            _ => false,
        }
    }
}

/// Next "TASK-nnn" id: max numeric suffix + 1, zero-padded to three digits.
fn next_task_id(list: &[TaskItem]) -> String {
    let max_id = list
        .iter()
        .filter_map(|t| t.task_id.strip_prefix("TASK-"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("TASK-{:03}", max_id + 1)
}

// ============================================================================
// Teams & members
// ============================================================================

/// Personal scope (no team) or a team id. Governs which dashboard is loaded
/// and which permission set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeamScope {
    #[default]
    Personal,
    Team(i64),
}

impl TeamScope {
    pub fn team_id(&self) -> Option<i64> {
        match self {
            TeamScope::Personal => None,
            TeamScope::Team(id) => Some(*id),
        }
    }
}

/// A team member as returned by the members endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One page of the notification list, plus the total unread count.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationPage {
    #[serde(default)]
    pub items: Vec<Notification>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub unread_count: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionStatus {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub teams: Vec<TeamInfo>,
}
