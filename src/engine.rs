//! The sync engine: authoritative-but-stale local state plus the optimistic
//! mutation controller.
//!
//! Mutation protocol for fields with a cheap inverse (status, assignee):
//! snapshot the current value, apply the new value locally and recompute the
//! dashboard, then issue the remote request; on failure restore the snapshot,
//! recompute again, and surface the error. Operations without a cheap inverse
//! (note save, attachments, task add) apply only after server confirmation.
//!
//! Concurrency: operations on the same entity are not serialized. Two rapid
//! edits to the same field can settle out of order; the last server response
//! to settle wins. Accepted limitation, not a guarantee.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::api::{AssigneeUpdate, NewTask, RemoteApi};
use crate::cache::{self, SessionCache, StatusFilter};
use crate::config::ClientConfig;
use crate::error::SyncError;
use crate::export::{self, ExportArtifact};
use crate::mentions;
use crate::notifications::NotificationState;
use crate::permissions::{caps, PermissionGate};
use crate::stats::{self, DashboardCounts, Progress};
use crate::types::{
    Attachment, Dashboard, ExtractionResult, Member, SessionStatus, Task, TaskStatus, TeamScope,
};

pub struct SyncEngine {
    api: Arc<dyn RemoteApi>,
    poll_interval: Duration,
    authenticated: AtomicBool,
    dashboard: Mutex<Dashboard>,
    result: Mutex<Option<ExtractionResult>>,
    gate: Mutex<PermissionGate>,
    members: Mutex<Vec<Member>>,
    pub(crate) notification_state: Mutex<NotificationState>,
    cache: Mutex<SessionCache>,
}

impl SyncEngine {
    pub fn new(api: Arc<dyn RemoteApi>, config: &ClientConfig) -> Self {
        Self {
            api,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            authenticated: AtomicBool::new(false),
            dashboard: Mutex::new(Dashboard::default()),
            result: Mutex::new(None),
            gate: Mutex::new(PermissionGate::personal()),
            members: Mutex::new(Vec::new()),
            notification_state: Mutex::new(NotificationState::default()),
            cache: Mutex::new(SessionCache::default()),
        }
    }

    pub(crate) fn api(&self) -> &dyn RemoteApi {
        self.api.as_ref()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Check the session and, when logged in, load the initial dashboard.
    pub async fn start_session(&self) -> Result<SessionStatus, SyncError> {
        let status = self.api.session_status().await?;
        self.authenticated.store(status.logged_in, Ordering::SeqCst);
        if status.logged_in {
            self.load_dashboard().await?;
        }
        Ok(status)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Mark the session ended. The notification poller observes this and
    /// stops on its next tick.
    pub fn logout(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }

    // ========================================================================
    // Scope & permissions
    // ========================================================================

    pub fn scope(&self) -> TeamScope {
        self.gate.lock().scope()
    }

    pub fn has_permission(&self, capability: &str) -> bool {
        self.gate.lock().has_permission(capability)
    }

    /// Switch team scope: reload permissions (fail-closed), members, and the
    /// scoped dashboard. A switch that lands mid-flight of an older switch
    /// only installs capabilities if the scope still matches.
    pub async fn switch_team(&self, scope: TeamScope) -> Result<(), SyncError> {
        self.gate.lock().set_scope(scope);

        match scope.team_id() {
            Some(team_id) => {
                match self.api.team_permissions(team_id).await {
                    Ok(permissions) => {
                        let mut gate = self.gate.lock();
                        if gate.scope() == scope {
                            gate.replace(permissions);
                        }
                    }
                    Err(e) => {
                        self.gate.lock().clear();
                        log::warn!("Permission load for team {} failed, denying all: {}", team_id, e);
                    }
                }
                match self.api.team_members(team_id).await {
                    Ok(members) => *self.members.lock() = members,
                    Err(e) => {
                        self.members.lock().clear();
                        log::warn!("Member load for team {} failed: {}", team_id, e);
                    }
                }
            }
            None => self.members.lock().clear(),
        }

        self.load_dashboard().await
    }

    pub fn members(&self) -> Vec<Member> {
        self.members.lock().clone()
    }

    // ========================================================================
    // Dashboard
    // ========================================================================

    /// Replace the task collection from the server and recompute counts.
    pub async fn load_dashboard(&self) -> Result<(), SyncError> {
        let scope = self.scope();
        let summary = self.api.dashboard_summary(scope).await?;
        let mut dashboard = self.dashboard.lock();
        dashboard.tasks = summary.tasks;
        stats::apply_counts(&mut dashboard);
        Ok(())
    }

    pub fn dashboard(&self) -> Dashboard {
        self.dashboard.lock().clone()
    }

    pub fn counts(&self) -> DashboardCounts {
        stats::recompute(&self.dashboard.lock().tasks)
    }

    pub fn progress(&self) -> Progress {
        stats::progress_percent(&self.dashboard.lock())
    }

    /// Filtered/searched view for the UI, without re-fetching.
    pub fn filtered_tasks(&self, filter: StatusFilter, search: &str) -> Vec<Task> {
        let dashboard = self.dashboard.lock();
        cache::filter_tasks(&dashboard.tasks, filter, search)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Drag-reorder against the unfiltered view. Returns false (order
    /// untouched) when a filter or search is active.
    pub fn reorder_tasks(
        &self,
        from: usize,
        to: usize,
        filter: StatusFilter,
        search: &str,
    ) -> bool {
        let mut dashboard = self.dashboard.lock();
        cache::reorder(&mut dashboard.tasks, from, to, filter, search)
    }

    // ========================================================================
    // Optimistic mutations
    // ========================================================================

    /// Change a task's status: apply locally, confirm remotely, roll back
    /// to the snapshot on failure.
    pub async fn update_task_status(
        &self,
        contract_id: i64,
        task_id: &str,
        new_status: TaskStatus,
    ) -> Result<(), SyncError> {
        self.gate.lock().require(caps::TASK_UPDATE, "update tasks")?;

        let previous = {
            let mut dashboard = self.dashboard.lock();
            let task = find_task_mut(&mut dashboard.tasks, contract_id, task_id)
                .ok_or_else(|| SyncError::Validation("Task not found.".to_string()))?;
            let previous = std::mem::replace(&mut task.status, new_status.clone());
            stats::apply_counts(&mut dashboard);
            previous
        };

        if let Err(err) = self
            .api
            .update_task_status(contract_id, task_id, &new_status)
            .await
        {
            let mut dashboard = self.dashboard.lock();
            if let Some(task) = find_task_mut(&mut dashboard.tasks, contract_id, task_id) {
                task.status = previous;
            }
            stats::apply_counts(&mut dashboard);
            log::warn!(
                "Status update for ({}, {}) failed, rolled back: {}",
                contract_id,
                task_id,
                err
            );
            return Err(err);
        }
        Ok(())
    }

    /// Change a task's assignee. On success the server's resolved display
    /// name is applied; on failure both id and name roll back.
    pub async fn update_task_assignee(
        &self,
        contract_id: i64,
        task_id: &str,
        assignee_id: Option<i64>,
    ) -> Result<(), SyncError> {
        self.gate
            .lock()
            .require(caps::TASK_ASSIGN, "assign tasks")?;

        let previous = {
            let mut dashboard = self.dashboard.lock();
            let task = find_task_mut(&mut dashboard.tasks, contract_id, task_id)
                .ok_or_else(|| SyncError::Validation("Task not found.".to_string()))?;
            let previous = (task.assignee_id, task.assignee_name.clone());
            task.assignee_id = assignee_id;
            // Tentative name from the local roster until the server resolves it.
            task.assignee_name = assignee_id.and_then(|id| {
                self.members
                    .lock()
                    .iter()
                    .find(|m| m.user_id == id)
                    .map(|m| m.name.clone())
            });
            previous
        };

        match self
            .api
            .update_task_assignee(contract_id, task_id, assignee_id)
            .await
        {
            Ok(AssigneeUpdate {
                assignee_id: resolved_id,
                assignee_name,
            }) => {
                let mut dashboard = self.dashboard.lock();
                if let Some(task) = find_task_mut(&mut dashboard.tasks, contract_id, task_id) {
                    task.assignee_id = resolved_id;
                    task.assignee_name = assignee_name;
                }
                Ok(())
            }
            Err(err) => {
                let mut dashboard = self.dashboard.lock();
                if let Some(task) = find_task_mut(&mut dashboard.tasks, contract_id, task_id) {
                    task.assignee_id = previous.0;
                    task.assignee_name = previous.1;
                }
                log::warn!(
                    "Assignee update for ({}, {}) failed, rolled back: {}",
                    contract_id,
                    task_id,
                    err
                );
                Err(err)
            }
        }
    }

    // ========================================================================
    // Confirm-then-apply mutations (no cheap inverse)
    // ========================================================================

    /// Save a task note. Applied locally only after the server confirms.
    pub async fn save_task_note(
        &self,
        contract_id: i64,
        task_id: &str,
        note: &str,
    ) -> Result<(), SyncError> {
        self.gate.lock().require(caps::TASK_UPDATE, "update tasks")?;

        self.api.save_task_note(contract_id, task_id, note).await?;

        let mut dashboard = self.dashboard.lock();
        if let Some(task) = find_task_mut(&mut dashboard.tasks, contract_id, task_id) {
            task.note = Some(note.to_string());
        }
        Ok(())
    }

    /// Create a task on a contract. The server assigns the task id; the
    /// returned task is appended locally and the counts recomputed.
    pub async fn add_task(&self, contract_id: i64, task: NewTask) -> Result<Task, SyncError> {
        self.gate.lock().require(caps::TASK_CREATE, "create tasks")?;
        if task.task_name.trim().is_empty() {
            return Err(SyncError::Validation("업무명을 입력해주세요.".to_string()));
        }

        let created = self.api.add_task(contract_id, &task).await?;

        let mut dashboard = self.dashboard.lock();
        dashboard.tasks.push(created.clone());
        stats::apply_counts(&mut dashboard);
        Ok(created)
    }

    pub async fn add_attachment(
        &self,
        contract_id: i64,
        task_id: &str,
        attachment: Attachment,
    ) -> Result<(), SyncError> {
        self.gate
            .lock()
            .require(caps::ATTACHMENT_UPLOAD, "upload attachments")?;

        self.api
            .add_attachment(contract_id, task_id, &attachment)
            .await?;

        let mut dashboard = self.dashboard.lock();
        if let Some(task) = find_task_mut(&mut dashboard.tasks, contract_id, task_id) {
            task.attachments.push(attachment);
        }
        Ok(())
    }

    pub async fn remove_attachment(
        &self,
        contract_id: i64,
        task_id: &str,
        filename: &str,
    ) -> Result<(), SyncError> {
        self.gate
            .lock()
            .require(caps::ATTACHMENT_DELETE, "delete attachments")?;

        self.api
            .remove_attachment(contract_id, task_id, filename)
            .await?;

        let mut dashboard = self.dashboard.lock();
        if let Some(task) = find_task_mut(&mut dashboard.tasks, contract_id, task_id) {
            task.attachments.retain(|a| a.filename != filename);
        }
        Ok(())
    }

    /// Reflect a server-side task deletion locally.
    pub fn remove_task(&self, contract_id: i64, task_id: &str) -> bool {
        let mut dashboard = self.dashboard.lock();
        let before = dashboard.tasks.len();
        dashboard
            .tasks
            .retain(|t| !(t.contract_id == contract_id && t.task_id == task_id));
        let removed = dashboard.tasks.len() != before;
        if removed {
            stats::apply_counts(&mut dashboard);
        }
        removed
    }

    // ========================================================================
    // Extraction working copy & export
    // ========================================================================

    pub fn set_result(&self, result: ExtractionResult) {
        *self.result.lock() = Some(result);
    }

    pub fn clear_result(&self) {
        *self.result.lock() = None;
    }

    pub fn result(&self) -> Option<ExtractionResult> {
        self.result.lock().clone()
    }

    /// Edit the working copy in place. Returns false when none is loaded.
    pub fn edit_result(&self, edit: impl FnOnce(&mut ExtractionResult)) -> bool {
        match self.result.lock().as_mut() {
            Some(result) => {
                edit(result);
                true
            }
            None => false,
        }
    }

    /// Persist the working copy through the API. Returns the contract id.
    pub async fn save_contract(&self) -> Result<i64, SyncError> {
        self.gate
            .lock()
            .require(caps::CONTRACT_CREATE, "save contracts")?;
        let result = self
            .result
            .lock()
            .clone()
            .ok_or_else(|| SyncError::Validation("No contract data to save.".to_string()))?;
        self.api.save_contract(&result).await
    }

    /// All three exporters no-op (None) when no result is loaded.
    pub fn export_csv(&self) -> Option<ExportArtifact> {
        self.result.lock().as_ref().and_then(export::to_csv)
    }

    pub fn export_json(&self) -> Option<ExportArtifact> {
        self.result.lock().as_ref().and_then(export::to_json)
    }

    pub fn export_doc(&self) -> Option<ExportArtifact> {
        self.result.lock().as_ref().and_then(export::to_doc)
    }

    // ========================================================================
    // Caches & mentions
    // ========================================================================

    /// Stable palette entry for a contract name.
    pub fn color_for(&self, name: &str) -> &'static str {
        self.cache.lock().color_for(name)
    }

    pub fn add_reaction(&self, comment_id: &str, emoji: &str) {
        self.cache.lock().add_reaction(comment_id, emoji);
    }

    pub fn load_cache(&self, path: &std::path::Path) {
        *self.cache.lock() = SessionCache::load(path);
    }

    pub fn persist_cache(&self, path: &std::path::Path) {
        if let Err(e) = self.cache.lock().save(path) {
            log::warn!("Failed to persist session cache: {}", e);
        }
    }

    /// Mention suggestions for an in-progress comment, from the loaded roster.
    pub fn mention_suggestions(&self, input: &str) -> Vec<Member> {
        let Some(query) = mentions::detect(input) else {
            return Vec::new();
        };
        let members = self.members.lock();
        mentions::suggest(&query.token, &members)
            .into_iter()
            .cloned()
            .collect()
    }
}

fn find_task_mut<'a>(
    tasks: &'a mut [Task],
    contract_id: i64,
    task_id: &str,
) -> Option<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|t| t.contract_id == contract_id && t.task_id == task_id)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::DashboardSummary;
    use crate::types::{NotificationPage, TaskPriority};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Mock endpoint: counts every network call, optionally fails mutations.
    pub(crate) struct MockApi {
        pub fail_mutations: bool,
        pub fail_permissions: bool,
        pub calls: AtomicUsize,
        pub tasks: Vec<Task>,
        pub permissions: Vec<String>,
        pub unread: u64,
        pub notifications: Vec<crate::types::Notification>,
    }

    impl Default for MockApi {
        fn default() -> Self {
            Self {
                fail_mutations: false,
                fail_permissions: false,
                calls: AtomicUsize::new(0),
                tasks: vec![fixture_task("TASK-001", "대기"), fixture_task("TASK-002", "완료")],
                permissions: Vec::new(),
                unread: 0,
                notifications: Vec::new(),
            }
        }
    }

    pub(crate) fn fixture_task(task_id: &str, status: &str) -> Task {
        Task {
            contract_id: 1,
            contract_name: Some("플랫폼 구축".to_string()),
            task_id: task_id.to_string(),
            task_name: format!("{} 업무", task_id),
            phase: "개발".to_string(),
            due_date: Some("2026-09-01".to_string()),
            priority: TaskPriority::Normal,
            status: status.to_string().into(),
            assignee_id: None,
            assignee_name: None,
            note: None,
            attachments: Vec::new(),
        }
    }

    impl MockApi {
        fn track(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn mutation_result(&self) -> Result<(), SyncError> {
            if self.fail_mutations {
                Err(SyncError::Remote {
                    status: 500,
                    detail: "일시적인 오류가 발생했습니다".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RemoteApi for MockApi {
        async fn session_status(&self) -> Result<SessionStatus, SyncError> {
            self.track();
            Ok(SessionStatus {
                logged_in: true,
                user: None,
                teams: Vec::new(),
            })
        }

        async fn dashboard_summary(&self, _scope: TeamScope) -> Result<DashboardSummary, SyncError> {
            self.track();
            Ok(DashboardSummary {
                tasks: self.tasks.clone(),
                ..Default::default()
            })
        }

        async fn update_task_status(
            &self,
            _contract_id: i64,
            _task_id: &str,
            _status: &TaskStatus,
        ) -> Result<(), SyncError> {
            self.track();
            self.mutation_result()
        }

        async fn update_task_assignee(
            &self,
            _contract_id: i64,
            _task_id: &str,
            assignee_id: Option<i64>,
        ) -> Result<AssigneeUpdate, SyncError> {
            self.track();
            self.mutation_result()?;
            Ok(AssigneeUpdate {
                assignee_id,
                assignee_name: assignee_id.map(|_| "김철수".to_string()),
            })
        }

        async fn save_task_note(
            &self,
            _contract_id: i64,
            _task_id: &str,
            _note: &str,
        ) -> Result<(), SyncError> {
            self.track();
            self.mutation_result()
        }

        async fn add_task(&self, contract_id: i64, task: &NewTask) -> Result<Task, SyncError> {
            self.track();
            self.mutation_result()?;
            let mut created = fixture_task("TASK-099", &task.status);
            created.contract_id = contract_id;
            created.task_name = task.task_name.clone();
            Ok(created)
        }

        async fn add_attachment(
            &self,
            _contract_id: i64,
            _task_id: &str,
            _attachment: &Attachment,
        ) -> Result<(), SyncError> {
            self.track();
            self.mutation_result()
        }

        async fn remove_attachment(
            &self,
            _contract_id: i64,
            _task_id: &str,
            _filename: &str,
        ) -> Result<(), SyncError> {
            self.track();
            self.mutation_result()
        }

        async fn save_contract(&self, _result: &ExtractionResult) -> Result<i64, SyncError> {
            self.track();
            self.mutation_result()?;
            Ok(42)
        }

        async fn team_members(&self, _team_id: i64) -> Result<Vec<Member>, SyncError> {
            self.track();
            Ok(vec![Member {
                user_id: 10,
                name: "김철수".to_string(),
                email: "kim@test.com".to_string(),
                role: "member".to_string(),
            }])
        }

        async fn team_permissions(&self, _team_id: i64) -> Result<Vec<String>, SyncError> {
            self.track();
            if self.fail_permissions {
                return Err(SyncError::Remote {
                    status: 500,
                    detail: "permission service down".to_string(),
                });
            }
            Ok(self.permissions.clone())
        }

        async fn unread_count(&self) -> Result<u64, SyncError> {
            self.track();
            Ok(self.unread)
        }

        async fn list_notifications(
            &self,
            page: u32,
            size: u32,
        ) -> Result<NotificationPage, SyncError> {
            self.track();
            Ok(NotificationPage {
                items: self.notifications.clone(),
                total: self.notifications.len() as u64,
                unread_count: self.notifications.iter().filter(|n| !n.is_read).count() as u64,
                page,
                size,
            })
        }

        async fn mark_read(&self, _notification_id: i64) -> Result<(), SyncError> {
            self.track();
            self.mutation_result()
        }

        async fn mark_all_read(&self) -> Result<(), SyncError> {
            self.track();
            self.mutation_result()
        }
    }

    pub(crate) async fn engine_with(api: MockApi) -> (SyncEngine, Arc<MockApi>) {
        let api = Arc::new(api);
        let engine = SyncEngine::new(api.clone(), &ClientConfig::default());
        engine.load_dashboard().await.unwrap();
        (engine, api)
    }

    #[tokio::test]
    async fn test_status_update_success() {
        let (engine, _api) = engine_with(MockApi::default()).await;
        engine
            .update_task_status(1, "TASK-001", TaskStatus::Completed)
            .await
            .unwrap();

        let counts = engine.counts();
        assert_eq!(counts.pending, 0);
        assert_eq!(counts.completed, 2);
    }

    #[tokio::test]
    async fn test_status_update_rolls_back_on_failure() {
        let (engine, _api) = engine_with(MockApi {
            fail_mutations: true,
            ..Default::default()
        })
        .await;
        let before = engine.counts();

        let err = engine
            .update_task_status(1, "TASK-001", TaskStatus::Completed)
            .await
            .unwrap_err();
        assert!(err.is_remote());

        let dashboard = engine.dashboard();
        let task = dashboard
            .tasks
            .iter()
            .find(|t| t.task_id == "TASK-001")
            .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(engine.counts(), before);
    }

    #[tokio::test]
    async fn test_denied_mutation_makes_no_network_call() {
        let (engine, api) = engine_with(MockApi::default()).await;
        engine.gate.lock().set_scope(TeamScope::Team(3));
        let before = api.calls.load(Ordering::SeqCst);

        let err = engine
            .update_task_status(1, "TASK-001", TaskStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::PermissionDenied(_)));
        assert_eq!(api.calls.load(Ordering::SeqCst), before);

        // state untouched
        let task = engine.dashboard().tasks[0].clone();
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_assignee_reconciles_server_name() {
        let (engine, _api) = engine_with(MockApi::default()).await;
        engine.update_task_assignee(1, "TASK-001", Some(10)).await.unwrap();

        let dashboard = engine.dashboard();
        let task = dashboard
            .tasks
            .iter()
            .find(|t| t.task_id == "TASK-001")
            .unwrap();
        assert_eq!(task.assignee_id, Some(10));
        assert_eq!(task.assignee_name.as_deref(), Some("김철수"));
    }

    #[tokio::test]
    async fn test_assignee_rolls_back_id_and_name() {
        let (engine, _api) = engine_with(MockApi {
            fail_mutations: true,
            ..Default::default()
        })
        .await;

        engine
            .update_task_assignee(1, "TASK-001", Some(10))
            .await
            .unwrap_err();

        let dashboard = engine.dashboard();
        let task = dashboard
            .tasks
            .iter()
            .find(|t| t.task_id == "TASK-001")
            .unwrap();
        assert_eq!(task.assignee_id, None);
        assert_eq!(task.assignee_name, None);
    }

    #[tokio::test]
    async fn test_add_task_validates_before_network() {
        let (engine, api) = engine_with(MockApi::default()).await;
        let before = api.calls.load(Ordering::SeqCst);

        let err = engine
            .add_task(
                1,
                NewTask {
                    task_name: "   ".to_string(),
                    phase: String::new(),
                    due_date: None,
                    priority: "보통".to_string(),
                    status: "대기".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(api.calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn test_add_task_appends_and_recomputes() {
        let (engine, _api) = engine_with(MockApi::default()).await;
        let created = engine
            .add_task(
                1,
                NewTask {
                    task_name: "신규 업무".to_string(),
                    phase: "개발".to_string(),
                    due_date: None,
                    priority: "보통".to_string(),
                    status: "대기".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.task_name, "신규 업무");
        assert_eq!(engine.counts().total, 3);
        assert_eq!(engine.counts().pending, 2);
    }

    #[tokio::test]
    async fn test_note_not_applied_on_failure() {
        let (engine, _api) = engine_with(MockApi {
            fail_mutations: true,
            ..Default::default()
        })
        .await;

        engine.save_task_note(1, "TASK-001", "메모").await.unwrap_err();
        assert_eq!(engine.dashboard().tasks[0].note, None);
    }

    #[tokio::test]
    async fn test_attachment_confirm_then_apply() {
        let (engine, _api) = engine_with(MockApi::default()).await;
        engine
            .add_attachment(
                1,
                "TASK-001",
                Attachment {
                    filename: "계약서.pdf".to_string(),
                    url: "/files/1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(engine.dashboard().tasks[0].attachments.len(), 1);

        engine.remove_attachment(1, "TASK-001", "계약서.pdf").await.unwrap();
        assert!(engine.dashboard().tasks[0].attachments.is_empty());
    }

    #[tokio::test]
    async fn test_switch_team_loads_permissions_and_members() {
        let (engine, _api) = engine_with(MockApi {
            permissions: vec![caps::TASK_UPDATE.to_string()],
            ..Default::default()
        })
        .await;

        engine.switch_team(TeamScope::Team(3)).await.unwrap();
        assert!(engine.has_permission(caps::TASK_UPDATE));
        assert!(!engine.has_permission(caps::TASK_CREATE));
        assert_eq!(engine.members().len(), 1);
    }

    #[tokio::test]
    async fn test_switch_team_fail_closed() {
        let (engine, _api) = engine_with(MockApi {
            fail_permissions: true,
            permissions: vec![caps::TASK_UPDATE.to_string()],
            ..Default::default()
        })
        .await;

        engine.switch_team(TeamScope::Team(3)).await.unwrap();
        assert!(!engine.has_permission(caps::TASK_UPDATE));
    }

    #[tokio::test]
    async fn test_remove_task_recomputes() {
        let (engine, _api) = engine_with(MockApi::default()).await;
        assert!(engine.remove_task(1, "TASK-002"));
        assert!(!engine.remove_task(1, "TASK-002"));
        let counts = engine.counts();
        assert_eq!(counts.total, 1);
        assert_eq!(counts.completed, 0);
    }

    #[tokio::test]
    async fn test_save_contract_requires_result() {
        let (engine, _api) = engine_with(MockApi::default()).await;
        assert!(matches!(
            engine.save_contract().await.unwrap_err(),
            SyncError::Validation(_)
        ));

        engine.set_result(ExtractionResult::default());
        assert_eq!(engine.save_contract().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_export_noop_without_result() {
        let (engine, _api) = engine_with(MockApi::default()).await;
        assert!(engine.export_csv().is_none());
        assert!(engine.export_json().is_none());
        assert!(engine.export_doc().is_none());
    }

    #[tokio::test]
    async fn test_mention_suggestions_use_roster() {
        let (engine, _api) = engine_with(MockApi::default()).await;
        engine.switch_team(TeamScope::Team(3)).await.unwrap();

        let hits = engine.mention_suggestions("확인 부탁 @kim");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "kim@test.com");
        assert!(engine.mention_suggestions("no mention").is_empty());
    }
}
