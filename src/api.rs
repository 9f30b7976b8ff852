//! Remote API client.
//!
//! `RemoteApi` is the seam between the sync engine and the wire: production
//! uses [`HttpApi`] (reqwest against the contract server), tests inject mock
//! implementations. Mutation endpoints respond with a non-2xx status and a
//! `{detail}` body on failure; `detail` may be a string or a structured
//! object (serialized for display).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ClientConfig;
use crate::error::SyncError;
use crate::types::{
    Attachment, ExtractionResult, Member, NotificationPage, SessionStatus, Task, TaskStatus,
    TeamScope,
};

// ============================================================================
// Wire types
// ============================================================================

/// Dashboard summary payload. Counts come precomputed, but the engine
/// recomputes them locally anyway — the task list is authoritative.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub total_contracts: usize,
    #[serde(default)]
    pub total_tasks: usize,
    #[serde(default)]
    pub pending_tasks: usize,
    #[serde(default)]
    pub in_progress_tasks: usize,
    #[serde(default)]
    pub completed_tasks: usize,
}

/// Fields for a task-create request; the server assigns the task id.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub task_name: String,
    pub phase: String,
    pub due_date: Option<String>,
    pub priority: String,
    pub status: String,
}

/// Server-resolved assignee values returned by the assignee endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AssigneeUpdate {
    pub assignee_id: Option<i64>,
    pub assignee_name: Option<String>,
}

/// Error body shape: `{detail: string | object}`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub detail: serde_json::Value,
}

impl ApiErrorBody {
    /// Flatten the detail for display: strings pass through, structured
    /// objects are re-serialized.
    pub fn detail_message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// Trait
// ============================================================================

#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn session_status(&self) -> Result<SessionStatus, SyncError>;

    async fn dashboard_summary(&self, scope: TeamScope) -> Result<DashboardSummary, SyncError>;

    async fn update_task_status(
        &self,
        contract_id: i64,
        task_id: &str,
        status: &TaskStatus,
    ) -> Result<(), SyncError>;

    async fn update_task_assignee(
        &self,
        contract_id: i64,
        task_id: &str,
        assignee_id: Option<i64>,
    ) -> Result<AssigneeUpdate, SyncError>;

    async fn save_task_note(
        &self,
        contract_id: i64,
        task_id: &str,
        note: &str,
    ) -> Result<(), SyncError>;

    async fn add_task(&self, contract_id: i64, task: &NewTask) -> Result<Task, SyncError>;

    async fn add_attachment(
        &self,
        contract_id: i64,
        task_id: &str,
        attachment: &Attachment,
    ) -> Result<(), SyncError>;

    async fn remove_attachment(
        &self,
        contract_id: i64,
        task_id: &str,
        filename: &str,
    ) -> Result<(), SyncError>;

    /// Persist the extraction working copy; returns the contract id.
    async fn save_contract(&self, result: &ExtractionResult) -> Result<i64, SyncError>;

    async fn team_members(&self, team_id: i64) -> Result<Vec<Member>, SyncError>;

    async fn team_permissions(&self, team_id: i64) -> Result<Vec<String>, SyncError>;

    async fn unread_count(&self) -> Result<u64, SyncError>;

    async fn list_notifications(&self, page: u32, size: u32)
        -> Result<NotificationPage, SyncError>;

    async fn mark_read(&self, notification_id: i64) -> Result<(), SyncError>;

    async fn mark_all_read(&self) -> Result<(), SyncError>;
}

// ============================================================================
// HTTP implementation
// ============================================================================

pub struct HttpApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Result<Self, SyncError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base: Url::parse(&base)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        Ok(self.base.join(path)?)
    }

    /// Convert a non-success response into `SyncError::Remote`, reading the
    /// `{detail}` body (string or object) for the message.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, SyncError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) => parsed.detail_message(),
            Err(_) if body.trim().is_empty() => format!("HTTP {}", code),
            Err(_) => body,
        };
        Err(SyncError::Remote {
            status: code,
            detail,
        })
    }

    /// Parse a success body; malformed JSON is a `Parse` error, handled the
    /// same as any remote failure by callers.
    async fn read_json<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, SyncError> {
        resp.json::<T>()
            .await
            .map_err(|e| SyncError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn session_status(&self) -> Result<SessionStatus, SyncError> {
        let resp = self
            .client
            .get(self.endpoint("api/v1/auth/me")?)
            .send()
            .await?;
        Self::read_json(Self::check(resp).await?).await
    }

    async fn dashboard_summary(&self, scope: TeamScope) -> Result<DashboardSummary, SyncError> {
        let mut url = self.endpoint("api/v1/contracts/dashboard/summary")?;
        if let Some(team_id) = scope.team_id() {
            url.query_pairs_mut()
                .append_pair("team_id", &team_id.to_string());
        }
        let resp = self.client.get(url).send().await?;
        Self::read_json(Self::check(resp).await?).await
    }

    async fn update_task_status(
        &self,
        contract_id: i64,
        task_id: &str,
        status: &TaskStatus,
    ) -> Result<(), SyncError> {
        let resp = self
            .client
            .patch(self.endpoint(&format!("api/v1/contracts/{}/tasks/status", contract_id))?)
            .json(&serde_json::json!({
                "task_id": task_id,
                "status": status.as_str(),
            }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn update_task_assignee(
        &self,
        contract_id: i64,
        task_id: &str,
        assignee_id: Option<i64>,
    ) -> Result<AssigneeUpdate, SyncError> {
        let resp = self
            .client
            .patch(self.endpoint(&format!("api/v1/contracts/{}/tasks/assignee", contract_id))?)
            .json(&serde_json::json!({
                "task_id": task_id,
                "assignee_id": assignee_id,
            }))
            .send()
            .await?;
        Self::read_json(Self::check(resp).await?).await
    }

    async fn save_task_note(
        &self,
        contract_id: i64,
        task_id: &str,
        note: &str,
    ) -> Result<(), SyncError> {
        let resp = self
            .client
            .patch(self.endpoint(&format!("api/v1/contracts/{}/tasks/note", contract_id))?)
            .json(&serde_json::json!({
                "task_id": task_id,
                "note": note,
            }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn add_task(&self, contract_id: i64, task: &NewTask) -> Result<Task, SyncError> {
        #[derive(Deserialize)]
        struct AddTaskResponse {
            task: Task,
        }
        let resp = self
            .client
            .post(self.endpoint(&format!("api/v1/contracts/{}/tasks", contract_id))?)
            .json(task)
            .send()
            .await?;
        let body: AddTaskResponse = Self::read_json(Self::check(resp).await?).await?;
        Ok(body.task)
    }

    async fn add_attachment(
        &self,
        contract_id: i64,
        task_id: &str,
        attachment: &Attachment,
    ) -> Result<(), SyncError> {
        let resp = self
            .client
            .post(self.endpoint(&format!(
                "api/v1/contracts/{}/tasks/{}/attachments",
                contract_id, task_id
            ))?)
            .json(attachment)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn remove_attachment(
        &self,
        contract_id: i64,
        task_id: &str,
        filename: &str,
    ) -> Result<(), SyncError> {
        let mut url = self.endpoint(&format!(
            "api/v1/contracts/{}/tasks/{}/attachments",
            contract_id, task_id
        ))?;
        url.query_pairs_mut().append_pair("filename", filename);
        let resp = self.client.delete(url).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn save_contract(&self, result: &ExtractionResult) -> Result<i64, SyncError> {
        #[derive(Deserialize)]
        struct SaveResponse {
            id: i64,
        }
        let resp = self
            .client
            .post(self.endpoint("api/v1/contracts/save")?)
            .json(result)
            .send()
            .await?;
        let body: SaveResponse = Self::read_json(Self::check(resp).await?).await?;
        Ok(body.id)
    }

    async fn team_members(&self, team_id: i64) -> Result<Vec<Member>, SyncError> {
        #[derive(Deserialize)]
        struct MembersResponse {
            #[serde(default)]
            members: Vec<Member>,
        }
        let resp = self
            .client
            .get(self.endpoint(&format!("api/v1/teams/{}/members", team_id))?)
            .send()
            .await?;
        let body: MembersResponse = Self::read_json(Self::check(resp).await?).await?;
        Ok(body.members)
    }

    async fn team_permissions(&self, team_id: i64) -> Result<Vec<String>, SyncError> {
        #[derive(Deserialize)]
        struct PermissionsResponse {
            #[serde(default)]
            permissions: Vec<String>,
        }
        let resp = self
            .client
            .get(self.endpoint(&format!("api/v1/teams/{}/permissions", team_id))?)
            .send()
            .await?;
        let body: PermissionsResponse = Self::read_json(Self::check(resp).await?).await?;
        Ok(body.permissions)
    }

    async fn unread_count(&self) -> Result<u64, SyncError> {
        #[derive(Deserialize)]
        struct UnreadResponse {
            unread_count: u64,
        }
        let resp = self
            .client
            .get(self.endpoint("api/v1/notifications/unread-count")?)
            .send()
            .await?;
        let body: UnreadResponse = Self::read_json(Self::check(resp).await?).await?;
        Ok(body.unread_count)
    }

    async fn list_notifications(
        &self,
        page: u32,
        size: u32,
    ) -> Result<NotificationPage, SyncError> {
        let mut url = self.endpoint("api/v1/notifications")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        let resp = self.client.get(url).send().await?;
        Self::read_json(Self::check(resp).await?).await
    }

    async fn mark_read(&self, notification_id: i64) -> Result<(), SyncError> {
        let resp = self
            .client
            .patch(self.endpoint(&format!("api/v1/notifications/{}/read", notification_id))?)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<(), SyncError> {
        let resp = self
            .client
            .patch(self.endpoint("api/v1/notifications/read-all")?)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}
