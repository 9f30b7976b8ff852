//! Error types for sync operations
//!
//! Errors are classified by where they are caught:
//! - Validation / PermissionDenied: rejected locally, before any network call
//! - Remote / Parse / Http: the remote call failed; optimistic mutations
//!   roll back before surfacing these
//!
//! Nothing here is fatal. Every error is converted to a user-facing message
//! at the operation boundary and the local state is left valid (either
//! unmutated or rolled back).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    // Rejected before any network call
    #[error("{0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // Remote call failures
    #[error("Server error {status}: {detail}")]
    Remote { status: u16, detail: String },

    #[error("Malformed server response: {0}")]
    Parse(String),

    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Returns true if the failure happened at or past the remote boundary.
    ///
    /// Optimistic mutations roll back on these; local rejections
    /// (Validation, PermissionDenied) never mutate state in the first place.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SyncError::Remote { .. } | SyncError::Parse(_) | SyncError::Http(_)
        )
    }

    /// Get the message to surface to the user.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Validation(msg) => msg.clone(),
            SyncError::PermissionDenied(action) => {
                format!("You don't have permission to {}.", action)
            }
            SyncError::Remote { detail, .. } => detail.clone(),
            SyncError::Parse(_) => "The server returned an unexpected response.".to_string(),
            SyncError::Http(_) => "Network error. Check your connection and try again.".to_string(),
            SyncError::Url(_) => "Invalid server address.".to_string(),
            SyncError::Io(_) | SyncError::Json(_) => {
                "Failed to read or write local data.".to_string()
            }
        }
    }
}
