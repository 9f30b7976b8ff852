//! contask — client-side sync and export engine for a contract/task
//! collaboration service.
//!
//! The engine holds an authoritative-but-stale local copy of contract, task,
//! and dashboard state; applies optimistic mutations against the remote API
//! with rollback on failure; recomputes derived aggregates after every
//! structural change; gates mutations on team-scoped permissions; polls for
//! unread notifications; and produces deterministic export artifacts (CSV,
//! JSON, Word-compatible HTML).
//!
//! The HTTP server, document extraction, and auth/session management are
//! external collaborators reached through the [`api::RemoteApi`] seam.

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod mentions;
pub mod notifications;
pub mod permissions;
pub mod stats;
pub mod types;

pub use api::{HttpApi, RemoteApi};
pub use config::ClientConfig;
pub use engine::SyncEngine;
pub use error::SyncError;
pub use export::ExportArtifact;
pub use permissions::PermissionGate;
pub use types::{Dashboard, ExtractionResult, Task, TaskPriority, TaskStatus, TeamScope};

/// Initialize env_logger once, for binaries and examples embedding the engine.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
