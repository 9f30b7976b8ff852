//! Session-local caches: contract color assignment, reaction map, and the
//! filtered/ordered task views served to the UI without re-fetching.
//!
//! The color and reaction maps persist across sessions in
//! `~/.contask/cache.json` (last write wins — no cross-session conflict
//! resolution). Color assignment is memoized: the first palette entry
//! computed for a name stays fixed for the session.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{Task, TaskStatus};

/// Fixed render palette. Hash-assigned per contract name.
pub const PALETTE: [&str; 8] = [
    "#3b82f6", "#22c55e", "#a855f7", "#f97316", "#14b8a6", "#ec4899", "#6366f1", "#eab308",
];

/// Order-dependent 31-multiplier hash, reduced to a palette index.
pub fn color_index(name: &str) -> usize {
    let mut hash: i32 = 0;
    for ch in name.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(ch as i32);
    }
    hash.unsigned_abs() as usize % PALETTE.len()
}

/// Persisted per-session caches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionCache {
    #[serde(default)]
    colors: HashMap<String, usize>,
    /// Comment id → emoji reactions, append-only within a session.
    #[serde(default)]
    reactions: HashMap<String, Vec<String>>,
}

impl SessionCache {
    /// Palette entry for a contract name, stable for the session.
    pub fn color_for(&mut self, name: &str) -> &'static str {
        let index = *self
            .colors
            .entry(name.to_string())
            .or_insert_with(|| color_index(name));
        PALETTE[index % PALETTE.len()]
    }

    pub fn add_reaction(&mut self, comment_id: &str, emoji: &str) {
        self.reactions
            .entry(comment_id.to_string())
            .or_default()
            .push(emoji.to_string());
    }

    pub fn reactions_for(&self, comment_id: &str) -> &[String] {
        self.reactions
            .get(comment_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Load from disk; a missing file is a fresh cache, a corrupt file is
    /// discarded rather than surfaced.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Discarding corrupt session cache: {}", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk, last write wins.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("Failed to create cache dir: {}", e))?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Serialize error: {}", e))?;
        fs::write(path, content).map_err(|e| format!("Write error: {}", e))
    }
}

/// Default cache location (~/.contask/cache.json).
pub fn cache_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".contask")
        .join("cache.json")
}

// ============================================================================
// Filtering & reorder
// ============================================================================

/// UI status buckets for the dashboard filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    InProgress,
    Completed,
}

impl StatusFilter {
    fn matches(&self, status: &TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => *status == TaskStatus::Pending,
            StatusFilter::InProgress => *status == TaskStatus::InProgress,
            StatusFilter::Completed => *status == TaskStatus::Completed,
        }
    }
}

/// Case-insensitive substring filter over name, contract name, and phase,
/// combined with the status bucket.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    filter: StatusFilter,
    search: &str,
) -> Vec<&'a Task> {
    let term = search.trim().to_lowercase();
    tasks
        .iter()
        .filter(|t| filter.matches(&t.status))
        .filter(|t| {
            if term.is_empty() {
                return true;
            }
            t.task_name.to_lowercase().contains(&term)
                || t.contract_name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&term))
                || t.phase.to_lowercase().contains(&term)
        })
        .collect()
}

/// Drag-reorder is only valid against the unfiltered, unsearched view —
/// otherwise the visible indices don't line up with the underlying array.
pub fn can_drag(filter: StatusFilter, search: &str) -> bool {
    filter == StatusFilter::All && search.trim().is_empty()
}

/// Move the task at `from` to position `to`. Rejected (returns false, order
/// untouched) when a filter or search is active or an index is out of range.
pub fn reorder(
    tasks: &mut Vec<Task>,
    from: usize,
    to: usize,
    filter: StatusFilter,
    search: &str,
) -> bool {
    if !can_drag(filter, search) {
        return false;
    }
    if from >= tasks.len() || to >= tasks.len() {
        return false;
    }
    let task = tasks.remove(from);
    tasks.insert(to, task);
    true
}
