//! Notification state and the unread-count poller.
//!
//! The poller is a plain tokio loop: sleep one period, stop if the session
//! ended, otherwise refresh the unread count. `mark_read` is optimistic with
//! no rollback path — a stray failure leaves the counter off by one until the
//! next wholesale load, which is accepted as low-risk.

use std::sync::Arc;

use crate::engine::SyncEngine;
use crate::error::SyncError;
use crate::types::Notification;

#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    pub items: Vec<Notification>,
    pub unread: u64,
}

/// Poll the unread count until logout.
///
/// Started once per authenticated session; observes `is_authenticated` each
/// tick and exits when it goes false. Poll failures are logged and skipped.
pub async fn run_unread_poller(engine: Arc<SyncEngine>) {
    let interval = engine.poll_interval();
    loop {
        tokio::time::sleep(interval).await;
        if !engine.is_authenticated() {
            log::debug!("Unread poller stopping: session ended");
            break;
        }
        if let Err(e) = engine.refresh_unread().await {
            log::warn!("Unread count poll failed: {}", e);
        }
    }
}

impl SyncEngine {
    /// Fetch the unread count and replace the local counter.
    pub async fn refresh_unread(&self) -> Result<u64, SyncError> {
        let count = self.api().unread_count().await?;
        self.notification_state.lock().unread = count;
        Ok(count)
    }

    /// Replace the full notification list and unread count from the server.
    pub async fn load_notifications(&self, page: u32, size: u32) -> Result<(), SyncError> {
        let fetched = self.api().list_notifications(page, size).await?;
        let mut state = self.notification_state.lock();
        state.items = fetched.items;
        state.unread = fetched.unread_count;
        Ok(())
    }

    /// Optimistically mark one notification read: flip the flag and decrement
    /// the counter (floored at zero) before the server confirms.
    pub async fn mark_read(&self, notification_id: i64) -> Result<(), SyncError> {
        {
            let mut state = self.notification_state.lock();
            if let Some(item) = state.items.iter_mut().find(|n| n.id == notification_id) {
                if !item.is_read {
                    item.is_read = true;
                    state.unread = state.unread.saturating_sub(1);
                }
            } else {
                // Count-only view (badge without the list loaded): still decrement.
                state.unread = state.unread.saturating_sub(1);
            }
        }
        self.api().mark_read(notification_id).await
    }

    /// Mark everything read locally and zero the counter.
    pub async fn mark_all_read(&self) -> Result<(), SyncError> {
        {
            let mut state = self.notification_state.lock();
            for item in &mut state.items {
                item.is_read = true;
            }
            state.unread = 0;
        }
        self.api().mark_all_read().await
    }

    pub fn unread_count(&self) -> u64 {
        self.notification_state.lock().unread
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notification_state.lock().items.clone()
    }
}
