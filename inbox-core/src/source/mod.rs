use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use dirs::home_dir;

use crate::error::{InboxError, Result};
use crate::model::{NotificationEvent, RoomInfo, Thread};

pub mod fs;
pub mod memory;

pub trait ThreadSource {
    fn fetch_thread(&self, thread_id: &str) -> Result<Thread>;
}

pub trait RoomDirectory {
    /// Rooms without metadata are `Ok(None)`; callers fall back to the id.
    fn room_info(&self, room_id: &str) -> Result<Option<RoomInfo>>;
}

pub trait NotificationStore {
    fn notification(&self, notification_id: &str) -> Result<NotificationEvent>;

    /// Every notification, most recently notified first.
    fn notifications(&self) -> Result<Vec<NotificationEvent>>;

    /// Applies a read action. `read_at` never moves backwards; returns the
    /// stored event after the update.
    fn mark_read(&self, notification_id: &str, at: DateTime<Utc>) -> Result<NotificationEvent>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxRoots {
    pub data_root: PathBuf,
}

impl InboxRoots {
    pub fn from_env_or_home() -> Result<Self> {
        // Precedence:
        // 1) INBOX_HOME
        // 2) XDG_DATA_HOME/inbox
        // 3) ~/.local/share/inbox
        if let Some(root) = env::var_os("INBOX_HOME").filter(|path| !path.is_empty()) {
            return Ok(Self {
                data_root: PathBuf::from(root),
            });
        }

        if let Some(root) = env::var_os("XDG_DATA_HOME").filter(|path| !path.is_empty()) {
            return Ok(Self {
                data_root: PathBuf::from(root).join("inbox"),
            });
        }

        let home = home_dir().ok_or(InboxError::HomeDirectoryNotFound)?;
        Ok(Self {
            data_root: home.join(".local/share/inbox"),
        })
    }
}

pub(crate) fn sort_newest_first(events: &mut [NotificationEvent]) {
    events.sort_by(|left, right| {
        right
            .notified_at
            .cmp(&left.notified_at)
            .then_with(|| left.id.cmp(&right.id))
    });
}
