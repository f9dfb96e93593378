use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::{InboxError, Result};
use crate::model::{NotificationEvent, RoomInfo, Thread};
use crate::source::{NotificationStore, RoomDirectory, ThreadSource, sort_newest_first};

/// In-process inbox. Read actions are applied under the write lock, so
/// concurrent `mark_read` calls cannot move `read_at` backwards.
#[derive(Debug, Default)]
pub struct MemoryInbox {
    threads: HashMap<String, Thread>,
    rooms: HashMap<String, RoomInfo>,
    notifications: RwLock<HashMap<String, NotificationEvent>>,
}

impl MemoryInbox {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_thread(mut self, thread: Thread) -> Self {
        self.threads.insert(thread.id.clone(), thread);
        self
    }

    #[must_use]
    pub fn with_room(mut self, room: RoomInfo) -> Self {
        self.rooms.insert(room.id.clone(), room);
        self
    }

    #[must_use]
    pub fn with_notification(self, event: NotificationEvent) -> Self {
        let mut notifications = self
            .notifications
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        notifications.insert(event.id.clone(), event);
        Self {
            notifications: RwLock::new(notifications),
            ..self
        }
    }
}

fn not_found(kind: &'static str, id: &str) -> InboxError {
    InboxError::NotFound {
        kind,
        id: id.to_string(),
    }
}

impl ThreadSource for MemoryInbox {
    fn fetch_thread(&self, thread_id: &str) -> Result<Thread> {
        self.threads
            .get(thread_id)
            .cloned()
            .ok_or_else(|| not_found("thread", thread_id))
    }
}

impl RoomDirectory for MemoryInbox {
    fn room_info(&self, room_id: &str) -> Result<Option<RoomInfo>> {
        Ok(self.rooms.get(room_id).cloned())
    }
}

impl NotificationStore for MemoryInbox {
    fn notification(&self, notification_id: &str) -> Result<NotificationEvent> {
        let notifications = self
            .notifications
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        notifications
            .get(notification_id)
            .cloned()
            .ok_or_else(|| not_found("notification", notification_id))
    }

    fn notifications(&self) -> Result<Vec<NotificationEvent>> {
        let notifications = self
            .notifications
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut events = notifications.values().cloned().collect::<Vec<_>>();
        sort_newest_first(&mut events);
        Ok(events)
    }

    fn mark_read(&self, notification_id: &str, at: DateTime<Utc>) -> Result<NotificationEvent> {
        let mut notifications = self
            .notifications
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let event = notifications
            .get_mut(notification_id)
            .ok_or_else(|| not_found("notification", notification_id))?;
        event.mark_read(at);
        Ok(event.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::{Duration, TimeZone, Utc};

    use crate::model::NotificationEvent;
    use crate::source::NotificationStore;
    use crate::source::memory::MemoryInbox;

    #[test]
    fn concurrent_mark_read_keeps_latest_instant() {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().expect("valid instant");
        let inbox = Arc::new(MemoryInbox::new().with_notification(NotificationEvent {
            id: "in_1".to_string(),
            thread_id: "th_1".to_string(),
            notified_at: base,
            read_at: None,
        }));

        let handles = (0..16)
            .map(|offset| {
                let inbox = Arc::clone(&inbox);
                thread::spawn(move || {
                    inbox
                        .mark_read("in_1", base + Duration::seconds(offset))
                        .expect("mark");
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("join");
        }

        let event = inbox.notification("in_1").expect("event");
        assert_eq!(event.read_at, Some(base + Duration::seconds(15)));
    }

    #[test]
    fn missing_notification_is_not_found() {
        let err = MemoryInbox::new()
            .mark_read("in_404", Utc::now())
            .expect_err("must fail");
        assert!(format!("{err}").contains("notification not found: in_404"));
    }
}
