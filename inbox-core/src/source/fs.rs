use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{InboxError, Result};
use crate::ids::validate_storage_id;
use crate::model::{NotificationEvent, RoomInfo, Thread};
use crate::source::{NotificationStore, RoomDirectory, ThreadSource, sort_newest_first};

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY: Duration = Duration::from_millis(2);

/// Inbox snapshot stored as one JSON document per record:
/// `threads/<id>.json`, `rooms/<id>.json`, `notifications/<id>.json`.
#[derive(Debug, Clone)]
pub struct FsInbox {
    root: PathBuf,
}

impl FsInbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn threads_root(&self) -> PathBuf {
        self.root.join("threads")
    }

    fn rooms_root(&self) -> PathBuf {
        self.root.join("rooms")
    }

    fn notifications_root(&self) -> PathBuf {
        self.root.join("notifications")
    }

    fn record_path(dir: &Path, kind: &'static str, id: &str) -> Result<PathBuf> {
        validate_storage_id(kind, id)?;
        Ok(dir.join(format!("{id}.json")))
    }

    fn is_record_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "json")
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|source| InboxError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| InboxError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes through a sibling temp file and renames it over `path`, so
/// readers see either the old record or the new one.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut raw = serde_json::to_string_pretty(value)
        .map_err(|err| InboxError::Serialization(err.to_string()))?;
    raw.push('\n');

    let io_error = |source: io::Error| InboxError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(raw.as_bytes()).map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}

/// Exclusive `<record>.lock` file held for one read-modify-write.
/// Works across threads and processes sharing the inbox root.
struct RecordLock {
    path: PathBuf,
}

impl RecordLock {
    fn acquire(record: &Path) -> Result<Self> {
        let path = record.with_extension("json.lock");
        let started = Instant::now();

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    if started.elapsed() >= LOCK_TIMEOUT {
                        return Err(InboxError::LockTimeout { path });
                    }
                    thread::sleep(LOCK_RETRY);
                }
                Err(source) => return Err(InboxError::Io { path, source }),
            }
        }
    }
}

impl Drop for RecordLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn read_record<T: DeserializeOwned>(path: &Path, kind: &'static str, id: &str) -> Result<T> {
    if !path.exists() {
        return Err(InboxError::NotFound {
            kind,
            id: id.to_string(),
        });
    }
    read_json(path)
}

impl ThreadSource for FsInbox {
    fn fetch_thread(&self, thread_id: &str) -> Result<Thread> {
        let path = Self::record_path(&self.threads_root(), "thread", thread_id)?;
        let thread: Thread = read_record(&path, "thread", thread_id)?;
        debug!(thread_id, comments = thread.comments.len(), "loaded thread");
        Ok(thread)
    }
}

impl RoomDirectory for FsInbox {
    fn room_info(&self, room_id: &str) -> Result<Option<RoomInfo>> {
        let path = Self::record_path(&self.rooms_root(), "room", room_id)?;
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }
}

impl NotificationStore for FsInbox {
    fn notification(&self, notification_id: &str) -> Result<NotificationEvent> {
        let path =
            Self::record_path(&self.notifications_root(), "notification", notification_id)?;
        read_record(&path, "notification", notification_id)
    }

    fn notifications(&self) -> Result<Vec<NotificationEvent>> {
        let root = self.notifications_root();
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut events = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| Self::is_record_file(path))
            .map(|path| read_json::<NotificationEvent>(&path))
            .collect::<Result<Vec<_>>>()?;

        sort_newest_first(&mut events);
        Ok(events)
    }

    fn mark_read(&self, notification_id: &str, at: DateTime<Utc>) -> Result<NotificationEvent> {
        let path =
            Self::record_path(&self.notifications_root(), "notification", notification_id)?;
        if !path.exists() {
            return Err(InboxError::NotFound {
                kind: "notification",
                id: notification_id.to_string(),
            });
        }

        let _lock = RecordLock::acquire(&path)?;
        let mut event: NotificationEvent = read_record(&path, "notification", notification_id)?;

        if event.mark_read(at) {
            write_json(&path, &event)?;
            debug!(notification_id, read_at = %at, "marked notification as read");
        }
        Ok(event)
    }
}
