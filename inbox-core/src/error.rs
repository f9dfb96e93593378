use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InboxError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("thread has no live comments: {thread_id}")]
    EmptyThread { thread_id: String },

    #[error(
        "notification {notification_id} has neither a mention nor comments from other users in thread {thread_id}"
    )]
    UnclassifiableEvent {
        notification_id: String,
        thread_id: String,
    },

    #[error("notification {notification_id} references thread {expected}, got thread {actual}")]
    ThreadMismatch {
        notification_id: String,
        expected: String,
        actual: String,
    },

    #[error("comment {comment_id} belongs to thread {comment_thread_id}, not {thread_id}")]
    StrayComment {
        comment_id: String,
        comment_thread_id: String,
        thread_id: String,
    },

    #[error("timed out waiting for lock {path}")]
    LockTimeout { path: PathBuf },

    #[error("invalid {kind} id: {id}")]
    InvalidId { kind: &'static str, id: String },

    #[error("invalid mode: {0}")]
    InvalidMode(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("cannot determine home directory")]
    HomeDirectoryNotFound,

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, InboxError>;
