pub mod cache;
pub mod error;
pub mod history;
pub mod ids;
pub mod model;
pub mod render;
pub mod resolve;
pub mod service;
pub mod source;
pub mod summary;

pub use cache::{CacheStats, DEFAULT_CACHE_CAPACITY, ResolutionCache, ResolutionKey};
pub use error::{InboxError, Result};
pub use history::ThreadHistory;
pub use model::{
    Comment, CommentBlock, CommentBody, CommentInline, CommentsContent, MentionContent,
    NotificationEvent, ParticipantSummary, ResolvedContent, RoomInfo, Thread,
};
pub use render::{EnglishTitles, TitleFormatter, render_json, render_markdown, render_title};
pub use resolve::{ResolveOptions, resolve};
pub use service::{
    InboxView, ResolvedNotification, inbox_view_to_raw_json, mark_notification_read,
    notification_to_raw_json, render_inbox_markdown, render_notification_markdown,
    resolve_inbox, resolve_inbox_cached, resolve_notification,
};
pub use source::fs::FsInbox;
pub use source::memory::MemoryInbox;
pub use source::{InboxRoots, NotificationStore, RoomDirectory, ThreadSource};
pub use summary::{DEFAULT_MAX_VISIBLE_PARTICIPANTS, summarize};
