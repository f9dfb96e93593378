use tracing::{debug, warn};

use crate::error::{InboxError, Result};
use crate::history::ThreadHistory;
use crate::model::{
    Comment, CommentsContent, MentionContent, NotificationEvent, ResolvedContent, Thread,
};
use crate::summary::{DEFAULT_MAX_VISIBLE_PARTICIPANTS, summarize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolveOptions {
    pub max_visible_participants: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_visible_participants: DEFAULT_MAX_VISIBLE_PARTICIPANTS,
        }
    }
}

/// Classifies a thread notification for `viewer_id`.
///
/// A live comment by someone else that mentions the viewer always wins; the
/// newest one becomes the trigger. Otherwise every live comment by someone
/// else is aggregated. `unread` only looks at the event's own timestamps.
pub fn resolve(
    event: &NotificationEvent,
    thread: &Thread,
    viewer_id: &str,
    options: &ResolveOptions,
) -> Result<ResolvedContent> {
    if event.thread_id != thread.id {
        warn!(
            notification_id = %event.id,
            expected = %event.thread_id,
            actual = %thread.id,
            "notification resolved against the wrong thread"
        );
        return Err(InboxError::ThreadMismatch {
            notification_id: event.id.clone(),
            expected: event.thread_id.clone(),
            actual: thread.id.clone(),
        });
    }

    if let Some(stray) = thread
        .comments
        .iter()
        .find(|comment| comment.thread_id != thread.id)
    {
        warn!(
            notification_id = %event.id,
            comment_id = %stray.id,
            thread_id = %thread.id,
            "thread snapshot holds a comment from another thread"
        );
        return Err(InboxError::StrayComment {
            comment_id: stray.id.clone(),
            comment_thread_id: stray.thread_id.clone(),
            thread_id: thread.id.clone(),
        });
    }

    let history = ThreadHistory::new(thread);
    if !history.has_live_comments() {
        warn!(notification_id = %event.id, thread_id = %thread.id, "thread has no live comments");
        return Err(InboxError::EmptyThread {
            thread_id: thread.id.clone(),
        });
    }

    let unread = event.is_unread();
    let others = history.excluding_author(viewer_id);

    if let Some(trigger) = others
        .clone()
        .rev()
        .find(|comment| comment.body.mentions_user(viewer_id))
    {
        debug!(
            notification_id = %event.id,
            comment_id = %trigger.id,
            author_id = %trigger.author_id,
            unread,
            "resolved mention notification"
        );
        return Ok(ResolvedContent::Mention(MentionContent {
            comment: trigger.clone(),
            author_id: trigger.author_id.clone(),
            unread,
            effective_date: trigger.created_at,
        }));
    }

    let comments = others.cloned().collect::<Vec<Comment>>();
    let Some(latest) = comments.last() else {
        warn!(
            notification_id = %event.id,
            thread_id = %thread.id,
            "no mention and no comments from other users"
        );
        return Err(InboxError::UnclassifiableEvent {
            notification_id: event.id.clone(),
            thread_id: thread.id.clone(),
        });
    };
    let effective_date = latest.created_at;

    // newest comment first, so each author ranks by their latest activity
    let participants = summarize(
        comments.iter().rev().map(|comment| comment.author_id.as_str()),
        options.max_visible_participants,
    );

    debug!(
        notification_id = %event.id,
        comments = comments.len(),
        participants = participants.total(),
        unread,
        "resolved comments notification"
    );

    Ok(ResolvedContent::Comments(CommentsContent {
        comments,
        participants,
        unread,
        effective_date,
    }))
}
