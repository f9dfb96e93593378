use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::cache::ResolutionCache;
use crate::error::{InboxError, Result};
use crate::model::{NotificationEvent, ResolvedContent, RoomInfo};
use crate::render::{TitleFormatter, render_markdown};
use crate::resolve::{ResolveOptions, resolve};
use crate::source::{NotificationStore, RoomDirectory, ThreadSource};

/// A resolved notification together with the records it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedNotification {
    pub notification: NotificationEvent,
    pub room_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomInfo>,
    pub content: ResolvedContent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InboxView {
    pub notifications: Vec<ResolvedNotification>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl InboxView {
    pub fn unread_count(&self) -> usize {
        self.notifications
            .iter()
            .filter(|item| item.content.unread())
            .count()
    }
}

fn resolve_event<S>(
    inbox: &S,
    event: NotificationEvent,
    viewer_id: &str,
    options: &ResolveOptions,
    cache: Option<&mut ResolutionCache>,
) -> Result<ResolvedNotification>
where
    S: ThreadSource + RoomDirectory,
{
    let thread = inbox.fetch_thread(&event.thread_id)?;
    let content = match cache {
        Some(cache) => cache.get_or_resolve(&event, &thread, viewer_id, options)?,
        None => resolve(&event, &thread, viewer_id, options)?,
    };
    let room = inbox.room_info(&thread.room_id)?;

    Ok(ResolvedNotification {
        notification: event,
        room_id: thread.room_id,
        room,
        content,
    })
}

pub fn resolve_notification<S>(
    inbox: &S,
    notification_id: &str,
    viewer_id: &str,
    options: &ResolveOptions,
) -> Result<ResolvedNotification>
where
    S: ThreadSource + RoomDirectory + NotificationStore,
{
    let event = inbox.notification(notification_id)?;
    resolve_event(inbox, event, viewer_id, options, None)
}

/// Resolves the whole inbox, newest first. A notification that fails to
/// resolve is dropped and reported in `warnings`.
pub fn resolve_inbox<S>(inbox: &S, viewer_id: &str, options: &ResolveOptions) -> Result<InboxView>
where
    S: ThreadSource + RoomDirectory + NotificationStore,
{
    resolve_inbox_with(inbox, viewer_id, options, None)
}

/// Like [`resolve_inbox`], reusing results from earlier passes. Meant for
/// callers that re-render the same inbox and keep `cache` between calls.
pub fn resolve_inbox_cached<S>(
    inbox: &S,
    viewer_id: &str,
    options: &ResolveOptions,
    cache: &mut ResolutionCache,
) -> Result<InboxView>
where
    S: ThreadSource + RoomDirectory + NotificationStore,
{
    resolve_inbox_with(inbox, viewer_id, options, Some(cache))
}

fn resolve_inbox_with<S>(
    inbox: &S,
    viewer_id: &str,
    options: &ResolveOptions,
    mut cache: Option<&mut ResolutionCache>,
) -> Result<InboxView>
where
    S: ThreadSource + RoomDirectory + NotificationStore,
{
    let mut view = InboxView::default();

    for event in inbox.notifications()? {
        let notification_id = event.id.clone();
        match resolve_event(inbox, event, viewer_id, options, cache.as_deref_mut()) {
            Ok(item) => view.notifications.push(item),
            Err(err) => {
                warn!(notification_id = %notification_id, error = %err, "skipping notification");
                view.warnings
                    .push(format!("skipped notification {notification_id}: {err}"));
            }
        }
    }

    Ok(view)
}

pub fn mark_notification_read<S>(
    inbox: &S,
    notification_id: &str,
    at: DateTime<Utc>,
) -> Result<NotificationEvent>
where
    S: NotificationStore,
{
    inbox.mark_read(notification_id, at)
}

pub fn render_notification_markdown(
    item: &ResolvedNotification,
    show_room: bool,
    formatter: &dyn TitleFormatter,
) -> String {
    let fallback = RoomInfo {
        id: item.room_id.clone(),
        name: None,
        url: None,
    };
    let room = show_room.then(|| item.room.as_ref().unwrap_or(&fallback));
    render_markdown(&item.content, room, formatter)
}

pub fn render_inbox_markdown(
    view: &InboxView,
    show_room: bool,
    formatter: &dyn TitleFormatter,
) -> String {
    let mut output = String::new();
    output.push_str("# Inbox\n\n");
    output.push_str(&format!(
        "- Notifications: `{}`\n",
        view.notifications.len()
    ));
    output.push_str(&format!("- Unread: `{}`\n\n", view.unread_count()));

    if !view.warnings.is_empty() {
        output.push_str("## Warnings\n\n");
        for warning in &view.warnings {
            output.push_str(&format!("- {warning}\n"));
        }
        output.push('\n');
    }

    if view.notifications.is_empty() {
        output.push_str("_No notifications found._\n");
        return output;
    }

    for item in &view.notifications {
        let markdown = render_notification_markdown(item, show_room, formatter);
        // nest each notification one heading level down
        for line in markdown.lines() {
            if line.starts_with('#') {
                output.push('#');
            }
            output.push_str(line);
            output.push('\n');
        }
    }

    output
}

pub fn notification_to_raw_json(item: &ResolvedNotification) -> Result<String> {
    to_raw_json(item)
}

pub fn inbox_view_to_raw_json(view: &InboxView) -> Result<String> {
    to_raw_json(view)
}

fn to_raw_json<T: Serialize>(value: &T) -> Result<String> {
    let mut raw = serde_json::to_string_pretty(value)
        .map_err(|err| InboxError::Serialization(err.to_string()))?;
    raw.push('\n');
    Ok(raw)
}
