use chrono::SecondsFormat;

use crate::error::{InboxError, Result};
use crate::model::{ResolvedContent, RoomInfo};

/// Injectable wording for notification titles.
pub trait TitleFormatter {
    fn comments_title(&self, names: &[&str], remainder: usize, room: Option<&str>) -> String;

    fn mention_title(&self, author: &str, room: Option<&str>) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTitles;

impl EnglishTitles {
    fn list(names: &[&str], remainder: usize) -> String {
        let mut parts = names.iter().map(ToString::to_string).collect::<Vec<_>>();
        match remainder {
            0 => {}
            1 => parts.push("1 other".to_string()),
            n => parts.push(format!("{n} others")),
        }

        match parts.as_slice() {
            [] => "Someone".to_string(),
            [only] => only.clone(),
            [head @ .., last] => format!("{} and {last}", head.join(", ")),
        }
    }

    fn in_room(room: Option<&str>) -> String {
        room.map(|room| format!(" in {room}")).unwrap_or_default()
    }
}

impl TitleFormatter for EnglishTitles {
    fn comments_title(&self, names: &[&str], remainder: usize, room: Option<&str>) -> String {
        format!(
            "{} commented{}",
            Self::list(names, remainder),
            Self::in_room(room)
        )
    }

    fn mention_title(&self, author: &str, room: Option<&str>) -> String {
        format!("{author} mentioned you{}", Self::in_room(room))
    }
}

pub fn render_title(
    content: &ResolvedContent,
    room: Option<&RoomInfo>,
    formatter: &dyn TitleFormatter,
) -> String {
    let room = room.map(RoomInfo::display_name);
    match content {
        ResolvedContent::Comments(comments) => formatter.comments_title(
            &content.author_ids(),
            comments.participants.remainder,
            room,
        ),
        ResolvedContent::Mention(mention) => formatter.mention_title(&mention.author_id, room),
    }
}

pub fn render_markdown(
    content: &ResolvedContent,
    room: Option<&RoomInfo>,
    formatter: &dyn TitleFormatter,
) -> String {
    let kind = match content {
        ResolvedContent::Comments(_) => "comments",
        ResolvedContent::Mention(_) => "mention",
    };

    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", render_title(content, room, formatter)));
    output.push_str(&format!("- Kind: `{kind}`\n"));
    output.push_str(&format!(
        "- Date: `{}`\n",
        content
            .effective_date()
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    output.push_str(&format!(
        "- Status: `{}`\n",
        if content.unread() { "unread" } else { "read" }
    ));
    if let Some(url) = room.and_then(|room| room.url.as_deref()) {
        output.push_str(&format!("- Room: <{url}>\n"));
    }
    output.push_str(&format!("- Comment: `{}`\n\n", content.target_comment_id()));

    let comments = content.comments();
    let show_headers = comments.len() > 1;
    for (idx, comment) in comments.iter().enumerate() {
        if show_headers {
            output.push_str(&format!("## {}. {}\n\n", idx + 1, comment.author_id));
        }
        let text = comment.body.to_plain_text();
        let text = text.trim();
        if text.is_empty() {
            output.push_str("_Empty comment._");
        } else {
            output.push_str(text);
        }
        output.push_str("\n\n");
    }

    output
}

pub fn render_json(content: &ResolvedContent) -> Result<String> {
    let mut raw = serde_json::to_string_pretty(content)
        .map_err(|err| InboxError::Serialization(err.to_string()))?;
    raw.push('\n');
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::model::{
        Comment, CommentBody, CommentInline, CommentsContent, MentionContent, ParticipantSummary,
        ResolvedContent, RoomInfo,
    };
    use crate::render::{EnglishTitles, TitleFormatter, render_json, render_markdown};

    fn comment(id: &str, author: &str, text: &str) -> Comment {
        Comment {
            id: id.to_string(),
            thread_id: "th_1".to_string(),
            author_id: author.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).single().expect("valid instant"),
            edited_at: None,
            deleted_at: None,
            body: CommentBody::paragraph(vec![CommentInline::Text {
                text: text.to_string(),
            }]),
        }
    }

    fn room() -> RoomInfo {
        RoomInfo {
            id: "design".to_string(),
            name: Some("Design review".to_string()),
            url: None,
        }
    }

    #[test]
    fn english_lists_names_and_remainder() {
        let titles = EnglishTitles;
        assert_eq!(titles.comments_title(&["alice"], 0, None), "alice commented");
        assert_eq!(
            titles.comments_title(&["alice", "bob"], 0, Some("Design")),
            "alice and bob commented in Design"
        );
        assert_eq!(
            titles.comments_title(&["e", "d", "c"], 2, None),
            "e, d, c and 2 others commented"
        );
        assert_eq!(
            titles.comments_title(&["alice"], 1, None),
            "alice and 1 other commented"
        );
        assert_eq!(titles.comments_title(&[], 4, None), "4 others commented");
        assert_eq!(
            titles.mention_title("yara", Some("Design")),
            "yara mentioned you in Design"
        );
    }

    #[test]
    fn comments_markdown_has_headers_for_each_comment() {
        let content = ResolvedContent::Comments(CommentsContent {
            comments: vec![comment("cm_1", "alice", "first"), comment("cm_2", "bob", "second")],
            participants: ParticipantSummary {
                visible: vec!["bob".to_string(), "alice".to_string()],
                remainder: 0,
            },
            unread: true,
            effective_date: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).single().expect("valid instant"),
        });

        let markdown = render_markdown(&content, Some(&room()), &EnglishTitles);
        assert!(markdown.starts_with("# bob and alice commented in Design review\n"));
        assert!(markdown.contains("- Kind: `comments`"));
        assert!(markdown.contains("- Date: `2026-03-01T10:00:00Z`"));
        assert!(markdown.contains("- Status: `unread`"));
        assert!(markdown.contains("- Comment: `cm_2`"));
        assert!(markdown.contains("## 1. alice\n\nfirst"));
        assert!(markdown.contains("## 2. bob\n\nsecond"));
    }

    #[test]
    fn mention_markdown_skips_headers() {
        let content = ResolvedContent::Mention(MentionContent {
            comment: comment("cm_9", "yara", "look here"),
            author_id: "yara".to_string(),
            unread: false,
            effective_date: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).single().expect("valid instant"),
        });

        let markdown = render_markdown(&content, None, &EnglishTitles);
        assert!(markdown.starts_with("# yara mentioned you\n"));
        assert!(markdown.contains("- Status: `read`"));
        assert!(!markdown.contains("## "));
        assert!(markdown.contains("look here"));
    }

    #[test]
    fn json_is_tagged_by_kind() {
        let content = ResolvedContent::Mention(MentionContent {
            comment: comment("cm_9", "yara", "look here"),
            author_id: "yara".to_string(),
            unread: true,
            effective_date: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).single().expect("valid instant"),
        });

        let raw = render_json(&content).expect("json");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("parse");
        assert_eq!(value["kind"], "mention");
        assert_eq!(value["author_id"], "yara");
        assert_eq!(value["comment"]["id"], "cm_9");
    }
}
