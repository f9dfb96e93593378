use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBody {
    #[serde(default = "default_body_version")]
    pub version: u32,
    #[serde(default)]
    pub content: Vec<CommentBlock>,
}

fn default_body_version() -> u32 {
    1
}

impl Default for CommentBody {
    fn default() -> Self {
        Self {
            version: default_body_version(),
            content: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommentBlock {
    Paragraph { children: Vec<CommentInline> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommentInline {
    Text {
        text: String,
    },
    Mention {
        id: String,
    },
    Link {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl CommentBody {
    pub fn paragraph(children: Vec<CommentInline>) -> Self {
        Self {
            version: default_body_version(),
            content: vec![CommentBlock::Paragraph { children }],
        }
    }

    /// Mentioned user ids in document order, repeats included.
    pub fn mentions(&self) -> impl Iterator<Item = &str> {
        self.inlines().filter_map(|inline| match inline {
            CommentInline::Mention { id } => Some(id.as_str()),
            CommentInline::Text { .. } | CommentInline::Link { .. } => None,
        })
    }

    pub fn mentions_user(&self, user_id: &str) -> bool {
        self.mentions().any(|id| id == user_id)
    }

    pub fn to_plain_text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                CommentBlock::Paragraph { children } => children
                    .iter()
                    .map(|inline| match inline {
                        CommentInline::Text { text } => text.clone(),
                        CommentInline::Mention { id } => format!("@{id}"),
                        CommentInline::Link { url, text } => text.clone().unwrap_or_else(|| url.clone()),
                    })
                    .collect::<String>(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn inlines(&self) -> impl Iterator<Item = &CommentInline> {
        self.content.iter().flat_map(|block| match block {
            CommentBlock::Paragraph { children } => children.iter(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub thread_id: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    /// Tombstone. Deleted comments stay in the thread for ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: CommentBody,
}

impl Comment {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Total order within a thread: creation instant, then id.
    pub fn chronological_key(&self) -> (DateTime<Utc>, &str) {
        (self.created_at, self.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub room_id: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub id: String,
    pub thread_id: String,
    pub notified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl NotificationEvent {
    pub fn is_unread(&self) -> bool {
        match self.read_at {
            Some(read_at) => self.notified_at > read_at,
            None => true,
        }
    }

    /// Moves `read_at` forward to `at`. Earlier instants are ignored so the
    /// read marker never regresses. Returns whether anything changed.
    pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        match self.read_at {
            Some(read_at) if read_at >= at => false,
            _ => {
                self.read_at = Some(at);
                true
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RoomInfo {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    /// Most recent first, no repeats.
    pub visible: Vec<String>,
    /// Distinct participants left out of `visible`.
    pub remainder: usize,
}

impl ParticipantSummary {
    pub fn total(&self) -> usize {
        self.visible.len() + self.remainder
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentsContent {
    /// Oldest first.
    pub comments: Vec<Comment>,
    pub participants: ParticipantSummary,
    pub unread: bool,
    pub effective_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionContent {
    pub comment: Comment,
    pub author_id: String,
    pub unread: bool,
    pub effective_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedContent {
    Comments(CommentsContent),
    Mention(MentionContent),
}

impl ResolvedContent {
    pub fn unread(&self) -> bool {
        match self {
            Self::Comments(content) => content.unread,
            Self::Mention(content) => content.unread,
        }
    }

    pub fn effective_date(&self) -> DateTime<Utc> {
        match self {
            Self::Comments(content) => content.effective_date,
            Self::Mention(content) => content.effective_date,
        }
    }

    pub fn comments(&self) -> &[Comment] {
        match self {
            Self::Comments(content) => &content.comments,
            Self::Mention(content) => std::slice::from_ref(&content.comment),
        }
    }

    /// The comment a reader lands on when opening the notification.
    pub fn target_comment_id(&self) -> &str {
        match self {
            Self::Comments(content) => content
                .comments
                .last()
                .map_or("", |comment| comment.id.as_str()),
            Self::Mention(content) => &content.comment.id,
        }
    }

    pub fn author_ids(&self) -> Vec<&str> {
        match self {
            Self::Comments(content) => content
                .participants
                .visible
                .iter()
                .map(String::as_str)
                .collect(),
            Self::Mention(content) => vec![content.author_id.as_str()],
        }
    }
}
