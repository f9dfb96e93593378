use std::collections::HashMap;

use crate::error::{InboxError, Result};
use crate::model::{Comment, Thread};

/// Read-only view over one thread snapshot, ordered by creation time.
///
/// Tombstoned comments stay addressable through [`ThreadHistory::get`] but
/// are skipped by every iterator.
#[derive(Debug, Clone)]
pub struct ThreadHistory<'a> {
    ordered: Vec<&'a Comment>,
    by_id: HashMap<&'a str, &'a Comment>,
}

impl<'a> ThreadHistory<'a> {
    pub fn new(thread: &'a Thread) -> Self {
        let mut ordered = thread.comments.iter().collect::<Vec<_>>();
        ordered.sort_by(|left, right| left.chronological_key().cmp(&right.chronological_key()));

        let by_id = thread
            .comments
            .iter()
            .map(|comment| (comment.id.as_str(), comment))
            .collect();

        Self { ordered, by_id }
    }

    pub fn get(&self, comment_id: &str) -> Result<&'a Comment> {
        self.by_id
            .get(comment_id)
            .copied()
            .ok_or_else(|| InboxError::NotFound {
                kind: "comment",
                id: comment_id.to_string(),
            })
    }

    /// Non-tombstoned comments, oldest first. Call again to restart.
    pub fn live(&self) -> impl DoubleEndedIterator<Item = &'a Comment> + Clone + '_ {
        self.ordered
            .iter()
            .copied()
            .filter(|comment| !comment.is_deleted())
    }

    pub fn by_author<'s>(
        &'s self,
        author_id: &'s str,
    ) -> impl DoubleEndedIterator<Item = &'a Comment> + Clone + 's {
        self.live()
            .filter(move |comment| comment.author_id == author_id)
    }

    pub fn excluding_author<'s>(
        &'s self,
        author_id: &'s str,
    ) -> impl DoubleEndedIterator<Item = &'a Comment> + Clone + 's {
        self.live()
            .filter(move |comment| comment.author_id != author_id)
    }

    pub fn has_live_comments(&self) -> bool {
        self.live().next().is_some()
    }

    pub fn latest(&self) -> Option<&'a Comment> {
        self.live().next_back()
    }
}
