use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{NotificationEvent, ResolvedContent, Thread};
use crate::resolve::{ResolveOptions, resolve};

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Everything a resolution depends on, reduced to a hashable key.
///
/// Threads are append-only and tombstones are never cleared, so the newest
/// comment id plus the tombstone count pins the thread snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub event_id: String,
    pub notified_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub thread_id: String,
    pub last_comment_id: Option<String>,
    pub tombstones: usize,
    pub viewer_id: String,
    pub options: ResolveOptions,
}

impl ResolutionKey {
    pub fn new(
        event: &NotificationEvent,
        thread: &Thread,
        viewer_id: &str,
        options: &ResolveOptions,
    ) -> Self {
        let last_comment_id = thread
            .comments
            .iter()
            .max_by(|left, right| left.chronological_key().cmp(&right.chronological_key()))
            .map(|comment| comment.id.clone());

        Self {
            event_id: event.id.clone(),
            notified_at: event.notified_at,
            read_at: event.read_at,
            thread_id: thread.id.clone(),
            last_comment_id,
            tombstones: thread
                .comments
                .iter()
                .filter(|comment| comment.is_deleted())
                .count(),
            viewer_id: viewer_id.to_string(),
            options: *options,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoizes successful resolutions for repeated renders. Failures are not
/// cached.
///
/// Holds at most one entry per notification: a newer key for the same event
/// (read, new comment, deletion) replaces the old one. Past `capacity`, the
/// oldest insertion is evicted.
#[derive(Debug)]
pub struct ResolutionCache {
    entries: HashMap<ResolutionKey, ResolvedContent>,
    order: VecDeque<ResolutionKey>,
    capacity: usize,
    stats: CacheStats,
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            stats: CacheStats::default(),
        }
    }

    pub fn get_or_resolve(
        &mut self,
        event: &NotificationEvent,
        thread: &Thread,
        viewer_id: &str,
        options: &ResolveOptions,
    ) -> Result<ResolvedContent> {
        let key = ResolutionKey::new(event, thread, viewer_id, options);
        if let Some(content) = self.entries.get(&key) {
            self.stats.hits += 1;
            return Ok(content.clone());
        }

        self.stats.misses += 1;
        let content = resolve(event, thread, viewer_id, options)?;
        self.insert(key, content.clone());
        Ok(content)
    }

    fn insert(&mut self, key: ResolutionKey, content: ResolvedContent) {
        let entries = &mut self.entries;
        self.order.retain(|existing| {
            let superseded = existing.event_id == key.event_id && existing.viewer_id == key.viewer_id;
            if superseded {
                entries.remove(existing);
            }
            !superseded
        });

        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, content);
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
