use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of entries kept by an [`ActivityLog`].
pub const ACTIVITY_LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ProductCreated,
    ContentScheduled,
    TrendDetected,
    CampaignsPaused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only activity feed bounded to the most recent entries.
///
/// Once full, each push evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(ACTIVITY_LOG_CAPACITY)
    }

    /// A log bounded to `capacity` entries (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, kind: ActivityKind, message: impl Into<String>) {
        self.push_at(kind, message, Utc::now());
    }

    pub fn push_at(&mut self, kind: ActivityKind, message: impl Into<String>, at: DateTime<Utc>) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityEntry {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            timestamp: at,
        });
    }

    /// The last `n` entries, oldest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<ActivityEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
