use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Social platform a content piece is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    TikTok,
    Instagram,
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::TikTok, Platform::Instagram, Platform::YouTube];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::YouTube => "youtube",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiktok" => Ok(Platform::TikTok),
            "instagram" => Ok(Platform::Instagram),
            "youtube" => Ok(Platform::YouTube),
            _ => Err(CoreError::InvalidPlatform(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Image,
    Carousel,
}

/// Publication state of a [`ContentPiece`].
///
/// `Scheduled` is the only non-terminal state: a piece moves to `Posted` or
/// `Failed` exactly once and never comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Scheduled,
    Posted,
    Failed,
}

impl ContentStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, ContentStatus::Scheduled)
    }

    #[must_use]
    pub fn can_transition_to(self, next: ContentStatus) -> bool {
        matches!(
            (self, next),
            (
                ContentStatus::Scheduled,
                ContentStatus::Posted | ContentStatus::Failed
            )
        )
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentStatus::Scheduled => write!(f, "scheduled"),
            ContentStatus::Posted => write!(f, "posted"),
            ContentStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub views: u64,
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPiece {
    pub id: Uuid,
    pub kind: ContentKind,
    pub title: String,
    pub description: String,
    pub media_url: String,
    pub hashtags: Vec<String>,
    pub platform: Platform,
    pub scheduled_for: DateTime<Utc>,
    pub status: ContentStatus,
    pub engagement: Engagement,
}

impl ContentPiece {
    /// `true` once the scheduled time has passed and the piece is still waiting.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ContentStatus::Scheduled && self.scheduled_for <= now
    }

    /// Move the piece to `next`, rejecting anything but `scheduled -> posted|failed`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] for any other transition.
    pub fn transition(&mut self, next: ContentStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
