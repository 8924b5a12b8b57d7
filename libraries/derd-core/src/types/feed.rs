/// Anonymous feed types
use crate::types::{Document, PostId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of story a post tells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryType {
    Experience,
    Advice,
    Motivation,
}

impl StoryType {
    /// Stored key
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryType::Experience => "experience",
            StoryType::Advice => "advice",
            StoryType::Motivation => "motivation",
        }
    }

    /// Card label
    pub fn label(&self) -> &'static str {
        match self {
            StoryType::Experience => "🌱 Experience",
            StoryType::Advice => "💡 Advice",
            StoryType::Motivation => "⚡ Motivation",
        }
    }
}

impl FromStr for StoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "experience" => Ok(StoryType::Experience),
            "advice" => Ok(StoryType::Advice),
            "motivation" => Ok(StoryType::Motivation),
            other => Err(format!("unknown story type '{}'", other)),
        }
    }
}

/// Post in the anonymous feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: PostId,
    /// Post text, stored as `body`
    pub content: String,
    pub story_type: StoryType,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
}

impl FeedPost {
    /// Decode an `exploreContent` document.
    ///
    /// Unknown story types fall back to motivation, and a missing counter
    /// reads as zero.
    pub fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            id: doc.id.clone(),
            content: doc.get_str("body")?.to_string(),
            story_type: doc
                .get_str("storyType")
                .and_then(|s| s.parse().ok())
                .unwrap_or(StoryType::Motivation),
            likes_count: doc.get_i64("likesCount").unwrap_or(0),
            created_at: doc.get_timestamp("createdAt")?,
        })
    }
}
