//! User-submitted stories, published after moderation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, Deserialize, sqlx::Type, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum StoryStatus {
    Pending,
    Approved,
    Rejected,
}

/// A narrative awaiting or past moderation. Only `Approved` stories are public.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct Story {
    pub id: Uuid,
    pub title: String,
    pub content: String,

    /// Free-form author label, not a user reference.
    pub author: Option<String>,

    pub category: Option<String>,
    pub image_url: Option<String>,
    pub status: StoryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const STORY_COLUMNS: &str =
    "id, title, content, author, category, image_url, status, created_at, updated_at";
