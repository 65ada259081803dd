use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A frequently asked question, listed by `(category, display_order)`.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct Faq {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const FAQ_COLUMNS: &str =
    "id, question, answer, category, display_order, created_at, updated_at";
