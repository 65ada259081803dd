//! Digital wills: a user's declared disposition of their assets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use std::{collections::BTreeMap, fmt, str::FromStr};
use uuid::Uuid;

/// Lifecycle status of a will. See `access::lifecycle` for the transition rules.
#[derive(Serialize, Deserialize, sqlx::Type, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum WillStatus {
    Draft,
    Confirmed,
    Archived,
}

impl WillStatus {
    pub const ALL: [WillStatus; 3] = [
        WillStatus::Draft,
        WillStatus::Confirmed,
        WillStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WillStatus::Draft => "draft",
            WillStatus::Confirmed => "confirmed",
            WillStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for WillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WillStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "invalid status `{}`, must be one of: {}",
                    s,
                    WillStatus::ALL.map(|st| st.as_str()).join(", ")
                )
            })
    }
}

/// What should happen to one asset.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispositionAction {
    TransferToHeir,
    Memorialize,
    Delete,
    Preserve,
}

/// A named person attached to a will (heir or backup contact).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Contact {
    pub name: Option<String>,
    pub relation: Option<String>,
    pub phone: Option<String>,
}

/// Structured will content.
///
/// Per-asset dispositions live in their own map keyed by asset id or
/// platform name, so they can never collide with the reserved heir, backup
/// and note fields.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct WillPayload {
    #[serde(default)]
    pub dispositions: BTreeMap<String, DispositionAction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heir: Option<Contact>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<Contact>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_notes: Option<String>,
}

/// A disposition declaration owned by one user.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct DigitalWill {
    pub id: Uuid,

    /// Owning user, fixed at creation.
    pub user_id: Uuid,

    pub title: String,

    pub description: Option<String>,

    pub payload: Json<WillPayload>,

    pub status: WillStatus,

    pub created_at: DateTime<Utc>,

    /// Bumped on every content edit and every status change.
    pub updated_at: DateTime<Utc>,
}

pub(crate) const WILL_COLUMNS: &str =
    "id, user_id, title, description, payload, status, created_at, updated_at";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_lists_the_valid_set() {
        let err = "bogus_status".parse::<WillStatus>().unwrap_err();
        assert!(err.contains("draft, confirmed, archived"), "{}", err);
        assert_eq!(
            "confirmed".parse::<WillStatus>().unwrap(),
            WillStatus::Confirmed
        );
    }

    #[test]
    fn payload_keeps_reserved_fields_apart_from_dispositions() {
        let payload: WillPayload = serde_json::from_value(serde_json::json!({
            "dispositions": { "微信": "memorialize", "special_notes": "delete" },
            "heir": { "name": "Li", "relation": "daughter" },
            "special_notes": "read the letter first"
        }))
        .unwrap();

        assert_eq!(payload.dispositions.len(), 2);
        assert_eq!(
            payload.dispositions.get("special_notes"),
            Some(&DispositionAction::Delete)
        );
        assert_eq!(
            payload.special_notes.as_deref(),
            Some("read the letter first")
        );
        assert_eq!(payload.heir.unwrap().name.as_deref(), Some("Li"));
        assert!(payload.backup.is_none());
    }
}
