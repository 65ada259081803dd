//! Digital assets: accounts and credentials a user wants remembered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Fixed classification of an asset.
#[derive(Serialize, Deserialize, sqlx::Type, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum AssetCategory {
    #[serde(alias = "社交")]
    Social,
    #[serde(alias = "金融")]
    Financial,
    #[serde(alias = "记忆")]
    Memory,
    #[serde(alias = "虚拟财产")]
    VirtualProperty,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 4] = [
        AssetCategory::Social,
        AssetCategory::Financial,
        AssetCategory::Memory,
        AssetCategory::VirtualProperty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Social => "social",
            AssetCategory::Financial => "financial",
            AssetCategory::Memory => "memory",
            AssetCategory::VirtualProperty => "virtual-property",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "social" | "社交" => Ok(AssetCategory::Social),
            "financial" | "金融" => Ok(AssetCategory::Financial),
            "memory" | "记忆" => Ok(AssetCategory::Memory),
            "virtual-property" | "虚拟财产" => Ok(AssetCategory::VirtualProperty),
            other => Err(format!(
                "invalid category `{}`, must be one of: {}",
                other,
                AssetCategory::ALL.map(|c| c.as_str()).join(", ")
            )),
        }
    }
}

/// A single remembered account.
///
/// `user_id` is fixed at creation. The stored credential is ciphertext from
/// the configured `SecretCipher` and is only ever exposed as a presence flag.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct DigitalAsset {
    pub id: Uuid,

    /// Owning user.
    pub user_id: Uuid,

    /// Platform the account lives on (e.g. "微信").
    pub platform_name: String,

    /// Account identifier on that platform.
    pub account: String,

    #[serde(rename = "has_password", serialize_with = "serialize_presence")]
    pub encrypted_password: Option<String>,

    pub category: AssetCategory,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn serialize_presence<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_bool(value.is_some())
}

pub(crate) const ASSET_COLUMNS: &str = "id, user_id, platform_name, account, encrypted_password, \
     category, notes, created_at, updated_at";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_english_and_chinese_labels() {
        assert_eq!(
            "social".parse::<AssetCategory>().unwrap(),
            AssetCategory::Social
        );
        assert_eq!(
            "虚拟财产".parse::<AssetCategory>().unwrap(),
            AssetCategory::VirtualProperty
        );
        let err = "crypto".parse::<AssetCategory>().unwrap_err();
        assert!(err.contains("social, financial, memory, virtual-property"));
    }

    #[test]
    fn ciphertext_is_never_serialized() {
        let asset = DigitalAsset {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            platform_name: "微信".into(),
            account: "a@x.com".into(),
            encrypted_password: Some("c2VjcmV0".into()),
            category: AssetCategory::Social,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&asset).unwrap();
        assert_eq!(value["has_password"], serde_json::json!(true));
        assert!(value.get("encrypted_password").is_none());
        assert_eq!(value["category"], "social");
    }
}
