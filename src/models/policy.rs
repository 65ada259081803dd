//! Platform policies: how a third-party platform treats account inheritance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The platform's stance on handing accounts to heirs.
#[derive(Serialize, Deserialize, sqlx::Type, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum Attitude {
    #[serde(alias = "明确禁止")]
    Prohibited,
    #[serde(alias = "态度模糊")]
    Ambiguous,
    #[serde(alias = "有限支持")]
    LimitedSupport,
    #[serde(alias = "主动服务")]
    ActiveService,
}

/// How likely an heir is to actually obtain the account.
#[derive(Serialize, Deserialize, sqlx::Type, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum InheritLikelihood {
    #[serde(alias = "低")]
    Low,
    #[serde(alias = "中")]
    Medium,
    #[serde(alias = "高")]
    High,
}

/// Globally readable reference entry, one per platform.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct PlatformPolicy {
    pub id: Uuid,

    /// Unique across all policies.
    pub platform_name: String,

    pub policy_content: String,

    pub attitude: Attitude,

    pub inherit_possibility: InheritLikelihood,

    pub legal_basis: Option<String>,

    /// Customer-service contact for the platform.
    pub customer_service: Option<String>,

    pub risk_warning: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const POLICY_COLUMNS: &str = "id, platform_name, policy_content, attitude, \
     inherit_possibility, legal_basis, customer_service, risk_warning, created_at, updated_at";
