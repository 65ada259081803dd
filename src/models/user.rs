//! Account records: the identity and authorization root.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account.
///
/// Owns zero or more assets and wills. The password hash never leaves the
/// service in serialized form.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct User {
    pub id: Uuid,

    /// Unique login name.
    pub username: String,

    /// Unique contact address.
    pub email: String,

    /// Opaque hash produced by the configured `PasswordHasher`.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub is_admin: bool,

    /// Inactive accounts cannot authenticate.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_admin, is_active, created_at, updated_at";
