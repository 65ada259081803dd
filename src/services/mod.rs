//! Transactional orchestration of the access rules over the SQLite store.
//!
//! Every mutating operation follows the same order: validate input without
//! touching the store, open a transaction, resolve and authorize the target,
//! write, commit. Returning early drops the transaction, which rolls it back.

pub mod asset_service;
pub mod content_service;
pub mod error;
pub mod stats_service;
pub mod user_service;
pub mod will_service;

use crate::{
    access::{Action, Decision, Principal, ResourceRef, authorize},
    crypto::{PasswordHasher, SecretCipher},
    render::WillRenderer,
};
use asset_service::AssetService;
use content_service::ContentService;
pub use error::{ServiceError, ServiceResult};
use sqlx::SqlitePool;
use stats_service::StatsService;
use std::sync::Arc;
use tracing::debug;
use user_service::UserService;
use will_service::WillService;

/// Shared handler state: one instance of each service over one pool.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub cipher: Arc<dyn SecretCipher>,
    pub users: UserService,
    pub assets: AssetService,
    pub wills: WillService,
    pub content: ContentService,
    pub stats: StatsService,
}

impl AppState {
    pub fn new(
        db: Arc<SqlitePool>,
        cipher: Arc<dyn SecretCipher>,
        hasher: Arc<dyn PasswordHasher>,
        renderer: Arc<dyn WillRenderer>,
    ) -> Self {
        Self {
            users: UserService::new(db.clone(), hasher),
            assets: AssetService::new(db.clone(), cipher.clone()),
            wills: WillService::new(db.clone(), renderer),
            content: ContentService::new(db.clone()),
            stats: StatsService::new(db.clone()),
            cipher,
            db,
        }
    }
}

/// Authorize or fail with a uniform `Forbidden`. The real reason is only logged.
pub(crate) fn ensure(
    principal: &Principal,
    resource: &ResourceRef,
    action: Action,
) -> ServiceResult<()> {
    match authorize(principal, resource, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            debug!(
                kind = ?resource.kind,
                resource_id = ?resource.id,
                principal_id = ?principal.id(),
                ?action,
                %reason,
                "access denied"
            );
            Err(ServiceError::Forbidden)
        }
    }
}

pub(crate) fn require_admin(principal: &Principal) -> ServiceResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        debug!(principal_id = ?principal.id(), "administrator required");
        Err(ServiceError::Forbidden)
    }
}

/// The error for an owned row that was not found. Only administrators, who
/// may see every row anyway, learn that it does not exist.
pub(crate) fn hidden_missing(principal: &Principal, what: &'static str) -> ServiceError {
    if principal.is_admin() {
        ServiceError::NotFound(what)
    } else {
        ServiceError::Forbidden
    }
}

pub(crate) fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Fail with the names of every required field that is absent or blank.
pub(crate) fn require_fields(fields: &[(&'static str, bool)]) -> ServiceResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::missing_fields(&missing))
    }
}

/// Provided-but-blank values are rejected on partial updates.
pub(crate) fn reject_blank(fields: &[(&'static str, &Option<String>)]) -> ServiceResult<()> {
    let blank: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.as_deref().is_some_and(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();
    if blank.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!(
            "fields must not be empty: {}",
            blank.join(", ")
        )))
    }
}

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `%text%` for a `LIKE ... ESCAPE '\'` match. Wildcards in `text` match literally.
pub(crate) fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Which unique column an insert or update collided on, if any.
pub(crate) fn unique_violation_field(err: &sqlx::Error) -> Option<&'static str> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    let message = db_err.message().to_ascii_lowercase();
    if !message.contains("unique") {
        return None;
    }
    if message.contains("users.username") {
        Some("username")
    } else if message.contains("users.email") {
        Some("email")
    } else if message.contains("platform_policies.platform_name") {
        Some("platform_name")
    } else {
        Some("record")
    }
}

/// Map a store error, turning unique-constraint hits into `Conflict`.
pub(crate) fn store_error(err: sqlx::Error) -> ServiceError {
    match unique_violation_field(&err) {
        Some(field) => ServiceError::Conflict { field },
        None => ServiceError::from(err),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::{crypto::PlainHasher, db, models::user::User, render::JsonWillRenderer};
    use crate::crypto::AesGcmCipher;

    pub async fn state() -> AppState {
        let pool = db::test_pool().await;
        let (cipher, _) = AesGcmCipher::generate().expect("key generation");
        AppState::new(
            Arc::new(pool),
            Arc::new(cipher),
            Arc::new(PlainHasher),
            Arc::new(JsonWillRenderer),
        )
    }

    pub async fn seed_user(state: &AppState, username: &str, is_admin: bool) -> User {
        state
            .users
            .bootstrap_user(
                username,
                &format!("{}@example.com", username),
                "pw",
                is_admin,
            )
            .await
            .expect("seed user")
    }
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn search_patterns_escape_wildcards() {
        assert_eq!(contains_pattern("wechat"), "%wechat%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }
}
