//! AssetService: owner-scoped CRUD over digital assets.
//!
//! Account passwords are encrypted with the configured `SecretCipher` before
//! they reach the store and only decrypted on an explicit reveal.

use super::{
    ServiceError, ServiceResult, clean, contains_pattern, ensure, hidden_missing, is_present,
    reject_blank, require_fields,
};
use crate::{
    access::{Action, CollectionQuery, Page, Principal, ResourceKind, ResourceRef, scope_query},
    crypto::SecretCipher,
    models::asset::{ASSET_COLUMNS, AssetCategory, DigitalAsset},
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct NewAsset {
    pub platform_name: Option<String>,
    pub account: Option<String>,
    /// Plaintext; stored encrypted.
    pub password: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Partial update. An empty `password` clears the stored credential.
#[derive(Debug, Default, Deserialize)]
pub struct AssetChanges {
    pub platform_name: Option<String>,
    pub account: Option<String>,
    pub password: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    /// Substring of platform name or account.
    pub search: Option<String>,
    pub category: Option<AssetCategory>,
}

#[derive(Clone)]
pub struct AssetService {
    db: Arc<SqlitePool>,
    cipher: Arc<dyn SecretCipher>,
}

impl AssetService {
    pub fn new(db: Arc<SqlitePool>, cipher: Arc<dyn SecretCipher>) -> Self {
        Self { db, cipher }
    }

    /// Record a new asset for `owner_id`. The owner themself or an
    /// administrator may do this.
    pub async fn create_asset(
        &self,
        owner_id: Uuid,
        input: NewAsset,
        principal: &Principal,
    ) -> ServiceResult<DigitalAsset> {
        require_fields(&[
            ("platform_name", is_present(&input.platform_name)),
            ("account", is_present(&input.account)),
            ("category", is_present(&input.category)),
        ])?;
        let category = parse_category(input.category.as_deref().unwrap_or_default())?;
        ensure(
            principal,
            &ResourceRef::new_owned(ResourceKind::Asset, owner_id),
            Action::Create,
        )?;

        let encrypted_password = match clean(input.password) {
            Some(password) => Some(self.cipher.encrypt(&password)?),
            None => None,
        };

        let mut tx = self.db.begin().await?;
        let owner_exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;
        if owner_exists.is_none() {
            return Err(hidden_missing(principal, "user"));
        }

        let now = Utc::now();
        let asset = DigitalAsset {
            id: Uuid::new_v4(),
            user_id: owner_id,
            platform_name: input.platform_name.unwrap_or_default().trim().to_string(),
            account: input.account.unwrap_or_default().trim().to_string(),
            encrypted_password,
            category,
            notes: clean(input.notes),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO digital_assets (id, user_id, platform_name, account, encrypted_password,
                                         category, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(asset.id)
        .bind(asset.user_id)
        .bind(&asset.platform_name)
        .bind(&asset.account)
        .bind(&asset.encrypted_password)
        .bind(asset.category)
        .bind(&asset.notes)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(asset_id = %asset.id, user_id = %owner_id, category = %asset.category, "asset created");
        Ok(asset)
    }

    pub async fn get_asset(
        &self,
        asset_id: Uuid,
        principal: &Principal,
    ) -> ServiceResult<DigitalAsset> {
        let asset = fetch_asset(&mut *self.db.acquire().await?, asset_id)
            .await?
            .ok_or_else(|| hidden_missing(principal, "asset"))?;
        ensure(principal, &ResourceRef::asset(&asset), Action::Read)?;
        Ok(asset)
    }

    /// Assets visible to `principal`, newest first.
    pub async fn list_assets(
        &self,
        principal: &Principal,
        query: CollectionQuery<AssetFilter>,
    ) -> ServiceResult<Page<DigitalAsset>> {
        let query = scope_query(query, principal, ResourceKind::Asset);

        let mut count =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM digital_assets WHERE 1 = 1");
        push_asset_filters(&mut count, &query);
        let total: i64 = count.build_query_scalar().fetch_one(&*self.db).await?;

        let mut select = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM digital_assets WHERE 1 = 1",
            ASSET_COLUMNS
        ));
        push_asset_filters(&mut select, &query);
        select.push(" ORDER BY created_at DESC LIMIT ");
        select.push_bind(query.page.limit());
        select.push(" OFFSET ");
        select.push_bind(query.page.offset());
        let items: Vec<DigitalAsset> = select.build_query_as().fetch_all(&*self.db).await?;

        Ok(Page::new(items, total, query.page))
    }

    pub async fn update_asset(
        &self,
        asset_id: Uuid,
        changes: AssetChanges,
        principal: &Principal,
    ) -> ServiceResult<DigitalAsset> {
        reject_blank(&[
            ("platform_name", &changes.platform_name),
            ("account", &changes.account),
            ("category", &changes.category),
        ])?;
        let category = changes
            .category
            .as_deref()
            .map(parse_category)
            .transpose()?;

        let mut tx = self.db.begin().await?;
        let mut asset = fetch_asset(&mut tx, asset_id)
            .await?
            .ok_or_else(|| hidden_missing(principal, "asset"))?;
        ensure(principal, &ResourceRef::asset(&asset), Action::Update)?;

        if let Some(platform_name) = changes.platform_name {
            asset.platform_name = platform_name.trim().to_string();
        }
        if let Some(account) = changes.account {
            asset.account = account.trim().to_string();
        }
        if let Some(category) = category {
            asset.category = category;
        }
        if let Some(password) = changes.password {
            asset.encrypted_password = match clean(Some(password)) {
                Some(password) => Some(self.cipher.encrypt(&password)?),
                None => None,
            };
        }
        if changes.notes.is_some() {
            asset.notes = clean(changes.notes);
        }
        asset.updated_at = Utc::now();

        sqlx::query(
            "UPDATE digital_assets
             SET platform_name = ?, account = ?, encrypted_password = ?, category = ?,
                 notes = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&asset.platform_name)
        .bind(&asset.account)
        .bind(&asset.encrypted_password)
        .bind(asset.category)
        .bind(&asset.notes)
        .bind(asset.updated_at)
        .bind(asset.id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(asset_id = %asset.id, principal_id = ?principal.id(), "asset updated");
        Ok(asset)
    }

    pub async fn delete_asset(&self, asset_id: Uuid, principal: &Principal) -> ServiceResult<()> {
        let mut tx = self.db.begin().await?;
        let asset = fetch_asset(&mut tx, asset_id)
            .await?
            .ok_or_else(|| hidden_missing(principal, "asset"))?;
        ensure(principal, &ResourceRef::asset(&asset), Action::Delete)?;

        sqlx::query("DELETE FROM digital_assets WHERE id = ?")
            .bind(asset.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(asset_id = %asset.id, principal_id = ?principal.id(), "asset deleted");
        Ok(())
    }

    /// Decrypt the stored credential for the owner or an administrator.
    /// `None` when no credential was recorded.
    pub async fn reveal_password(
        &self,
        asset_id: Uuid,
        principal: &Principal,
    ) -> ServiceResult<Option<String>> {
        let asset = self.get_asset(asset_id, principal).await?;
        let revealed = match asset.encrypted_password.as_deref() {
            Some(ciphertext) => Some(self.cipher.decrypt(ciphertext)?),
            None => None,
        };
        info!(asset_id = %asset.id, principal_id = ?principal.id(), "asset credential revealed");
        Ok(revealed)
    }
}

fn parse_category(raw: &str) -> ServiceResult<AssetCategory> {
    raw.parse().map_err(ServiceError::Validation)
}

async fn fetch_asset(conn: &mut SqliteConnection, id: Uuid) -> sqlx::Result<Option<DigitalAsset>> {
    sqlx::query_as::<_, DigitalAsset>(&format!(
        "SELECT {} FROM digital_assets WHERE id = ?",
        ASSET_COLUMNS
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

fn push_asset_filters(
    builder: &mut QueryBuilder<'_, Sqlite>,
    query: &CollectionQuery<AssetFilter>,
) {
    query.scope.push_sql(builder, ResourceKind::Asset);

    if let Some(search) = query.filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        builder.push(" AND (platform_name LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR account LIKE ");
        builder.push_bind(pattern);
        builder.push(" ESCAPE '\\')");
    }

    if let Some(category) = query.filter.category {
        builder.push(" AND category = ");
        builder.push_bind(category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        access::PageRequest,
        services::testing::{seed_user, state},
    };

    fn wechat() -> NewAsset {
        NewAsset {
            platform_name: Some("微信".into()),
            account: Some("a@x.com".into()),
            password: Some("hunter2".into()),
            category: Some("social".into()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn only_owner_or_admin_may_update_an_asset() {
        let state = state().await;
        let alice = seed_user(&state, "alice", false).await;
        let bob = seed_user(&state, "bob", false).await;
        let admin = seed_user(&state, "root", true).await;

        let asset = state
            .assets
            .create_asset(alice.id, wechat(), &Principal::from(&alice))
            .await
            .unwrap();
        assert_eq!(asset.category, AssetCategory::Social);

        let changes = || AssetChanges {
            notes: Some("memorialize".into()),
            ..AssetChanges::default()
        };

        let err = state
            .assets
            .update_asset(asset.id, changes(), &Principal::from(&bob))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));

        let updated = state
            .assets
            .update_asset(asset.id, changes(), &Principal::from(&admin))
            .await
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("memorialize"));
        assert_eq!(updated.user_id, alice.id);
    }

    #[tokio::test]
    async fn missing_and_foreign_assets_look_the_same_to_non_owners() {
        let state = state().await;
        let alice = seed_user(&state, "alice", false).await;
        let bob = seed_user(&state, "bob", false).await;
        let admin = seed_user(&state, "root", true).await;
        let asset = state
            .assets
            .create_asset(alice.id, wechat(), &Principal::from(&alice))
            .await
            .unwrap();

        let bob = Principal::from(&bob);
        let foreign = state.assets.delete_asset(asset.id, &bob).await.unwrap_err();
        let missing = state
            .assets
            .delete_asset(Uuid::new_v4(), &bob)
            .await
            .unwrap_err();
        assert!(matches!(foreign, ServiceError::Forbidden));
        assert!(matches!(missing, ServiceError::Forbidden));
        assert_eq!(foreign.to_string(), missing.to_string());

        let admin_missing = state
            .assets
            .get_asset(Uuid::new_v4(), &Principal::from(&admin))
            .await
            .unwrap_err();
        assert!(matches!(admin_missing, ServiceError::NotFound("asset")));
    }

    #[tokio::test]
    async fn users_cannot_create_assets_for_someone_else() {
        let state = state().await;
        let alice = seed_user(&state, "alice", false).await;
        let bob = seed_user(&state, "bob", false).await;
        let err = state
            .assets
            .create_asset(alice.id, wechat(), &Principal::from(&bob))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_the_store() {
        let state = state().await;
        let alice = seed_user(&state, "alice", false).await;
        let err = state
            .assets
            .create_asset(
                alice.id,
                NewAsset {
                    platform_name: Some("QQ".into()),
                    ..NewAsset::default()
                },
                &Principal::from(&alice),
            )
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(msg) => assert_eq!(msg, "missing required fields: account, category"),
            other => panic!("unexpected {:?}", other),
        }

        let mut bad_category = wechat();
        bad_category.category = Some("crypto".into());
        let err = state
            .assets
            .create_asset(alice.id, bad_category, &Principal::from(&alice))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn credentials_are_encrypted_at_rest_and_revealed_to_owner() {
        let state = state().await;
        let alice = seed_user(&state, "alice", false).await;
        let bob = seed_user(&state, "bob", false).await;
        let asset = state
            .assets
            .create_asset(alice.id, wechat(), &Principal::from(&alice))
            .await
            .unwrap();

        let stored: Option<String> =
            sqlx::query_scalar("SELECT encrypted_password FROM digital_assets WHERE id = ?")
                .bind(asset.id)
                .fetch_one(&*state.db)
                .await
                .unwrap();
        let stored = stored.expect("ciphertext stored");
        assert!(!stored.contains("hunter2"));

        let revealed = state
            .assets
            .reveal_password(asset.id, &Principal::from(&alice))
            .await
            .unwrap();
        assert_eq!(revealed.as_deref(), Some("hunter2"));

        let err = state
            .assets
            .reveal_password(asset.id, &Principal::from(&bob))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));

        let cleared = state
            .assets
            .update_asset(
                asset.id,
                AssetChanges {
                    password: Some(String::new()),
                    ..AssetChanges::default()
                },
                &Principal::from(&alice),
            )
            .await
            .unwrap();
        assert!(cleared.encrypted_password.is_none());
    }

    #[tokio::test]
    async fn listing_applies_scope_before_search_and_paging() {
        let state = state().await;
        let alice = seed_user(&state, "alice", false).await;
        let bob = seed_user(&state, "bob", false).await;
        let admin = seed_user(&state, "root", true).await;
        for _ in 0..3 {
            state
                .assets
                .create_asset(alice.id, wechat(), &Principal::from(&alice))
                .await
                .unwrap();
        }
        state
            .assets
            .create_asset(bob.id, wechat(), &Principal::from(&bob))
            .await
            .unwrap();

        let search = |search: &str| {
            CollectionQuery::new(
                AssetFilter {
                    search: Some(search.into()),
                    category: Some(AssetCategory::Social),
                },
                PageRequest::new(Some(1), Some(2)),
            )
        };

        let bobs = state
            .assets
            .list_assets(&Principal::from(&bob), search("微"))
            .await
            .unwrap();
        assert_eq!(bobs.total, 1);
        assert!(bobs.items.iter().all(|a| a.user_id == bob.id));

        let everything = state
            .assets
            .list_assets(&Principal::from(&admin), search("a@x"))
            .await
            .unwrap();
        assert_eq!(everything.total, 4);
        assert_eq!(everything.items.len(), 2);
        assert_eq!(everything.pages, 2);

        let nobody = state
            .assets
            .list_assets(&Principal::Anonymous, search(""))
            .await
            .unwrap();
        assert_eq!(nobody.total, 0);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let state = state().await;
        let alice = seed_user(&state, "alice", false).await;
        let owner = Principal::from(&alice);
        for account in ["a_b", "axb", "100%"] {
            let mut input = wechat();
            input.account = Some(account.into());
            state.assets.create_asset(alice.id, input, &owner).await.unwrap();
        }

        let accounts = |page: Page<DigitalAsset>| -> Vec<String> {
            page.items.into_iter().map(|a| a.account).collect()
        };
        let search = |text: &str| {
            CollectionQuery::new(
                AssetFilter {
                    search: Some(text.into()),
                    category: None,
                },
                PageRequest::default(),
            )
        };

        let underscored = state.assets.list_assets(&owner, search("a_b")).await.unwrap();
        assert_eq!(accounts(underscored), ["a_b"]);
        let percent = state.assets.list_assets(&owner, search("0%")).await.unwrap();
        assert_eq!(accounts(percent), ["100%"]);
    }

    #[tokio::test]
    async fn failed_update_leaves_the_stored_row_untouched() {
        let state = state().await;
        let alice = seed_user(&state, "alice", false).await;
        let owner = Principal::from(&alice);
        let asset = state
            .assets
            .create_asset(alice.id, wechat(), &owner)
            .await
            .unwrap();

        sqlx::query(
            "CREATE TRIGGER reject_asset_update BEFORE UPDATE ON digital_assets
             BEGIN SELECT RAISE(ABORT, 'disk I/O error'); END",
        )
        .execute(&*state.db)
        .await
        .unwrap();

        let err = state
            .assets
            .update_asset(
                asset.id,
                AssetChanges {
                    notes: Some("memorialize".into()),
                    ..AssetChanges::default()
                },
                &owner,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert_eq!(err.to_string(), "internal error");

        let stored = state.assets.get_asset(asset.id, &owner).await.unwrap();
        assert_eq!(stored.notes, None);
    }
}
