//! WillService: will content, lifecycle transitions and export.

use super::{
    ServiceError, ServiceResult, clean, contains_pattern, ensure, hidden_missing, is_present,
    reject_blank, require_fields,
};
use crate::{
    access::{
        Action, CollectionQuery, Page, Principal, ResourceKind, ResourceRef, Transition,
        plan_transition, scope_query,
    },
    models::{
        user::{USER_COLUMNS, User},
        will::{DigitalWill, WILL_COLUMNS, WillPayload, WillStatus},
    },
    render::{RenderedArtifact, WillDocument, WillRenderer},
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, types::Json};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct NewWill {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub payload: Option<WillPayload>,
}

/// Partial content update. Status is changed through
/// [`WillService::transition_will_status`] only.
#[derive(Debug, Default, Deserialize)]
pub struct WillChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub payload: Option<WillPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WillFilter {
    /// Substring of title or description.
    pub search: Option<String>,
    pub status: Option<WillStatus>,
}

#[derive(Clone)]
pub struct WillService {
    db: Arc<SqlitePool>,
    renderer: Arc<dyn WillRenderer>,
}

impl WillService {
    pub fn new(db: Arc<SqlitePool>, renderer: Arc<dyn WillRenderer>) -> Self {
        Self { db, renderer }
    }

    /// Start a will for `owner_id`. New wills are always drafts.
    pub async fn create_will(
        &self,
        owner_id: Uuid,
        input: NewWill,
        principal: &Principal,
    ) -> ServiceResult<DigitalWill> {
        require_fields(&[("title", is_present(&input.title))])?;
        ensure(
            principal,
            &ResourceRef::new_owned(ResourceKind::Will, owner_id),
            Action::Create,
        )?;

        let mut tx = self.db.begin().await?;
        let owner_exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;
        if owner_exists.is_none() {
            return Err(hidden_missing(principal, "user"));
        }

        let now = Utc::now();
        let will = DigitalWill {
            id: Uuid::new_v4(),
            user_id: owner_id,
            title: input.title.unwrap_or_default().trim().to_string(),
            description: clean(input.description),
            payload: Json(input.payload.unwrap_or_default()),
            status: WillStatus::Draft,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO digital_wills (id, user_id, title, description, payload, status,
                                        created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(will.id)
        .bind(will.user_id)
        .bind(&will.title)
        .bind(&will.description)
        .bind(&will.payload)
        .bind(will.status)
        .bind(will.created_at)
        .bind(will.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(will_id = %will.id, user_id = %owner_id, "will created");
        Ok(will)
    }

    pub async fn get_will(&self, will_id: Uuid, principal: &Principal) -> ServiceResult<DigitalWill> {
        let will = fetch_will(&mut *self.db.acquire().await?, will_id)
            .await?
            .ok_or_else(|| hidden_missing(principal, "will"))?;
        ensure(principal, &ResourceRef::will(&will), Action::Read)?;
        Ok(will)
    }

    /// Wills visible to `principal`, most recently touched first.
    pub async fn list_wills(
        &self,
        principal: &Principal,
        query: CollectionQuery<WillFilter>,
    ) -> ServiceResult<Page<DigitalWill>> {
        let query = scope_query(query, principal, ResourceKind::Will);

        let mut count =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM digital_wills WHERE 1 = 1");
        push_will_filters(&mut count, &query);
        let total: i64 = count.build_query_scalar().fetch_one(&*self.db).await?;

        let mut select = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM digital_wills WHERE 1 = 1",
            WILL_COLUMNS
        ));
        push_will_filters(&mut select, &query);
        select.push(" ORDER BY updated_at DESC LIMIT ");
        select.push_bind(query.page.limit());
        select.push(" OFFSET ");
        select.push_bind(query.page.offset());
        let items: Vec<DigitalWill> = select.build_query_as().fetch_all(&*self.db).await?;

        Ok(Page::new(items, total, query.page))
    }

    /// Edit title, description or payload. Allowed in every status.
    pub async fn update_will_content(
        &self,
        will_id: Uuid,
        changes: WillChanges,
        principal: &Principal,
    ) -> ServiceResult<DigitalWill> {
        reject_blank(&[("title", &changes.title)])?;

        let mut tx = self.db.begin().await?;
        let mut will = fetch_will(&mut tx, will_id)
            .await?
            .ok_or_else(|| hidden_missing(principal, "will"))?;
        ensure(principal, &ResourceRef::will(&will), Action::Update)?;

        if let Some(title) = changes.title {
            will.title = title.trim().to_string();
        }
        if changes.description.is_some() {
            will.description = clean(changes.description);
        }
        if let Some(payload) = changes.payload {
            will.payload = Json(payload);
        }
        will.updated_at = Utc::now();

        sqlx::query(
            "UPDATE digital_wills SET title = ?, description = ?, payload = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&will.title)
        .bind(&will.description)
        .bind(&will.payload)
        .bind(will.updated_at)
        .bind(will.id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(will_id = %will.id, principal_id = ?principal.id(), "will content updated");
        Ok(will)
    }

    /// Move a will to `requested`.
    ///
    /// The requested value is parsed before anything else, so an unknown
    /// status is a validation error for every caller. Requesting the current
    /// status succeeds without a write.
    pub async fn transition_will_status(
        &self,
        will_id: Uuid,
        requested: &str,
        principal: &Principal,
    ) -> ServiceResult<DigitalWill> {
        let requested: WillStatus = requested.trim().parse().map_err(ServiceError::Validation)?;

        let mut tx = self.db.begin().await?;
        let mut will = fetch_will(&mut tx, will_id)
            .await?
            .ok_or_else(|| hidden_missing(principal, "will"))?;
        ensure(principal, &ResourceRef::will(&will), Action::Update)?;

        let transition = plan_transition(will.status, requested, principal).map_err(|denied| {
            debug!(will_id = %will_id, principal_id = ?principal.id(), %denied, "transition denied");
            ServiceError::Forbidden
        })?;

        match transition {
            Transition::Unchanged(_) => Ok(will),
            Transition::Move { from, to } => {
                will.status = to;
                will.updated_at = Utc::now();
                sqlx::query("UPDATE digital_wills SET status = ?, updated_at = ? WHERE id = ?")
                    .bind(will.status)
                    .bind(will.updated_at)
                    .bind(will.id)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;

                info!(will_id = %will.id, %from, %to, principal_id = ?principal.id(), "will status changed");
                Ok(will)
            }
        }
    }

    pub async fn delete_will(&self, will_id: Uuid, principal: &Principal) -> ServiceResult<()> {
        let mut tx = self.db.begin().await?;
        let will = fetch_will(&mut tx, will_id)
            .await?
            .ok_or_else(|| hidden_missing(principal, "will"))?;
        ensure(principal, &ResourceRef::will(&will), Action::Delete)?;

        sqlx::query("DELETE FROM digital_wills WHERE id = ?")
            .bind(will.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(will_id = %will.id, principal_id = ?principal.id(), "will deleted");
        Ok(())
    }

    /// Resolve the will and its owner and hand both to the renderer.
    pub async fn export_will(
        &self,
        will_id: Uuid,
        principal: &Principal,
    ) -> ServiceResult<RenderedArtifact> {
        let will = self.get_will(will_id, principal).await?;
        let owner = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(will.user_id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ServiceError::NotFound("user"))?;

        let document = WillDocument {
            will,
            owner_username: owner.username,
            owner_email: owner.email,
            generated_at: Utc::now(),
        };
        let renderer = self.renderer.clone();
        let artifact = tokio::task::spawn_blocking(move || renderer.render(&document)).await??;

        info!(will_id = %will_id, file_name = %artifact.file_name, "will exported");
        Ok(artifact)
    }
}

async fn fetch_will(conn: &mut SqliteConnection, id: Uuid) -> sqlx::Result<Option<DigitalWill>> {
    sqlx::query_as::<_, DigitalWill>(&format!(
        "SELECT {} FROM digital_wills WHERE id = ?",
        WILL_COLUMNS
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

fn push_will_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &CollectionQuery<WillFilter>) {
    query.scope.push_sql(builder, ResourceKind::Will);

    if let Some(search) = query.filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        builder.push(" AND (title LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR description LIKE ");
        builder.push_bind(pattern);
        builder.push(" ESCAPE '\\')");
    }

    if let Some(status) = query.filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
}
