//! UserService: accounts, credentials and account administration.

use super::{
    ServiceError, ServiceResult, contains_pattern, ensure, hidden_missing, is_present,
    reject_blank, require_admin, require_fields, store_error,
};
use crate::{
    access::{Action, CollectionQuery, Page, Principal, ResourceKind, ResourceRef, scope_query},
    crypto::PasswordHasher,
    models::user::{USER_COLUMNS, User},
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Registration or console-created account.
#[derive(Debug, Default, Deserialize)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

/// Partial account update. `None` leaves a field as it is.
#[derive(Debug, Default, Deserialize)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatusFilter {
    Active,
    Inactive,
    Admin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Substring of username or email.
    pub search: Option<String>,
    pub status: Option<UserStatusFilter>,
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<SqlitePool>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(db: Arc<SqlitePool>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { db, hasher }
    }

    /// Hash off the async executor; argon2 is deliberately slow.
    async fn hash_password(&self, password: String) -> ServiceResult<String> {
        let hasher = self.hasher.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.hash(&password)).await??)
    }

    /// Check a username/password pair. Unknown users, wrong passwords and
    /// inactive accounts all yield `None`.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> ServiceResult<Option<User>> {
        let Some(user) = fetch_by_username(&mut *self.db.acquire().await?, username).await? else {
            return Ok(None);
        };

        let hasher = self.hasher.clone();
        let hash = user.password_hash.clone();
        let password = password.to_string();
        let verified =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await??;

        if !verified || !user.is_active {
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Register an account.
    ///
    /// Anyone may register an ordinary active account. Only administrators
    /// may create administrators or inactive accounts.
    pub async fn create_user(&self, principal: &Principal, input: NewUser) -> ServiceResult<User> {
        require_fields(&[
            ("username", is_present(&input.username)),
            ("email", is_present(&input.email)),
            ("password", is_present(&input.password)),
        ])?;

        let is_admin = input.is_admin.unwrap_or(false);
        let is_active = input.is_active.unwrap_or(true);
        if is_admin || !is_active {
            require_admin(principal)?;
        }

        let username = input.username.unwrap_or_default().trim().to_string();
        let email = input.email.unwrap_or_default().trim().to_string();
        let password_hash = self
            .hash_password(input.password.unwrap_or_default())
            .await?;

        let mut tx = self.db.begin().await?;
        ensure_unique(&mut tx, &username, &email, None).await?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            is_admin,
            is_active,
            created_at: now,
            updated_at: now,
        };
        insert_user(&mut tx, &user).await?;
        tx.commit().await?;

        info!(user_id = %user.id, username = %user.username, is_admin, "user created");
        Ok(user)
    }

    /// Create an account outside any request, e.g. the configured
    /// administrator at startup. Returns the existing row when the username
    /// is already taken.
    pub async fn bootstrap_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> ServiceResult<User> {
        if let Some(existing) =
            fetch_by_username(&mut *self.db.acquire().await?, username).await?
        {
            if existing.is_admin != is_admin {
                warn!(username, "bootstrap user exists with a different role, leaving it unchanged");
            }
            return Ok(existing);
        }

        let password_hash = self.hash_password(password.to_string()).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            is_admin,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin().await?;
        ensure_unique(&mut tx, &user.username, &user.email, None).await?;
        insert_user(&mut tx, &user).await?;
        tx.commit().await?;

        info!(user_id = %user.id, username, is_admin, "bootstrap user created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid, principal: &Principal) -> ServiceResult<User> {
        ensure(principal, &ResourceRef::account(user_id), Action::Read)?;
        fetch_by_id(&mut *self.db.acquire().await?, user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))
    }

    /// Accounts visible to `principal`: all for administrators, only their
    /// own for everyone else.
    pub async fn list_users(
        &self,
        principal: &Principal,
        query: CollectionQuery<UserFilter>,
    ) -> ServiceResult<Page<User>> {
        let query = scope_query(query, principal, ResourceKind::User);

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users WHERE 1 = 1");
        push_user_filters(&mut count, &query);
        let total: i64 = count.build_query_scalar().fetch_one(&*self.db).await?;

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM users WHERE 1 = 1", USER_COLUMNS));
        push_user_filters(&mut select, &query);
        select.push(" ORDER BY created_at DESC LIMIT ");
        select.push_bind(query.page.limit());
        select.push(" OFFSET ");
        select.push_bind(query.page.offset());
        let items: Vec<User> = select.build_query_as().fetch_all(&*self.db).await?;

        Ok(Page::new(items, total, query.page))
    }

    /// Apply a partial update.
    ///
    /// Users may change their own username, email and password. Role and
    /// activation flags are administrator-only.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        changes: UserChanges,
        principal: &Principal,
    ) -> ServiceResult<User> {
        reject_blank(&[
            ("username", &changes.username),
            ("email", &changes.email),
            ("password", &changes.password),
        ])?;
        ensure(principal, &ResourceRef::account(user_id), Action::Update)?;
        if changes.is_admin.is_some() || changes.is_active.is_some() {
            require_admin(principal)?;
        }

        let password_hash = match changes.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let mut tx = self.db.begin().await?;
        let mut user = fetch_by_id(&mut tx, user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;

        let username = changes.username.map(|u| u.trim().to_string());
        let email = changes.email.map(|e| e.trim().to_string());
        ensure_unique(
            &mut tx,
            username.as_deref().unwrap_or(&user.username),
            email.as_deref().unwrap_or(&user.email),
            Some(user.id),
        )
        .await?;

        if let Some(username) = username {
            user.username = username;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        if let Some(is_admin) = changes.is_admin {
            user.is_admin = is_admin;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();

        save_user(&mut tx, &user).await?;
        tx.commit().await?;

        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Flip `is_active`. Administrators only.
    pub async fn toggle_user_status(
        &self,
        user_id: Uuid,
        principal: &Principal,
    ) -> ServiceResult<User> {
        require_admin(principal)?;

        let mut tx = self.db.begin().await?;
        let mut user = fetch_by_id(&mut tx, user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;
        user.is_active = !user.is_active;
        user.updated_at = Utc::now();
        save_user(&mut tx, &user).await?;
        tx.commit().await?;

        info!(user_id = %user.id, is_active = user.is_active, "user status toggled");
        Ok(user)
    }

    /// Delete an account and, through the store's cascade, all of its assets
    /// and wills. Administrators only, and never their own account.
    pub async fn delete_user(&self, user_id: Uuid, principal: &Principal) -> ServiceResult<()> {
        ensure(principal, &ResourceRef::account(user_id), Action::Delete)?;

        let mut tx = self.db.begin().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(hidden_missing(principal, "user"));
        }
        tx.commit().await?;

        info!(user_id = %user_id, "user deleted");
        Ok(())
    }
}

async fn fetch_by_id(conn: &mut SqliteConnection, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(conn)
        .await
}

async fn fetch_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(conn)
    .await
}

/// Report which of username / email is already held by another account.
async fn ensure_unique(
    conn: &mut SqliteConnection,
    username: &str,
    email: &str,
    except: Option<Uuid>,
) -> ServiceResult<()> {
    let username_taken: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *conn)
            .await?;
    if username_taken.is_some_and(|id| Some(id) != except) {
        return Err(ServiceError::Conflict { field: "username" });
    }

    let email_taken: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
    if email_taken.is_some_and(|id| Some(id) != except) {
        return Err(ServiceError::Conflict { field: "email" });
    }
    Ok(())
}

async fn insert_user(conn: &mut SqliteConnection, user: &User) -> ServiceResult<()> {
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, is_admin, is_active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.is_admin)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(conn)
    .await
    .map_err(store_error)?;
    Ok(())
}

async fn save_user(conn: &mut SqliteConnection, user: &User) -> ServiceResult<()> {
    sqlx::query(
        "UPDATE users SET username = ?, email = ?, password_hash = ?, is_admin = ?,
                is_active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.is_admin)
    .bind(user.is_active)
    .bind(user.updated_at)
    .bind(user.id)
    .execute(conn)
    .await
    .map_err(store_error)?;
    Ok(())
}

fn push_user_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &CollectionQuery<UserFilter>) {
    query.scope.push_sql(builder, ResourceKind::User);

    if let Some(search) = query.filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        builder.push(" AND (username LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR email LIKE ");
        builder.push_bind(pattern);
        builder.push(" ESCAPE '\\')");
    }

    match query.filter.status {
        Some(UserStatusFilter::Active) => {
            builder.push(" AND is_active = 1");
        }
        Some(UserStatusFilter::Inactive) => {
            builder.push(" AND is_active = 0");
        }
        Some(UserStatusFilter::Admin) => {
            builder.push(" AND is_admin = 1");
        }
        None => {}
    }
}
