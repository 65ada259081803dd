//! Account endpoints.

use super::ListQuery;
use crate::{
    access::{CollectionQuery, Page, Principal},
    errors::AppError,
    models::user::User,
    services::{
        AppState,
        user_service::{NewUser, UserChanges, UserFilter, UserStatusFilter},
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// POST `/users` — register. Administrators may also create admin or
/// inactive accounts here.
pub async fn create_user(
    State(state): State<AppState>,
    principal: Principal,
    Json(input): Json<NewUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.create_user(&principal, input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET `/users` — `?search=&status=active|inactive|admin&page=&per_page=`
pub async fn list_users(
    State(state): State<AppState>,
    principal: Principal,
    Query(q): Query<ListQuery>,
) -> Result<Json<Page<User>>, AppError> {
    let status = match q.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some("active") => Some(UserStatusFilter::Active),
        Some("inactive") => Some(UserStatusFilter::Inactive),
        Some("admin") => Some(UserStatusFilter::Admin),
        Some(other) => {
            return Err(AppError::bad_request(format!(
                "invalid status `{}`, must be one of: active, inactive, admin",
                other
            )));
        }
    };
    let filter = UserFilter {
        search: q.search(),
        status,
    };

    let page = state
        .users
        .list_users(&principal, CollectionQuery::new(filter, q.page_request()))
        .await?;
    Ok(Json(page))
}

pub async fn get_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get_user(id, &principal).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(changes): Json<UserChanges>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.update_user(id, changes, &principal).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.users.delete_user(id, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/users/{id}/toggle-status`
pub async fn toggle_user_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.toggle_user_status(id, &principal).await?))
}
