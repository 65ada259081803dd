//! Digital asset endpoints. Credentials are never returned except through
//! the explicit reveal endpoint.

use super::ListQuery;
use crate::{
    access::{CollectionQuery, Page, Principal},
    errors::AppError,
    models::asset::{AssetCategory, DigitalAsset},
    services::{
        AppState,
        asset_service::{AssetChanges, AssetFilter, NewAsset},
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of POST `/assets`. `user_id` defaults to the caller; only
/// administrators may name someone else.
#[derive(Debug, Deserialize)]
pub struct CreateAssetReq {
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub asset: NewAsset,
}

#[derive(Debug, Serialize)]
pub struct RevealedPassword {
    pub password: Option<String>,
}

pub async fn create_asset(
    State(state): State<AppState>,
    principal: Principal,
    Json(req): Json<CreateAssetReq>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = owner_or_self(req.user_id, &principal)?;
    let asset = state
        .assets
        .create_asset(owner_id, req.asset, &principal)
        .await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// GET `/assets` — `?search=&category=&page=&per_page=`
pub async fn list_assets(
    State(state): State<AppState>,
    principal: Principal,
    Query(q): Query<ListQuery>,
) -> Result<Json<Page<DigitalAsset>>, AppError> {
    let category = q
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(str::parse::<AssetCategory>)
        .transpose()
        .map_err(AppError::bad_request)?;
    let filter = AssetFilter {
        search: q.search(),
        category,
    };

    let page = state
        .assets
        .list_assets(&principal, CollectionQuery::new(filter, q.page_request()))
        .await?;
    Ok(Json(page))
}

pub async fn get_asset(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<DigitalAsset>, AppError> {
    Ok(Json(state.assets.get_asset(id, &principal).await?))
}

pub async fn update_asset(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(changes): Json<AssetChanges>,
) -> Result<Json<DigitalAsset>, AppError> {
    Ok(Json(state.assets.update_asset(id, changes, &principal).await?))
}

pub async fn delete_asset(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.assets.delete_asset(id, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/assets/{id}/reveal`
pub async fn reveal_password(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<RevealedPassword>, AppError> {
    let password = state.assets.reveal_password(id, &principal).await?;
    Ok(Json(RevealedPassword { password }))
}

/// The owner named in a create request, or the caller themself.
pub(super) fn owner_or_self(
    requested: Option<Uuid>,
    principal: &Principal,
) -> Result<Uuid, AppError> {
    match (requested, principal.id()) {
        (Some(owner), _) => Ok(owner),
        (None, Some(id)) => Ok(id),
        (None, None) => Err(AppError::unauthorized()),
    }
}
