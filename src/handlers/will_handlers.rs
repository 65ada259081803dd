//! Digital will endpoints.

use super::{ListQuery, asset_handlers::owner_or_self};
use crate::{
    access::{CollectionQuery, Page, Principal},
    errors::AppError,
    models::will::{DigitalWill, WillStatus},
    services::{
        AppState,
        will_service::{NewWill, WillChanges, WillFilter},
    },
};
use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateWillReq {
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub will: NewWill,
}

#[derive(Debug, Deserialize)]
pub struct StatusReq {
    pub status: String,
}

pub async fn create_will(
    State(state): State<AppState>,
    principal: Principal,
    Json(req): Json<CreateWillReq>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = owner_or_self(req.user_id, &principal)?;
    let will = state
        .wills
        .create_will(owner_id, req.will, &principal)
        .await?;
    Ok((StatusCode::CREATED, Json(will)))
}

/// GET `/wills` — `?search=&status=&page=&per_page=`
pub async fn list_wills(
    State(state): State<AppState>,
    principal: Principal,
    Query(q): Query<ListQuery>,
) -> Result<Json<Page<DigitalWill>>, AppError> {
    let status = q
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<WillStatus>)
        .transpose()
        .map_err(AppError::bad_request)?;
    let filter = WillFilter {
        search: q.search(),
        status,
    };

    let page = state
        .wills
        .list_wills(&principal, CollectionQuery::new(filter, q.page_request()))
        .await?;
    Ok(Json(page))
}

pub async fn get_will(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<DigitalWill>, AppError> {
    Ok(Json(state.wills.get_will(id, &principal).await?))
}

pub async fn update_will(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(changes): Json<WillChanges>,
) -> Result<Json<DigitalWill>, AppError> {
    Ok(Json(
        state
            .wills
            .update_will_content(id, changes, &principal)
            .await?,
    ))
}

/// PUT `/wills/{id}/status` with `{"status": "confirmed"}`
pub async fn set_will_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusReq>,
) -> Result<Json<DigitalWill>, AppError> {
    Ok(Json(
        state
            .wills
            .transition_will_status(id, &req.status, &principal)
            .await?,
    ))
}

pub async fn delete_will(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.wills.delete_will(id, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/wills/{id}/export` — the rendered artifact as a download.
pub async fn export_will(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let artifact = state.wills.export_will(id, &principal).await?;

    let mut response = Response::new(Body::from(artifact.bytes));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(artifact.content_type),
    );
    if let Ok(value) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", artifact.file_name))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    *response.status_mut() = StatusCode::OK;
    Ok(response)
}
