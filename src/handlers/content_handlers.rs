//! Reference data endpoints: platform policies, FAQ and stories.
//! Reads are open to anonymous callers; writes need an administrator,
//! except story submission.

use crate::{
    access::Principal,
    errors::AppError,
    models::{
        faq::Faq,
        policy::PlatformPolicy,
        story::{Story, StoryStatus},
    },
    services::{
        AppState,
        content_service::{FaqInput, InheritanceGuide, NewStory, PolicyInput},
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct PolicyQuery {
    /// Exact platform name lookup.
    pub platform: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GuideQuery {
    pub scenario: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoryQuery {
    pub status: Option<StoryStatus>,
}

/// GET `/policies`, or `/policies?platform=微信` for a single entry.
pub async fn list_policies(
    State(state): State<AppState>,
    Query(q): Query<PolicyQuery>,
) -> Result<Json<Vec<PlatformPolicy>>, AppError> {
    let policies = match q.platform.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(platform) => vec![state.content.find_policy(platform).await?],
        None => state.content.list_policies().await?,
    };
    Ok(Json(policies))
}

pub async fn get_policy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlatformPolicy>, AppError> {
    Ok(Json(state.content.get_policy(id).await?))
}

/// GET `/policies/{platform}/guide?scenario=will-only`
pub async fn inheritance_guide(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    Query(q): Query<GuideQuery>,
) -> Result<Json<InheritanceGuide>, AppError> {
    let scenario = q.scenario.unwrap_or_default();
    Ok(Json(state.content.inheritance_steps(&platform, &scenario).await?))
}

pub async fn create_policy(
    State(state): State<AppState>,
    principal: Principal,
    Json(input): Json<PolicyInput>,
) -> Result<impl IntoResponse, AppError> {
    let policy = state.content.create_policy(input, &principal).await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

pub async fn update_policy(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(input): Json<PolicyInput>,
) -> Result<Json<PlatformPolicy>, AppError> {
    Ok(Json(state.content.update_policy(id, input, &principal).await?))
}

pub async fn delete_policy(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.content.delete_policy(id, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_faqs(State(state): State<AppState>) -> Result<Json<Vec<Faq>>, AppError> {
    Ok(Json(state.content.list_faqs().await?))
}

pub async fn get_faq(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Faq>, AppError> {
    Ok(Json(state.content.get_faq(id).await?))
}

pub async fn create_faq(
    State(state): State<AppState>,
    principal: Principal,
    Json(input): Json<FaqInput>,
) -> Result<impl IntoResponse, AppError> {
    let faq = state.content.create_faq(input, &principal).await?;
    Ok((StatusCode::CREATED, Json(faq)))
}

pub async fn update_faq(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(input): Json<FaqInput>,
) -> Result<Json<Faq>, AppError> {
    Ok(Json(state.content.update_faq(id, input, &principal).await?))
}

pub async fn delete_faq(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.content.delete_faq(id, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/stories` — approved stories; administrators may pass `?status=`.
pub async fn list_stories(
    State(state): State<AppState>,
    principal: Principal,
    Query(q): Query<StoryQuery>,
) -> Result<Json<Vec<Story>>, AppError> {
    Ok(Json(state.content.list_stories(&principal, q.status).await?))
}

pub async fn get_story(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<Story>, AppError> {
    Ok(Json(state.content.get_story(id, &principal).await?))
}

pub async fn submit_story(
    State(state): State<AppState>,
    principal: Principal,
    Json(input): Json<NewStory>,
) -> Result<impl IntoResponse, AppError> {
    let story = state.content.submit_story(input, &principal).await?;
    Ok((StatusCode::CREATED, Json(story)))
}

pub async fn approve_story(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<Story>, AppError> {
    Ok(Json(state.content.approve_story(id, &principal).await?))
}

pub async fn reject_story(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<Story>, AppError> {
    Ok(Json(state.content.reject_story(id, &principal).await?))
}

pub async fn delete_story(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.content.delete_story(id, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}
