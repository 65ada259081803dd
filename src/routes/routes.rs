//! Route table.
//!
//! ## Structure
//! - **Health**: `GET /healthz`, `GET /readyz`
//! - **Accounts**
//!   - `POST /users` register, `GET /users` list
//!   - `GET | PATCH | DELETE /users/{id}`
//!   - `POST /users/{id}/toggle-status`
//! - **Assets**
//!   - `POST /assets`, `GET /assets`
//!   - `GET | PATCH | DELETE /assets/{id}`
//!   - `POST /assets/{id}/reveal` decrypts the stored credential
//! - **Wills**
//!   - `POST /wills`, `GET /wills`
//!   - `GET | PATCH | DELETE /wills/{id}`
//!   - `PUT /wills/{id}/status`, `GET /wills/{id}/export`
//! - **Reference data**
//!   - `/policies`, `/policies/{id}`, `/faqs`, `/faqs/{id}`
//!   - `GET /policies/{platform}/guide?scenario=` inheritance steps
//!   - `/stories`, `/stories/{id}`, `POST /stories/{id}/approve|reject`
//! - **Console**: `GET /admin/stats`, `GET /admin/stats/charts`
//!
//! The caller is resolved per request from Basic credentials; see
//! `handlers::auth`.

use crate::{
    handlers::{
        asset_handlers, content_handlers,
        health_handlers::{healthz, readyz},
        stats_handlers, user_handlers, will_handlers,
    },
    services::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build the router for every endpoint. State is attached by the caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // accounts
        .route(
            "/users",
            post(user_handlers::create_user).get(user_handlers::list_users),
        )
        .route(
            "/users/{id}",
            get(user_handlers::get_user)
                .patch(user_handlers::update_user)
                .delete(user_handlers::delete_user),
        )
        .route(
            "/users/{id}/toggle-status",
            post(user_handlers::toggle_user_status),
        )
        // assets
        .route(
            "/assets",
            post(asset_handlers::create_asset).get(asset_handlers::list_assets),
        )
        .route(
            "/assets/{id}",
            get(asset_handlers::get_asset)
                .patch(asset_handlers::update_asset)
                .delete(asset_handlers::delete_asset),
        )
        .route("/assets/{id}/reveal", post(asset_handlers::reveal_password))
        // wills
        .route(
            "/wills",
            post(will_handlers::create_will).get(will_handlers::list_wills),
        )
        .route(
            "/wills/{id}",
            get(will_handlers::get_will)
                .patch(will_handlers::update_will)
                .delete(will_handlers::delete_will),
        )
        .route("/wills/{id}/status", put(will_handlers::set_will_status))
        .route("/wills/{id}/export", get(will_handlers::export_will))
        // reference data
        .route(
            "/policies",
            get(content_handlers::list_policies).post(content_handlers::create_policy),
        )
        .route(
            "/policies/{id}",
            get(content_handlers::get_policy)
                .patch(content_handlers::update_policy)
                .delete(content_handlers::delete_policy),
        )
        .route(
            "/policies/{id}/guide",
            get(content_handlers::inheritance_guide),
        )
        .route(
            "/faqs",
            get(content_handlers::list_faqs).post(content_handlers::create_faq),
        )
        .route(
            "/faqs/{id}",
            get(content_handlers::get_faq)
                .patch(content_handlers::update_faq)
                .delete(content_handlers::delete_faq),
        )
        .route(
            "/stories",
            get(content_handlers::list_stories).post(content_handlers::submit_story),
        )
        .route(
            "/stories/{id}",
            get(content_handlers::get_story).delete(content_handlers::delete_story),
        )
        .route(
            "/stories/{id}/approve",
            post(content_handlers::approve_story),
        )
        .route("/stories/{id}/reject", post(content_handlers::reject_story))
        // console
        .route("/admin/stats", get(stats_handlers::dashboard_stats))
        .route("/admin/stats/charts", get(stats_handlers::chart_series))
}
