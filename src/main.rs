use anyhow::{Context, Result};
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod access;
mod config;
mod crypto;
mod db;
mod errors;
mod handlers;
mod models;
mod render;
mod routes;
mod services;

use crypto::{AesGcmCipher, Argon2Hasher};
use render::JsonWillRenderer;
use services::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting estate-keeper with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    let db = Arc::new(db::connect(&cfg.database_url).await?);

    // --- Schema (idempotent) ---
    db::run_migrations(&db)
        .await
        .context("applying database schema")?;
    if migrate {
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Collaborators ---
    let cipher = match cfg.encryption_key.as_deref() {
        Some(key) => AesGcmCipher::from_base64(key).context("loading ESTATE_ENCRYPTION_KEY")?,
        None => {
            let (cipher, key) = AesGcmCipher::generate()?;
            tracing::warn!(
                "ESTATE_ENCRYPTION_KEY not set, generated a temporary key. Stored credentials \
                 will be unreadable after restart"
            );
            if cfg.print_generated_key {
                eprintln!("ESTATE_ENCRYPTION_KEY={}", key);
            }
            cipher
        }
    };

    let state = AppState::new(
        db,
        Arc::new(cipher),
        Arc::new(Argon2Hasher::default()),
        Arc::new(JsonWillRenderer),
    );

    if let Some(admin) = cfg.admin.as_ref() {
        let user = state
            .users
            .bootstrap_user(&admin.username, &admin.email, &admin.password, true)
            .await
            .context("creating bootstrap administrator")?;
        tracing::info!(user_id = %user.id, username = %user.username, "administrator ready");
    }

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
