//! Will export. The renderer receives a fully resolved will and its owner's
//! display fields and hands back a finished artifact.

use crate::models::will::DigitalWill;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("rendering failed: {0}")]
pub struct RenderError(String);

impl RenderError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Everything a renderer needs. Owner fields are display-only.
#[derive(Serialize, Debug, Clone)]
pub struct WillDocument {
    pub will: DigitalWill,
    pub owner_username: String,
    pub owner_email: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub content_type: &'static str,
    pub file_name: String,
    pub bytes: Bytes,
}

pub trait WillRenderer: Send + Sync {
    fn render(&self, document: &WillDocument) -> Result<RenderedArtifact, RenderError>;
}

/// Pretty-printed JSON export.
#[derive(Default)]
pub struct JsonWillRenderer;

impl WillRenderer for JsonWillRenderer {
    fn render(&self, document: &WillDocument) -> Result<RenderedArtifact, RenderError> {
        let body =
            serde_json::to_vec_pretty(document).map_err(|e| RenderError::new(e.to_string()))?;
        Ok(RenderedArtifact {
            content_type: "application/json",
            file_name: format!("will-{}.json", document.will.id),
            bytes: Bytes::from(body),
        })
    }
}
