use crate::{crypto::CryptoError, render::RenderError};
use thiserror::Error;

/// Failure taxonomy shared by every service operation.
///
/// `Forbidden` is deliberately uninformative: "not yours" and "does not
/// exist" look the same to a caller without rights. `Internal` keeps its
/// source for logging but displays only a generic message.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{field} already exists")]
    Conflict { field: &'static str },
    #[error("not permitted")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("internal error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn missing_fields(fields: &[&str]) -> Self {
        ServiceError::Validation(format!("missing required fields: {}", fields.join(", ")))
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Internal(Box::new(err))
    }
}

impl From<CryptoError> for ServiceError {
    fn from(err: CryptoError) -> Self {
        ServiceError::Internal(Box::new(err))
    }
}

impl From<RenderError> for ServiceError {
    fn from(err: RenderError) -> Self {
        ServiceError::Internal(Box::new(err))
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Internal(Box::new(err))
    }
}
