//! Core data models for the digital estate service.
//!
//! Owned records (`DigitalAsset`, `DigitalWill`) hang off a `User` and are
//! removed with it by the store's cascade. Reference content
//! (`PlatformPolicy`, `Faq`, `Story`) has no owner. Every row maps to a table
//! via `sqlx::FromRow` and serializes as JSON via `serde`.

pub mod asset;
pub mod faq;
pub mod guide;
pub mod policy;
pub mod story;
pub mod user;
pub mod will;
