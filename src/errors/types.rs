//! Error type definitions for ServiceAtlas
//!
//! This module defines the error hierarchy used throughout the application.
//! The HTTP surface maps each [`AppError`] variant to the status code
//! documented in the API reference; everything else propagates as a plain
//! 500 with the storage error elided from the response body.

use thiserror::Error;

/// Top-level application error type.
///
/// Business operations return `Result<T, AppError>`; the web layer is the
/// only place that turns a variant into an HTTP status.
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced entity does not exist. Maps to 404.
    #[error("not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Referential integrity or role violation (e.g. gateway_service_id does
    /// not reference an `is_gateway` service). Maps to 400.
    #[error("precondition failed: {message}")]
    Precondition { message: String },

    /// Caller is not permitted to perform the action. Maps to 403.
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// Database errors from sqlx, always fatal to the request. Maps to 500.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON (de)serialization failures in stored metadata columns. Maps to 500.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else unexpected. Maps to 500.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn precondition<M: Into<String>>(message: M) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    pub fn forbidden<M: Into<String>>(message: M) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
