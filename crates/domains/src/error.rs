//! # AppError
//!
//! Centralized error handling for the movie catalog.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g. Movie, Actor, Review). Draft movies report this too.
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g. star outside the scale, empty review text)
    #[error("validation error: {0}")]
    Validation(String),

    /// Infrastructure failure (e.g. DB down)
    #[error("internal service error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound(entity.to_string(), id.to_string())
    }
}

/// A specialized Result type for catalog logic.
pub type Result<T> = std::result::Result<T, AppError>;
