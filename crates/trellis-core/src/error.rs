//! Error handling for the Trellis core
//!
//! The store itself has almost nothing that can fail: duplicate inserts and
//! empty results are values, not errors, and nothing propagates through the
//! reactive channels. What remains is detectable misuse, reported
//! synchronously at the point of query construction.

use crate::types::Pattern;
use thiserror::Error;

/// Structured error type for Trellis core operations
#[derive(Error, Debug, Clone)]
pub enum TrellisError {
    /// Query construction misuse, e.g. a parametric query without variables
    #[error("Invalid query: {message}")]
    InvalidQuery {
        message: String,
        pattern: Option<String>,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        component: Option<String>,
    },
}

impl TrellisError {
    /// Error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            TrellisError::InvalidQuery { .. } => "invalid_query",
            TrellisError::Internal { .. } => "internal",
        }
    }

    /// Create an invalid-query error carrying the offending pattern
    pub fn invalid_query(message: impl Into<String>, pattern: &Pattern) -> Self {
        Self::InvalidQuery {
            message: message.into(),
            pattern: Some(pattern.to_string()),
        }
    }

    /// Create an internal error scoped to a component
    pub fn internal(message: impl Into<String>, component: &str) -> Self {
        Self::Internal {
            message: message.into(),
            component: Some(component.to_string()),
        }
    }
}

/// Result type alias for Trellis core operations
pub type TrellisResult<T> = Result<T, TrellisError>;
