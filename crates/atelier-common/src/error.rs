//! Error types for the Atelier storefront
//!
//! Provides a unified error type. The experience core only ever produces
//! `NotFound`; the remaining variants belong to infrastructure and the
//! HTTP layer.

use thiserror::Error;

/// Result type alias using AtelierError
pub type Result<T> = std::result::Result<T, AtelierError>;

/// Unified error type for Atelier operations
#[derive(Debug, Error)]
pub enum AtelierError {
    // Unknown session or product
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    // Rejected input
    #[error("Validation error: {0}")]
    Validation(String),

    // Too many requests from one client
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // Failure reported by an external collaborator (webhook relay)
    #[error("Upstream error: {0}")]
    Upstream(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AtelierError {
    /// Unknown session identifier
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Session",
            id: id.into(),
        }
    }

    /// Unknown product identifier
    pub fn product_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Product",
            id: id.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// Implement From for common external error types
impl From<serde_json::Error> for AtelierError {
    fn from(err: serde_json::Error) -> Self {
        AtelierError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for AtelierError {
    fn from(err: anyhow::Error) -> Self {
        AtelierError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = AtelierError::session_not_found("abc-123");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Session not found: abc-123");

        let err = AtelierError::product_not_found("p9");
        assert_eq!(err.to_string(), "Product not found: p9");
    }

    #[test]
    fn test_rate_limited_display() {
        let err = AtelierError::RateLimited { retry_after_secs: 30 };
        assert!(err.to_string().contains("30s"));
        assert!(!err.is_not_found());
    }
}
