//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} not found: {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Slug already in use: {0}")]
    DuplicateSlug(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn post_not_found(key: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Post",
            key: key.to_string(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Slug already in use: {0}")]
    DuplicateSlug(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "Post",
                key: "unknown".to_string(),
            },
            RepoError::DuplicateSlug(slug) => DomainError::DuplicateSlug(slug),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}
