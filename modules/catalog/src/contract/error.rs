use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal error")]
    Internal,
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}
