use resto_db::RepoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Product not found: {id}")]
    ProductNotFound { id: i64 },

    #[error("Category not found: {id}")]
    CategoryNotFound { id: i64 },

    #[error("Category '{name}' already exists")]
    CategoryAlreadyExists { name: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn product_not_found(id: i64) -> Self {
        Self::ProductNotFound { id }
    }

    pub fn category_not_found(id: i64) -> Self {
        Self::CategoryNotFound { id }
    }

    pub fn category_already_exists(name: impl Into<String>) -> Self {
        Self::CategoryAlreadyExists { name: name.into() }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<RepoError> for DomainError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::InvalidQuery(q) => Self::invalid_query(q.to_string()),
            RepoError::PersistenceFailure(db) => Self::database(db.to_string()),
            RepoError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<query_core::Error> for DomainError {
    fn from(e: query_core::Error) -> Self {
        Self::invalid_query(e.to_string())
    }
}
