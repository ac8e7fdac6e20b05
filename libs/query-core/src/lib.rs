//! Transport-neutral request and response types for paged, filtered listings.
//!
//! Nothing in here knows about a database. Callers parse raw input into
//! [`FilterField`]s and a [`PagedQuery`]; the storage layer turns them into
//! predicates and answers with a [`PagedResult`].

pub mod filter;
pub mod page;

pub use filter::{DynamicValue, FilterField, FilterMap, MatchMode};
pub use page::{PageLimits, PagedQuery, PagedResult, SortDir};

use thiserror::Error;

/// Errors raised while turning raw input into query types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown match mode: {0}")]
    UnknownMatchMode(String),

    #[error("invalid filter expression '{0}', expected <field>:<matchMode>:<value>")]
    InvalidFilterExpr(String),

    #[error("page number must be >= 1")]
    InvalidPageNumber,

    #[error("page size must be between 1 and 9223372036854775807")]
    InvalidPageSize,
}

pub type Result<T> = std::result::Result<T, Error>;
