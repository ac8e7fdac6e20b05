//! Dynamic query engine: [`query_core`] request types → SeaORM `Select<E>`.
//!
//! - [`fields`]: per-entity registry mapping request property names to columns
//! - [`filter`]: `(column, match mode, value)` → `Condition`
//! - [`sort`]: property name → [`OrderSpecification`]
//! - [`spec`]: immutable [`Specification`] combining the above with eager loads

pub mod fields;
pub mod filter;
pub mod sort;
pub mod spec;

pub use fields::{Field, FieldKind, FieldMap};
pub use filter::{filter_condition, filters_to_condition, search_condition};
pub use sort::OrderSpecification;
pub use spec::{Specification, SpecificationBuilder};

use sea_orm::EntityTrait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("property '{property}' not found on '{entity}'")]
    PropertyNotFound { entity: String, property: String },

    #[error("unknown include '{name}' for '{entity}'")]
    UnknownInclude { entity: String, name: String },

    #[error(transparent)]
    InvalidPage(#[from] query_core::Error),
}

impl QueryError {
    pub(crate) fn property_not_found<E: EntityTrait>(property: &str) -> Self {
        QueryError::PropertyNotFound {
            entity: entity_name::<E>(),
            property: property.to_string(),
        }
    }

    pub(crate) fn unknown_include<E: EntityTrait>(name: &str) -> Self {
        QueryError::UnknownInclude {
            entity: entity_name::<E>(),
            name: name.to_string(),
        }
    }
}

pub(crate) fn entity_name<E: EntityTrait>() -> String {
    E::default().table_name().to_string()
}

#[cfg(test)]
pub(crate) mod test_entities;
