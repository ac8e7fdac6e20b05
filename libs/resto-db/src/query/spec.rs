use std::fmt;

use query_core::{FilterMap, PagedQuery};
use sea_orm::{
    sea_query::IntoCondition, Condition, EntityTrait, Iterable, JoinType, QueryFilter, QuerySelect,
    RelationTrait, Select,
};

use super::fields::{normalize_name, FieldMap};
use super::filter::{filters_to_condition, search_condition};
use super::sort::OrderSpecification;
use super::QueryError;

/// Immutable query descriptor: criteria, eager loads and ordering.
///
/// Built with [`Specification::builder`]. Applying the same specification
/// twice yields the same statement, so one value serves both the count and
/// the page fetch.
pub struct Specification<E: EntityTrait> {
    criteria: Option<Condition>,
    includes: Vec<String>,
    order: OrderSpecification<E>,
}

impl<E: EntityTrait> Clone for Specification<E> {
    fn clone(&self) -> Self {
        Self {
            criteria: self.criteria.clone(),
            includes: self.includes.clone(),
            order: self.order,
        }
    }
}

impl<E: EntityTrait> fmt::Debug for Specification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("criteria", &self.criteria)
            .field("includes", &self.includes)
            .field("order", &self.order)
            .finish()
    }
}

impl<E: EntityTrait> Default for Specification<E> {
    fn default() -> Self {
        Self {
            criteria: None,
            includes: Vec::new(),
            order: OrderSpecification::default(),
        }
    }
}

impl<E: EntityTrait> Specification<E> {
    pub fn builder() -> SpecificationBuilder<E> {
        SpecificationBuilder::new()
    }

    /// Filters, search term and ordering of a page request, resolved against `fmap`.
    pub fn from_paged_query(q: &PagedQuery, fmap: &FieldMap<E>) -> Result<Self, QueryError> {
        Self::builder()
            .filters(fmap, &q.filters)
            .search(fmap, q.search.as_deref())
            .order_by(fmap, q.order_by.as_deref(), q.descending)
            .build()
    }

    pub fn criteria(&self) -> Option<&Condition> {
        self.criteria.as_ref()
    }

    /// Normalised relation names, in declaration order.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn order(&self) -> &OrderSpecification<E> {
        &self.order
    }

    /// Criteria and eager loads, without ordering. Used for counts.
    pub fn apply_filters(&self, mut select: Select<E>) -> Select<E> {
        if let Some(c) = &self.criteria {
            select = select.filter(c.clone());
        }
        if !self.includes.is_empty() {
            for name in &self.includes {
                if let Some(rel) = find_relation::<E>(name) {
                    select = select.join(JoinType::LeftJoin, rel.def());
                }
            }
            // to-many joins would otherwise repeat root rows
            select = select.distinct();
        }
        select
    }

    /// Full application: criteria, eager loads, then ordering.
    pub fn apply(&self, select: Select<E>) -> Select<E> {
        self.order.apply(self.apply_filters(select))
    }
}

fn relation_name<R: fmt::Debug>(rel: &R) -> String {
    normalize_name(&format!("{rel:?}"))
}

fn find_relation<E: EntityTrait>(name: &str) -> Option<E::Relation> {
    E::Relation::iter().find(|r| relation_name(r) == name)
}

/// Accumulates criteria, eager loads and ordering; [`build`](Self::build)
/// reports the first resolution error.
pub struct SpecificationBuilder<E: EntityTrait> {
    criteria: Option<Condition>,
    includes: Vec<String>,
    order: OrderSpecification<E>,
    error: Option<QueryError>,
}

impl<E: EntityTrait> Default for SpecificationBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> SpecificationBuilder<E> {
    pub fn new() -> Self {
        Self {
            criteria: None,
            includes: Vec::new(),
            order: OrderSpecification::default(),
            error: None,
        }
    }

    fn fail(&mut self, err: QueryError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// AND a predicate into the criteria.
    #[must_use]
    pub fn criteria<F: IntoCondition>(mut self, cond: F) -> Self {
        self.criteria = Some(match self.criteria.take() {
            Some(c) => c.add(cond.into_condition()),
            None => Condition::all().add(cond.into_condition()),
        });
        self
    }

    /// AND the compiled dynamic filters into the criteria.
    #[must_use]
    pub fn filters(mut self, fmap: &FieldMap<E>, filters: &FilterMap) -> Self {
        match filters_to_condition(fmap, filters) {
            Ok(Some(c)) => self = self.criteria(c),
            Ok(None) => {}
            Err(e) => self.fail(e),
        }
        self
    }

    /// AND a free-text search over the map's searchable fields.
    #[must_use]
    pub fn search(mut self, fmap: &FieldMap<E>, term: Option<&str>) -> Self {
        if let Some(c) = term.and_then(|t| search_condition(fmap, t)) {
            self = self.criteria(c);
        }
        self
    }

    /// Eager-load a declared relation. Repeats are ignored.
    #[must_use]
    pub fn include(mut self, rel: E::Relation) -> Self {
        let name = relation_name(&rel);
        if !self.includes.contains(&name) {
            self.includes.push(name);
        }
        self
    }

    /// Eager-load a relation by name (`"category"`, `"Category"`).
    #[must_use]
    pub fn include_named(mut self, name: &str) -> Self {
        let key = normalize_name(name);
        match find_relation::<E>(&key) {
            Some(_) if self.includes.contains(&key) => {}
            Some(_) => self.includes.push(key),
            None => self.fail(QueryError::unknown_include::<E>(name)),
        }
        self
    }

    #[must_use]
    pub fn order(mut self, order: OrderSpecification<E>) -> Self {
        self.order = order;
        self
    }

    /// Resolve and set ordering by property name.
    #[must_use]
    pub fn order_by(mut self, fmap: &FieldMap<E>, property: Option<&str>, descending: bool) -> Self {
        match OrderSpecification::resolve(fmap, property, descending) {
            Ok(o) => self.order = o,
            Err(e) => self.fail(e),
        }
        self
    }

    pub fn build(self) -> Result<Specification<E>, QueryError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let spec = Specification {
            criteria: self.criteria,
            includes: self.includes,
            order: self.order,
        };
        tracing::debug!(?spec, "specification built");
        Ok(spec)
    }
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod spec_tests;
