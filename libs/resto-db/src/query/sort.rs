use std::fmt;

use query_core::SortDir;
use sea_orm::{
    sea_query::Order, EntityTrait, IdenStatic, Iterable, PrimaryKeyToColumn, QueryOrder, Select,
};

use super::fields::FieldMap;
use super::QueryError;

/// Requested ordering: an optional column plus direction.
///
/// Applying it always appends every primary-key column ascending after the
/// requested column, so equal sort keys still page deterministically and an
/// empty specification falls back to primary-key order.
pub struct OrderSpecification<E: EntityTrait> {
    pub order_by: Option<E::Column>,
    pub descending: bool,
}

impl<E: EntityTrait> Clone for OrderSpecification<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: EntityTrait> Copy for OrderSpecification<E> {}

impl<E: EntityTrait> Default for OrderSpecification<E> {
    fn default() -> Self {
        Self {
            order_by: None,
            descending: false,
        }
    }
}

impl<E: EntityTrait> fmt::Debug for OrderSpecification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderSpecification")
            .field("order_by", &self.order_by.map(|c| c.as_str().to_owned()))
            .field("descending", &self.descending)
            .finish()
    }
}

impl<E: EntityTrait> OrderSpecification<E> {
    pub fn new(order_by: Option<E::Column>, descending: bool) -> Self {
        Self {
            order_by,
            descending,
        }
    }

    pub fn asc(col: E::Column) -> Self {
        Self::new(Some(col), false)
    }

    pub fn desc(col: E::Column) -> Self {
        Self::new(Some(col), true)
    }

    pub fn dir(&self) -> SortDir {
        SortDir::from_descending(self.descending)
    }

    /// Resolve a property name (case-insensitive, see [`FieldMap`]) into an ordering.
    ///
    /// `None` or a blank name means "default order". Unknown names are
    /// [`QueryError::PropertyNotFound`].
    pub fn resolve(
        fmap: &FieldMap<E>,
        property: Option<&str>,
        descending: bool,
    ) -> Result<Self, QueryError> {
        let Some(name) = property.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::new(None, descending));
        };
        let field = fmap.resolve(name)?;
        tracing::debug!(property = name, column = field.col.as_str(), descending, "sort resolved");
        Ok(Self::new(Some(field.col), descending))
    }

    /// Apply ORDER BY: requested column first, then the primary key ascending.
    pub fn apply(&self, mut select: Select<E>) -> Select<E> {
        if let Some(col) = self.order_by {
            let ord = if self.descending {
                Order::Desc
            } else {
                Order::Asc
            };
            select = select.order_by(col, ord);
        }
        for pk in E::PrimaryKey::iter() {
            let pk_col = pk.into_column();
            if self.order_by.is_some_and(|c| c.as_str() == pk_col.as_str()) {
                continue;
            }
            select = select.order_by(pk_col, Order::Asc);
        }
        select
    }
}
