use std::collections::HashMap;
use std::fmt;

use sea_orm::{sea_query::ColumnType, ColumnTrait, EntityTrait, IdenStatic, Iterable};

use super::QueryError;

/// Whitelisted field kind → decides how a filter value is coerced and which
/// match modes apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    I64,
    F64,
    Decimal,
    Bool,
    Uuid,
    Date,
    /// Naive timestamp; date modes compare the day portion.
    DateTime,
    /// UTC timestamp; date modes compare the UTC day.
    DateTimeUtc,
}

impl FieldKind {
    /// Map SeaORM column metadata to a kind. `None` means the column cannot
    /// take part in dynamic filtering or sorting.
    pub fn from_column_type(ty: &ColumnType) -> Option<Self> {
        Some(match ty {
            ColumnType::String(_) | ColumnType::Char(_) | ColumnType::Text => FieldKind::String,
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::TinyUnsigned
            | ColumnType::SmallUnsigned
            | ColumnType::Unsigned
            | ColumnType::BigUnsigned => FieldKind::I64,
            ColumnType::Float | ColumnType::Double => FieldKind::F64,
            ColumnType::Decimal(_) | ColumnType::Money(_) => FieldKind::Decimal,
            ColumnType::Boolean => FieldKind::Bool,
            ColumnType::Uuid => FieldKind::Uuid,
            ColumnType::Date => FieldKind::Date,
            ColumnType::DateTime | ColumnType::Timestamp => FieldKind::DateTime,
            ColumnType::TimestampWithTimeZone => FieldKind::DateTimeUtc,
            _ => return None,
        })
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            FieldKind::Date | FieldKind::DateTime | FieldKind::DateTimeUtc
        )
    }
}

/// Normalised lookup key: lower-case with underscores removed, so
/// `ProductName`, `product_name` and `productName` are the same property.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

pub struct Field<E: EntityTrait> {
    pub col: E::Column,
    pub kind: FieldKind,
}

impl<E: EntityTrait> Clone for Field<E> {
    fn clone(&self) -> Self {
        Self {
            col: self.col,
            kind: self.kind,
        }
    }
}

impl<E: EntityTrait> fmt::Debug for Field<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("col", &self.col.as_str())
            .field("kind", &self.kind)
            .finish()
    }
}

/// Property-name → column registry for one entity type.
///
/// Built once per entity (usually from the entity's own column metadata) and
/// shared by every query against that entity.
pub struct FieldMap<E: EntityTrait> {
    map: HashMap<String, Field<E>>,
    searchable: Vec<String>,
}

impl<E: EntityTrait> Clone for FieldMap<E> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
            searchable: self.searchable.clone(),
        }
    }
}

impl<E: EntityTrait> fmt::Debug for FieldMap<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMap")
            .field("fields", &self.map)
            .field("searchable", &self.searchable)
            .finish()
    }
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            searchable: Vec::new(),
        }
    }

    /// One entry per column whose type maps to a [`FieldKind`], keyed by the
    /// column's normalised name.
    pub fn from_entity() -> Self {
        let mut fm = Self::new();
        for col in E::Column::iter() {
            let def = col.def();
            match FieldKind::from_column_type(def.get_column_type()) {
                Some(kind) => {
                    fm.map.insert(normalize_name(col.as_str()), Field { col, kind });
                }
                None => tracing::trace!(
                    column = col.as_str(),
                    "column type not supported for dynamic queries"
                ),
            }
        }
        fm
    }

    /// Register `api_name` as an alias (or override) for `col`.
    pub fn insert(mut self, api_name: impl AsRef<str>, col: E::Column, kind: FieldKind) -> Self {
        self.map
            .insert(normalize_name(api_name.as_ref()), Field { col, kind });
        self
    }

    /// Drop a property so clients can neither filter nor sort on it.
    pub fn hide(mut self, api_name: impl AsRef<str>) -> Self {
        let key = normalize_name(api_name.as_ref());
        self.map.remove(&key);
        self.searchable.retain(|k| k != &key);
        self
    }

    /// Mark the named string properties as targets of the free-text search term.
    pub fn searchable<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let key = normalize_name(name.as_ref());
            match self.map.get(&key) {
                Some(f) if f.kind == FieldKind::String => {
                    if !self.searchable.contains(&key) {
                        self.searchable.push(key);
                    }
                }
                _ => tracing::warn!(
                    property = name.as_ref(),
                    "ignoring search property: not a known string column"
                ),
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field<E>> {
        self.map.get(&normalize_name(name))
    }

    /// Like [`get`](Self::get) but unknown names are a [`QueryError::PropertyNotFound`].
    pub fn resolve(&self, name: &str) -> Result<&Field<E>, QueryError> {
        self.get(name)
            .ok_or_else(|| QueryError::property_not_found::<E>(name))
    }

    /// Fields the free-text search term is matched against, in registration order.
    pub fn search_fields(&self) -> impl Iterator<Item = &Field<E>> {
        self.searchable.iter().filter_map(|k| self.map.get(k))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::test_entities::product;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("ProductName"), "productname");
        assert_eq!(normalize_name("product_name"), "productname");
        assert_eq!(normalize_name(" productName "), "productname");
    }

    #[test]
    fn test_from_entity_derives_kinds() {
        let fm = FieldMap::<product::Entity>::from_entity();
        assert_eq!(fm.get("id").unwrap().kind, FieldKind::I64);
        assert_eq!(fm.get("ProductName").unwrap().kind, FieldKind::String);
        assert_eq!(fm.get("description").unwrap().kind, FieldKind::String);
        assert_eq!(fm.get("product_price").unwrap().kind, FieldKind::F64);
        assert_eq!(fm.get("inStock").unwrap().kind, FieldKind::Bool);
        assert_eq!(fm.get("createdAt").unwrap().kind, FieldKind::DateTimeUtc);
        assert_eq!(fm.get("releasedOn").unwrap().kind, FieldKind::Date);
        assert!(fm.get("nope").is_none());
    }

    #[test]
    fn test_alias_and_searchable() {
        let fm = FieldMap::<product::Entity>::from_entity()
            .insert("name", product::Column::ProductName, FieldKind::String)
            .searchable(["name", "description", "product_price"]);
        assert_eq!(
            fm.get("Name").unwrap().col.as_str(),
            product::Column::ProductName.as_str()
        );
        // price is numeric, so only the two string fields take part
        assert_eq!(fm.search_fields().count(), 2);
    }

    #[test]
    fn test_hidden_property_is_unknown() {
        let fm = FieldMap::<product::Entity>::from_entity()
            .searchable(["productName", "description"])
            .hide("description");
        assert!(fm.get("description").is_none());
        assert_eq!(fm.search_fields().count(), 1);
        assert!(fm.resolve("description").is_err());
    }

    #[test]
    fn test_resolve_unknown_property() {
        let fm = FieldMap::<product::Entity>::from_entity();
        assert_eq!(
            fm.resolve("colour").unwrap_err(),
            QueryError::PropertyNotFound {
                entity: "products".into(),
                property: "colour".into()
            }
        );
    }
}
