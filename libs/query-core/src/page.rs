use serde::{Deserialize, Serialize};

use crate::filter::{DynamicValue, FilterField, FilterMap};
use crate::{Error, Result};

#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortDir::Desc
        } else {
            SortDir::Asc
        }
    }

    pub fn is_desc(self) -> bool {
        matches!(self, SortDir::Desc)
    }
}

/// Page size bounds applied to incoming requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: 10,
            max_size: 100,
        }
    }
}

impl PageLimits {
    /// Clamp a requested size into `1..=max_size`, falling back to the default.
    pub fn clamp(&self, requested: Option<u64>) -> u64 {
        let mut size = requested.unwrap_or(self.default_size);
        if size == 0 {
            size = 1;
        }
        if size > self.max_size {
            size = self.max_size.max(1);
        }
        size
    }
}

/// A page request: 1-based page number, page size, optional ordering,
/// free-text search term and per-column filters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PagedQuery {
    pub page_number: u64,
    pub page_size: u64,
    pub order_by: Option<String>,
    pub descending: bool,
    pub search: Option<String>,
    pub filters: FilterMap,
}

impl Default for PagedQuery {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: PageLimits::default().default_size,
            order_by: None,
            descending: false,
            search: None,
            filters: FilterMap::new(),
        }
    }
}

impl PagedQuery {
    pub fn new(page_number: u64, page_size: u64) -> Self {
        Self {
            page_number,
            page_size,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_order(mut self, order_by: impl Into<String>, descending: bool) -> Self {
        self.order_by = Some(order_by.into());
        self.descending = descending;
        self
    }

    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    #[must_use]
    pub fn with_filter(mut self, property: impl Into<String>, field: FilterField) -> Self {
        self.filters.insert(property.into(), field);
        self
    }

    pub fn sort_dir(&self) -> SortDir {
        SortDir::from_descending(self.descending)
    }

    /// Reject page 0 and clamp the page size into the configured bounds.
    pub fn validated(mut self, limits: PageLimits) -> Result<Self> {
        if self.page_number == 0 {
            return Err(Error::InvalidPageNumber);
        }
        self.page_size = limits.clamp(Some(self.page_size));
        Ok(self)
    }

    /// Parse the compact `<field>:<matchMode>:<value>` form.
    ///
    /// Only the first two separators are significant, so values may
    /// contain `:` (timestamps, URLs).
    pub fn parse_filter_param(raw: &str) -> Result<(String, FilterField)> {
        let mut parts = raw.splitn(3, ':');
        let (Some(field), Some(mode), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidFilterExpr(raw.to_string()));
        };
        let field = field.trim();
        if field.is_empty() {
            return Err(Error::InvalidFilterExpr(raw.to_string()));
        }
        let match_mode = mode.trim().parse()?;
        Ok((
            field.to_string(),
            FilterField {
                value: DynamicValue::parse(value),
                match_mode,
            },
        ))
    }

    pub fn push_filter_param(&mut self, raw: &str) -> Result<()> {
        let (field, filter) = Self::parse_filter_param(raw)?;
        self.filters.insert(field, filter);
        Ok(())
    }
}

/// Offset page envelope.
#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page_number: u64,
    pub page_size: u64,
    pub total_records: u64,
    pub total_pages: u64,
}

impl<T> PagedResult<T> {
    /// Build an envelope; `total_pages` is `ceil(total_records / page_size)`.
    pub fn new(items: Vec<T>, page_number: u64, page_size: u64, total_records: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_records.div_ceil(page_size)
        };
        Self {
            items,
            page_number,
            page_size,
            total_records,
            total_pages,
        }
    }

    /// Create an empty page carrying the request coordinates
    pub fn empty(page_number: u64, page_size: u64) -> Self {
        Self::new(Vec::new(), page_number, page_size, 0)
    }

    /// Map items while preserving page metadata (Domain->DTO mapping convenience)
    pub fn map_items<U>(self, mut f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(&mut f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_records: self.total_records,
            total_pages: self.total_pages,
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }
}
