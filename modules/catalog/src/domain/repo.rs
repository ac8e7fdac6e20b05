use async_trait::async_trait;
use chrono::{DateTime, Utc};
use query_core::{PagedQuery, PagedResult};
use resto_db::RepoError;

use crate::contract::model::{Category, NewCategory, NewProduct, Product};

/// Port for the domain layer: persistence operations the catalog needs.
/// Soft-deleted products are invisible through every method.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Page of live products; filters, search and sort come from `query`.
    async fn list_products(&self, query: &PagedQuery) -> Result<PagedResult<Product>, RepoError>;

    async fn find_product(&self, id: i64) -> Result<Option<Product>, RepoError>;

    async fn insert_product(
        &self,
        p: NewProduct,
        at: DateTime<Utc>,
    ) -> Result<Product, RepoError>;

    /// Full-row replace of a live product. `None` when the product is gone
    /// or was soft-deleted since it was read.
    async fn update_product(&self, p: Product) -> Result<Option<Product>, RepoError>;

    /// Mark a live product deleted. `false` when there was nothing to delete.
    async fn soft_delete_product(&self, id: i64, at: DateTime<Utc>) -> Result<bool, RepoError>;

    async fn count_products(&self) -> Result<u64, RepoError>;

    async fn list_categories(&self, query: &PagedQuery)
        -> Result<PagedResult<Category>, RepoError>;

    async fn category_exists(&self, id: i64) -> Result<bool, RepoError>;

    async fn category_name_exists(&self, name: &str) -> Result<bool, RepoError>;

    async fn insert_category(&self, c: NewCategory) -> Result<Category, RepoError>;

    /// Insert categories and their products atomically. Products reference
    /// their category by position in `categories`. Returns rows written.
    async fn insert_batch(
        &self,
        categories: Vec<NewCategory>,
        products: Vec<(usize, NewProduct)>,
        at: DateTime<Utc>,
    ) -> Result<u64, RepoError>;
}
