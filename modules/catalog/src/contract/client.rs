use async_trait::async_trait;
use query_core::{PagedQuery, PagedResult};

use crate::contract::model::{Category, NewCategory, NewProduct, Product, ProductPatch};

/// Public API of the catalog module. Errors downcast to
/// [`CatalogError`](crate::contract::error::CatalogError).
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_products(&self, query: PagedQuery) -> anyhow::Result<PagedResult<Product>>;

    async fn get_product(&self, id: i64) -> anyhow::Result<Product>;

    async fn create_product(&self, new_product: NewProduct) -> anyhow::Result<Product>;

    async fn update_product(&self, id: i64, patch: ProductPatch) -> anyhow::Result<Product>;

    /// Soft delete; the product disappears from every read.
    async fn delete_product(&self, id: i64) -> anyhow::Result<()>;

    async fn list_categories(&self, query: PagedQuery) -> anyhow::Result<PagedResult<Category>>;

    async fn create_category(&self, new_category: NewCategory) -> anyhow::Result<Category>;
}
