//! SeaORM-backed implementation of the catalog repository port.
//!
//! Generic over `C: ConnectionTrait`, so it can be built on a
//! `DatabaseConnection` or on an open transaction. Every read goes through
//! the generic [`Repository`] and its specification engine; the live-product
//! predicate is ANDed into each specification.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use query_core::{PagedQuery, PagedResult};
use resto_db::query::{FieldMap, Specification};
use resto_db::{RepoError, Repository, UnitOfWork};
use sea_orm::{ColumnTrait, ConnectionTrait, TransactionTrait};

use crate::contract::model::{Category, NewCategory, NewProduct, Product};
use crate::domain::repo::CatalogRepository;
use crate::infra::storage::entity::{category, product};
use crate::infra::storage::mapper::{new_category_am, new_product_am, product_to_model};

pub struct SeaOrmCatalogRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
    products: FieldMap<product::Entity>,
    categories: FieldMap<category::Entity>,
}

impl<C> SeaOrmCatalogRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            products: FieldMap::from_entity()
                .hide("isDeleted")
                .searchable(["name", "description"]),
            categories: FieldMap::from_entity().searchable(["name", "description"]),
        }
    }

    fn products(&self) -> Repository<'_, product::Entity, C> {
        Repository::new(&self.conn)
    }

    fn categories(&self) -> Repository<'_, category::Entity, C> {
        Repository::new(&self.conn)
    }

    fn live_product(&self, id: i64) -> Result<Specification<product::Entity>, RepoError> {
        Ok(Specification::builder()
            .criteria(product::Column::Id.eq(id))
            .criteria(product::Column::IsDeleted.eq(false))
            .build()?)
    }
}

#[async_trait]
impl<C> CatalogRepository for SeaOrmCatalogRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn list_products(&self, query: &PagedQuery) -> Result<PagedResult<Product>, RepoError> {
        let spec = Specification::builder()
            .criteria(product::Column::IsDeleted.eq(false))
            .filters(&self.products, &query.filters)
            .search(&self.products, query.search.as_deref())
            .order_by(&self.products, query.order_by.as_deref(), query.descending)
            .build()?;
        let page = self
            .products()
            .get_paged_by_specification(&spec, query.page_number, query.page_size)
            .await?;
        Ok(page.map_items(Product::from))
    }

    async fn find_product(&self, id: i64) -> Result<Option<Product>, RepoError> {
        let spec = self.live_product(id)?;
        let found = self.products().first_by_specification(&spec).await?;
        Ok(found.map(Into::into))
    }

    async fn insert_product(
        &self,
        p: NewProduct,
        at: DateTime<Utc>,
    ) -> Result<Product, RepoError> {
        let m = self.products().add(new_product_am(p, at)).await?;
        Ok(m.into())
    }

    async fn update_product(&self, p: Product) -> Result<Option<Product>, RepoError> {
        let m = self
            .products()
            .update_where(product_to_model(p), product::Column::IsDeleted.eq(false))
            .await?;
        Ok(m.map(Into::into))
    }

    async fn soft_delete_product(&self, id: i64, at: DateTime<Utc>) -> Result<bool, RepoError> {
        let spec = self.live_product(id)?;
        let Some(mut m) = self.products().first_by_specification(&spec).await? else {
            return Ok(false);
        };
        m.is_deleted = true;
        m.updated_at = at;
        self.products().update(m).await?;
        Ok(true)
    }

    async fn count_products(&self) -> Result<u64, RepoError> {
        let spec = Specification::builder()
            .criteria(product::Column::IsDeleted.eq(false))
            .build()?;
        self.products().count(&spec).await
    }

    async fn list_categories(
        &self,
        query: &PagedQuery,
    ) -> Result<PagedResult<Category>, RepoError> {
        let page = self.categories().query_page(query, &self.categories).await?;
        Ok(page.map_items(Category::from))
    }

    async fn category_exists(&self, id: i64) -> Result<bool, RepoError> {
        self.categories()
            .exists_where(category::Column::Id.eq(id))
            .await
    }

    async fn category_name_exists(&self, name: &str) -> Result<bool, RepoError> {
        self.categories()
            .exists_where(category::Column::Name.eq(name))
            .await
    }

    async fn insert_category(&self, c: NewCategory) -> Result<Category, RepoError> {
        let m = self.categories().add(new_category_am(c)).await?;
        Ok(m.into())
    }

    async fn insert_batch(
        &self,
        categories: Vec<NewCategory>,
        products: Vec<(usize, NewProduct)>,
        at: DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        let uow = UnitOfWork::new(self.conn.begin().await?);

        let mut ids = Vec::with_capacity(categories.len());
        for c in categories {
            let m = uow.repo::<category::Entity>().add(new_category_am(c)).await?;
            ids.push(m.id);
        }

        let mut rows = Vec::with_capacity(products.len());
        for (idx, mut p) in products {
            // unknown positions keep the caller's category_id
            if let Some(id) = ids.get(idx) {
                p.category_id = *id;
            }
            rows.push(new_product_am(p, at));
        }
        let written = uow.repo::<product::Entity>().add_range(rows).await?;

        uow.commit().await?;
        Ok(ids.len() as u64 + written)
    }
}
