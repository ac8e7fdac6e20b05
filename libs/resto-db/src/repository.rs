//! Generic repository: CRUD plus specification-aware queries for any SeaORM entity.
//!
//! A repository only borrows a connection (`DatabaseConnection` or an open
//! `DatabaseTransaction`); it holds no state between calls. Commit and
//! rollback belong to whoever owns the connection, see [`crate::UnitOfWork`].

use std::future::Future;
use std::marker::PhantomData;

use query_core::{PagedQuery, PagedResult};
use sea_orm::{
    sea_query::IntoCondition, ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, LoaderTrait, PaginatorTrait, PrimaryKeyTrait, QueryFilter, QuerySelect,
    Related, Select,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::query::{entity_name, FieldMap, OrderSpecification, QueryError, Specification};

#[derive(Debug, Error)]
pub enum RepoError {
    /// The request could not be turned into a query (unknown property, bad page).
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    /// The store rejected or failed the statement; passed through unchanged.
    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] DbErr),

    #[error("operation cancelled")]
    Cancelled,
}

pub struct Repository<'c, E, C>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    conn: &'c C,
    cancel: Option<CancellationToken>,
    _entity: PhantomData<fn() -> E>,
}

impl<'c, E, C> Repository<'c, E, C>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    pub fn new(conn: &'c C) -> Self {
        Self {
            conn,
            cancel: None,
            _entity: PhantomData,
        }
    }

    /// Abort in-flight statements with [`RepoError::Cancelled`] once `token` fires.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn conn(&self) -> &'c C {
        self.conn
    }
}

impl<'c, E, C> Repository<'c, E, C>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    async fn run<T, F>(&self, fut: F) -> Result<T, RepoError>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(entity = %entity_name::<E>(), "repository call cancelled");
                    Err(RepoError::Cancelled)
                }
                res = fut => res.map_err(RepoError::from),
            },
            None => fut.await.map_err(RepoError::from),
        }
    }

    /* ---------- reads ---------- */

    /// `None` when no row has this primary key.
    pub async fn get_by_id<K>(&self, id: K) -> Result<Option<E::Model>, RepoError>
    where
        K: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        self.run(E::find_by_id(id).one(self.conn)).await
    }

    /// Every row in primary-key order. Meant for small lookup tables only.
    pub async fn get_all(&self) -> Result<Vec<E::Model>, RepoError> {
        let select = OrderSpecification::<E>::default().apply(E::find());
        self.run(select.all(self.conn)).await
    }

    pub async fn get_by_specification(
        &self,
        spec: &Specification<E>,
    ) -> Result<Vec<E::Model>, RepoError> {
        self.run(spec.apply(E::find()).all(self.conn)).await
    }

    pub async fn first_by_specification(
        &self,
        spec: &Specification<E>,
    ) -> Result<Option<E::Model>, RepoError> {
        self.run(spec.apply(E::find()).one(self.conn)).await
    }

    /// Rows matching `spec`, each paired with its single related `R` row
    /// (belongs-to / has-one). Related rows come from one batched follow-up
    /// query keyed on the parents' foreign keys.
    pub async fn get_by_specification_with_one<R>(
        &self,
        spec: &Specification<E>,
    ) -> Result<Vec<(E::Model, Option<R::Model>)>, RepoError>
    where
        E: Related<R>,
        R: EntityTrait,
        R::Model: Send + Sync,
    {
        let models = self.run(spec.apply(E::find()).all(self.conn)).await?;
        let related = self.run(models.load_one(R::default(), self.conn)).await?;
        Ok(models.into_iter().zip(related).collect())
    }

    /// Rows matching `spec`, each paired with all of its related `R` rows (has-many).
    pub async fn get_by_specification_with_many<R>(
        &self,
        spec: &Specification<E>,
    ) -> Result<Vec<(E::Model, Vec<R::Model>)>, RepoError>
    where
        E: Related<R>,
        R: EntityTrait,
        R::Model: Send + Sync,
    {
        let models = self.run(spec.apply(E::find()).all(self.conn)).await?;
        let related = self.run(models.load_many(R::default(), self.conn)).await?;
        Ok(models.into_iter().zip(related).collect())
    }

    pub async fn count(&self, spec: &Specification<E>) -> Result<u64, RepoError> {
        self.run(spec.apply_filters(E::find()).count(self.conn)).await
    }

    pub async fn exists(&self, spec: &Specification<E>) -> Result<bool, RepoError> {
        let first = self
            .run(spec.apply_filters(E::find()).limit(1).one(self.conn))
            .await?;
        Ok(first.is_some())
    }

    pub async fn exists_where<F>(&self, cond: F) -> Result<bool, RepoError>
    where
        F: IntoCondition,
    {
        let first = self
            .run(E::find().filter(cond.into_condition()).limit(1).one(self.conn))
            .await?;
        Ok(first.is_some())
    }

    /* ---------- paging ---------- */

    /// Page over `base` (or the whole table), ordered by `order` with the
    /// primary key as tie-breaker. Count and fetch are two separate statements.
    pub async fn get_paged(
        &self,
        page_number: u64,
        page_size: u64,
        order: OrderSpecification<E>,
        base: Option<Select<E>>,
    ) -> Result<PagedResult<E::Model>, RepoError> {
        let filtered = base.unwrap_or_else(E::find);
        self.page_of(filtered, &order, page_number, page_size).await
    }

    pub async fn get_paged_by_specification(
        &self,
        spec: &Specification<E>,
        page_number: u64,
        page_size: u64,
    ) -> Result<PagedResult<E::Model>, RepoError> {
        let filtered = spec.apply_filters(E::find());
        self.page_of(filtered, spec.order(), page_number, page_size)
            .await
    }

    /// One page of `spec`, with the single related `R` row loaded for each item.
    pub async fn get_paged_by_specification_with_one<R>(
        &self,
        spec: &Specification<E>,
        page_number: u64,
        page_size: u64,
    ) -> Result<PagedResult<(E::Model, Option<R::Model>)>, RepoError>
    where
        E: Related<R>,
        R: EntityTrait,
        R::Model: Send + Sync,
    {
        let page = self
            .get_paged_by_specification(spec, page_number, page_size)
            .await?;
        let related = self
            .run(page.items.load_one(R::default(), self.conn))
            .await?;
        let mut related = related.into_iter();
        Ok(page.map_items(|m| (m, related.next().flatten())))
    }

    /// Resolve a page request against `fmap` and run it.
    pub async fn query_page(
        &self,
        q: &PagedQuery,
        fmap: &FieldMap<E>,
    ) -> Result<PagedResult<E::Model>, RepoError> {
        let spec = Specification::from_paged_query(q, fmap)?;
        self.get_paged_by_specification(&spec, q.page_number, q.page_size)
            .await
    }

    async fn page_of(
        &self,
        filtered: Select<E>,
        order: &OrderSpecification<E>,
        page_number: u64,
        page_size: u64,
    ) -> Result<PagedResult<E::Model>, RepoError> {
        if page_number == 0 {
            return Err(QueryError::from(query_core::Error::InvalidPageNumber).into());
        }
        // LIMIT/OFFSET bind as signed 64-bit integers.
        if page_size == 0 || page_size > i64::MAX as u64 {
            return Err(QueryError::from(query_core::Error::InvalidPageSize).into());
        }

        let total = self.run(filtered.clone().count(self.conn)).await?;
        let total_pages = total.div_ceil(page_size);
        if page_number > total_pages {
            tracing::debug!(
                entity = %entity_name::<E>(),
                page_number,
                total_pages,
                "page beyond last page, skipping fetch"
            );
            return Ok(PagedResult::new(Vec::new(), page_number, page_size, total));
        }

        let offset = (page_number - 1).saturating_mul(page_size);
        let items = self
            .run(
                order
                    .apply(filtered)
                    .offset(offset)
                    .limit(page_size)
                    .all(self.conn),
            )
            .await?;
        tracing::debug!(
            entity = %entity_name::<E>(),
            page_number,
            page_size,
            total,
            fetched = items.len(),
            "page fetched"
        );
        Ok(PagedResult::new(items, page_number, page_size, total))
    }

    /* ---------- writes ---------- */

    pub async fn add(&self, model: E::ActiveModel) -> Result<E::Model, RepoError>
    where
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        self.run(model.insert(self.conn)).await
    }

    /// Batch insert; returns the number of rows written. An empty batch is a no-op.
    pub async fn add_range(&self, models: Vec<E::ActiveModel>) -> Result<u64, RepoError>
    where
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    {
        if models.is_empty() {
            return Ok(0);
        }
        let n = models.len() as u64;
        self.run(E::insert_many(models).exec(self.conn)).await?;
        Ok(n)
    }

    /// Full-row replace: every column of `model` is written, whether or not it
    /// changed. A missing row is `PersistenceFailure(DbErr::RecordNotUpdated)`.
    pub async fn update(&self, model: E::Model) -> Result<E::Model, RepoError>
    where
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        let am: E::ActiveModel = model.into_active_model();
        let am = am.reset_all();
        self.run(am.update(self.conn)).await
    }

    /// Full-row replace that only applies while the row still satisfies `cond`.
    /// `None` when no row with this primary key matches.
    pub async fn update_where<F>(
        &self,
        model: E::Model,
        cond: F,
    ) -> Result<Option<E::Model>, RepoError>
    where
        F: IntoCondition,
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        let am: E::ActiveModel = model.into_active_model();
        let stmt = E::update(am.reset_all()).filter(cond.into_condition());
        match self.run(stmt.exec(self.conn)).await {
            Ok(m) => Ok(Some(m)),
            Err(RepoError::PersistenceFailure(DbErr::RecordNotUpdated)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Physical delete by primary key; returns rows affected.
    pub async fn delete(&self, model: E::Model) -> Result<u64, RepoError>
    where
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        let am: E::ActiveModel = model.into_active_model();
        let res = self.run(am.delete(self.conn)).await?;
        Ok(res.rows_affected)
    }
}
