use async_trait::async_trait;
use query_core::{PagedQuery, PagedResult};
use std::sync::Arc;

use crate::contract::{
    client::CatalogApi,
    error::CatalogError,
    model::{Category, NewCategory, NewProduct, Product, ProductPatch},
};
use crate::domain::{error::DomainError, service::Service};

/// Local implementation of the CatalogApi trait that delegates to the domain service
pub struct CatalogLocalClient {
    service: Arc<Service>,
}

impl CatalogLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CatalogApi for CatalogLocalClient {
    async fn list_products(&self, query: PagedQuery) -> anyhow::Result<PagedResult<Product>> {
        self.service
            .list_products(query)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn get_product(&self, id: i64) -> anyhow::Result<Product> {
        self.service
            .get_product(id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn create_product(&self, new_product: NewProduct) -> anyhow::Result<Product> {
        self.service
            .create_product(new_product)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn update_product(&self, id: i64, patch: ProductPatch) -> anyhow::Result<Product> {
        self.service
            .update_product(id, patch)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn delete_product(&self, id: i64) -> anyhow::Result<()> {
        self.service
            .delete_product(id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn list_categories(&self, query: PagedQuery) -> anyhow::Result<PagedResult<Category>> {
        self.service
            .list_categories(query)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn create_category(&self, new_category: NewCategory) -> anyhow::Result<Category> {
        self.service
            .create_category(new_category)
            .await
            .map_err(map_domain_error_to_anyhow)
    }
}

/// Map domain errors to contract errors wrapped in anyhow
fn map_domain_error_to_anyhow(domain_error: DomainError) -> anyhow::Error {
    let contract_error = match domain_error {
        DomainError::ProductNotFound { id } => CatalogError::not_found("product", id),
        DomainError::CategoryNotFound { id } => CatalogError::not_found("category", id),
        DomainError::CategoryAlreadyExists { name } => {
            CatalogError::validation(format!("category '{name}' already exists"))
        }
        DomainError::Validation { field, message } => {
            CatalogError::validation(format!("{field}: {message}"))
        }
        DomainError::InvalidQuery { message } => CatalogError::invalid_query(message),
        DomainError::Cancelled => CatalogError::Cancelled,
        DomainError::Database { message } => {
            tracing::error!(%message, "catalog storage failure");
            CatalogError::internal()
        }
    };

    anyhow::Error::new(contract_error)
}
