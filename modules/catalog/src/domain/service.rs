use std::sync::Arc;

use chrono::Utc;
use query_core::{PageLimits, PagedQuery, PagedResult};
use tracing::{debug, info, instrument};

use crate::contract::model::{Category, NewCategory, NewProduct, Product, ProductPatch};
use crate::domain::error::DomainError;
use crate::domain::repo::CatalogRepository;

/// Domain service with the catalog's business rules.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn CatalogRepository>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_name_length: usize,
    pub limits: PageLimits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_name_length: 100,
            limits: PageLimits::default(),
        }
    }
}

impl Service {
    pub fn new(repo: Arc<dyn CatalogRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "catalog.service.list_products", skip(self, query))]
    pub async fn list_products(
        &self,
        query: PagedQuery,
    ) -> Result<PagedResult<Product>, DomainError> {
        let query = query.validated(self.config.limits)?;
        debug!(
            page = query.page_number,
            size = query.page_size,
            filters = query.filters.len(),
            "Listing products"
        );
        let page = self.repo.list_products(&query).await?;
        debug!("Listed {} of {} products", page.items.len(), page.total_records);
        Ok(page)
    }

    #[instrument(name = "catalog.service.list_categories", skip(self, query))]
    pub async fn list_categories(
        &self,
        query: PagedQuery,
    ) -> Result<PagedResult<Category>, DomainError> {
        let query = query.validated(self.config.limits)?;
        Ok(self.repo.list_categories(&query).await?)
    }

    #[instrument(name = "catalog.service.get_product", skip(self), fields(product_id = id))]
    pub async fn get_product(&self, id: i64) -> Result<Product, DomainError> {
        self.repo
            .find_product(id)
            .await?
            .ok_or_else(|| DomainError::product_not_found(id))
    }

    #[instrument(
        name = "catalog.service.create_product",
        skip(self),
        fields(name = %new_product.name, category_id = new_product.category_id)
    )]
    pub async fn create_product(&self, new_product: NewProduct) -> Result<Product, DomainError> {
        info!("Creating product");
        self.validate_name("name", &new_product.name)?;
        validate_price(new_product.price)?;
        validate_stock(new_product.stock)?;
        self.ensure_category(new_product.category_id).await?;

        let product = self.repo.insert_product(new_product, Utc::now()).await?;
        info!("Created product with id={}", product.id);
        Ok(product)
    }

    /// Read-merge-write: the stored product is loaded, the patch applied, and
    /// the whole row written back.
    #[instrument(name = "catalog.service.update_product", skip(self), fields(product_id = id))]
    pub async fn update_product(
        &self,
        id: i64,
        patch: ProductPatch,
    ) -> Result<Product, DomainError> {
        info!("Updating product");
        if let Some(ref name) = patch.name {
            self.validate_name("name", name)?;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        if let Some(stock) = patch.stock {
            validate_stock(stock)?;
        }

        let mut current = self.get_product(id).await?;

        if let Some(category_id) = patch.category_id {
            if category_id != current.category_id {
                self.ensure_category(category_id).await?;
            }
            current.category_id = category_id;
        }
        if let Some(name) = patch.name {
            current.name = name;
        }
        if let Some(description) = patch.description {
            current.description = description;
        }
        if let Some(price) = patch.price {
            current.price = price;
        }
        if let Some(stock) = patch.stock {
            current.stock = stock;
        }
        current.updated_at = Utc::now();

        let Some(saved) = self.repo.update_product(current).await? else {
            return Err(DomainError::product_not_found(id));
        };
        info!("Updated product");
        Ok(saved)
    }

    #[instrument(name = "catalog.service.delete_product", skip(self), fields(product_id = id))]
    pub async fn delete_product(&self, id: i64) -> Result<(), DomainError> {
        info!("Deleting product");
        if !self.repo.soft_delete_product(id, Utc::now()).await? {
            return Err(DomainError::product_not_found(id));
        }
        Ok(())
    }

    #[instrument(name = "catalog.service.create_category", skip(self), fields(name = %new_category.name))]
    pub async fn create_category(
        &self,
        new_category: NewCategory,
    ) -> Result<Category, DomainError> {
        self.validate_name("name", &new_category.name)?;
        if self.repo.category_name_exists(&new_category.name).await? {
            return Err(DomainError::category_already_exists(new_category.name));
        }
        Ok(self.repo.insert_category(new_category).await?)
    }

    /// Populate an empty catalog with a small menu. Does nothing when live
    /// products already exist; returns rows written.
    #[instrument(name = "catalog.service.seed_demo_data", skip(self))]
    pub async fn seed_demo_data(&self) -> Result<u64, DomainError> {
        let existing = self.repo.count_products().await?;
        if existing > 0 {
            info!(existing, "Catalog not empty, skipping demo data");
            return Ok(0);
        }
        let (categories, products) = demo_menu();
        let written = self
            .repo
            .insert_batch(categories, products, Utc::now())
            .await?;
        info!(written, "Seeded demo data");
        Ok(written)
    }

    // --- validation helpers ---

    async fn ensure_category(&self, id: i64) -> Result<(), DomainError> {
        if !self.repo.category_exists(id).await? {
            return Err(DomainError::category_not_found(id));
        }
        Ok(())
    }

    fn validate_name(&self, field: &str, name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation(field, "must not be empty"));
        }
        if name.chars().count() > self.config.max_name_length {
            return Err(DomainError::validation(
                field,
                format!("longer than {} characters", self.config.max_name_length),
            ));
        }
        Ok(())
    }
}

fn validate_price(price: f64) -> Result<(), DomainError> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation("price", "must be a non-negative number"));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> Result<(), DomainError> {
    if stock < 0 {
        return Err(DomainError::validation("stock", "must not be negative"));
    }
    Ok(())
}

fn demo_menu() -> (Vec<NewCategory>, Vec<(usize, NewProduct)>) {
    let categories = [
        ("Drinks", "Hot and cold beverages"),
        ("Mains", "Kitchen favourites"),
        ("Desserts", "Something sweet"),
    ]
    .into_iter()
    .map(|(name, description)| NewCategory {
        name: name.to_string(),
        description: Some(description.to_string()),
    })
    .collect();

    let item = |cat: usize, name: &str, price: f64, stock: i32, description: Option<&str>| {
        (
            cat,
            NewProduct {
                name: name.to_string(),
                description: description.map(str::to_string),
                price,
                stock,
                category_id: 0,
            },
        )
    };

    let products = vec![
        item(0, "Espresso", 2.5, 120, None),
        item(0, "Cappuccino", 3.5, 80, Some("Double shot, steamed milk")),
        item(0, "Coca Cola", 2.0, 200, None),
        item(0, "Lemonade", 3.0, 40, Some("House made")),
        item(1, "Margherita Pizza", 9.5, 25, Some("Tomato, mozzarella, basil")),
        item(1, "Cheeseburger", 11.0, 30, None),
        item(1, "Caesar Salad", 8.0, 15, Some("Romaine, parmesan, croutons")),
        item(1, "Grilled Salmon", 16.5, 10, None),
        item(2, "Tiramisu", 6.0, 12, Some("House special")),
        item(2, "Cheesecake", 5.5, 14, None),
        item(2, "Gelato", 4.0, 50, Some("Three scoops")),
    ];

    (categories, products)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_menu_references_known_categories() {
        let (categories, products) = demo_menu();
        assert_eq!(categories.len(), 3);
        assert!(products.iter().all(|(idx, _)| *idx < categories.len()));
        assert!(products.iter().all(|(_, p)| p.price > 0.0 && p.stock >= 0));
    }

    #[test]
    fn test_price_and_stock_validation() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(-0.5).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }
}
