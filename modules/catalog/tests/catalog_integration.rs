use std::sync::Arc;

use anyhow::Result;
use catalog::{
    config::CatalogConfig,
    contract::{
        client::CatalogApi,
        error::CatalogError,
        model::{NewCategory, NewProduct, ProductPatch},
    },
    domain::{error::DomainError, repo::CatalogRepository, service::Service},
    gateways::local::CatalogLocalClient,
    infra::storage::{entity::product, SeaOrmCatalogRepository},
};
use query_core::{FilterField, MatchMode, PageLimits, PagedQuery};
use resto_db::{ConnectOpts, DbHandle};

const DEMO_PRODUCTS: u64 = 11;

/// Fresh in-memory database with migrations applied and the demo menu seeded.
async fn seeded_service() -> Result<(DbHandle, Arc<Service>)> {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
    let cfg = CatalogConfig {
        seed_demo_data: true,
        ..CatalogConfig::default()
    };
    let service = catalog::init(&db, &cfg, PageLimits::default()).await?;
    Ok((db, service))
}

fn names<T>(items: &[T], f: impl Fn(&T) -> &str) -> Vec<String> {
    items.iter().map(|i| f(i).to_string()).collect()
}

#[tokio::test]
async fn test_seed_is_idempotent() -> Result<()> {
    let (_db, service) = seeded_service().await?;
    assert_eq!(service.seed_demo_data().await?, 0);

    let page = service.list_products(PagedQuery::new(1, 10)).await?;
    assert_eq!(page.total_records, DEMO_PRODUCTS);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 10);
    Ok(())
}

#[tokio::test]
async fn test_list_products_filter_search_and_sort() -> Result<()> {
    let (_db, service) = seeded_service().await?;

    let q = PagedQuery::new(1, 20)
        .with_filter("name", FilterField::new(MatchMode::Contains, "Chees"))
        .with_order("name", false);
    let page = service.list_products(q).await?;
    assert_eq!(
        names(&page.items, |p| &p.name),
        vec!["Cheeseburger", "Cheesecake"]
    );

    // search covers descriptions too; SQLite LIKE ignores ASCII case
    let q = PagedQuery::new(1, 20).with_search("house").with_order("name", false);
    let page = service.list_products(q).await?;
    assert_eq!(names(&page.items, |p| &p.name), vec!["Lemonade", "Tiramisu"]);

    let q = PagedQuery::new(1, 1).with_order("price", true);
    let page = service.list_products(q).await?;
    assert_eq!(page.items[0].name, "Grilled Salmon");

    let q = PagedQuery::new(1, 20)
        .with_filter("categoryId", FilterField::new(MatchMode::Equals, 3i64))
        .with_filter("price", FilterField::new(MatchMode::LessThan, 6i64));
    let page = service.list_products(q).await?;
    assert_eq!(page.total_records, 2);
    assert!(page.items.iter().all(|p| p.category_id == 3 && p.price < 6.0));
    Ok(())
}

#[tokio::test]
async fn test_uncoercible_filter_is_ignored() -> Result<()> {
    let (_db, service) = seeded_service().await?;
    let q = PagedQuery::new(1, 20)
        .with_filter("price", FilterField::new(MatchMode::GreaterThan, "abc"));
    let page = service.list_products(q).await?;
    assert_eq!(page.total_records, DEMO_PRODUCTS);
    Ok(())
}

#[tokio::test]
async fn test_invalid_requests() -> Result<()> {
    let (_db, service) = seeded_service().await?;

    let err = service
        .list_products(PagedQuery::new(1, 10).with_order("rating", false))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidQuery { .. }), "{err:?}");

    let err = service
        .list_products(
            PagedQuery::new(1, 10).with_filter("isDeleted", FilterField::new(MatchMode::Equals, true)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidQuery { .. }), "{err:?}");

    let err = service
        .list_products(PagedQuery::new(0, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidQuery { .. }), "{err:?}");

    // oversized pages are clamped, not rejected
    let page = service.list_products(PagedQuery::new(1, 10_000)).await?;
    assert_eq!(page.page_size, PageLimits::default().max_size);
    Ok(())
}

#[tokio::test]
async fn test_product_crud() -> Result<()> {
    let (db, service) = seeded_service().await?;

    let created = service
        .create_product(NewProduct {
            name: "Affogato".into(),
            description: None,
            price: 4.5,
            stock: 8,
            category_id: 3,
        })
        .await?;
    assert_eq!(service.get_product(created.id).await?, created);

    let updated = service
        .update_product(
            created.id,
            ProductPatch {
                price: Some(5.0),
                ..ProductPatch::default()
            },
        )
        .await?;
    assert_eq!(updated.price, 5.0);
    assert_eq!(updated.name, "Affogato");
    assert_eq!(updated.stock, 8);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(service.get_product(created.id).await?, updated);

    service.delete_product(created.id).await?;
    let err = service.get_product(created.id).await.unwrap_err();
    assert!(matches!(err, DomainError::ProductNotFound { id } if id == created.id));
    let err = service.delete_product(created.id).await.unwrap_err();
    assert!(matches!(err, DomainError::ProductNotFound { .. }));
    let err = service
        .update_product(created.id, ProductPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ProductNotFound { .. }));

    // the row is kept, only flagged
    let row = db
        .repo::<product::Entity>()
        .get_by_id(created.id)
        .await?
        .expect("soft-deleted row");
    assert!(row.is_deleted);

    let page = service.list_products(PagedQuery::new(1, 50)).await?;
    assert_eq!(page.total_records, DEMO_PRODUCTS);
    assert!(page.items.iter().all(|p| p.id != created.id));
    Ok(())
}

#[tokio::test]
async fn test_description_can_be_set_and_cleared() -> Result<()> {
    let (_db, service) = seeded_service().await?;
    let created = service
        .create_product(NewProduct {
            name: "Espresso".into(),
            description: Some("double shot".into()),
            price: 2.5,
            stock: 10,
            category_id: 3,
        })
        .await?;

    let kept = service
        .update_product(
            created.id,
            ProductPatch {
                stock: Some(9),
                ..ProductPatch::default()
            },
        )
        .await?;
    assert_eq!(kept.description.as_deref(), Some("double shot"));

    let renamed = service
        .update_product(
            created.id,
            ProductPatch {
                description: Some(Some("single shot".into())),
                ..ProductPatch::default()
            },
        )
        .await?;
    assert_eq!(renamed.description.as_deref(), Some("single shot"));

    let cleared = service
        .update_product(
            created.id,
            ProductPatch {
                description: Some(None),
                ..ProductPatch::default()
            },
        )
        .await?;
    assert_eq!(cleared.description, None);
    assert_eq!(service.get_product(created.id).await?.description, None);
    Ok(())
}

#[tokio::test]
async fn test_stale_update_does_not_restore_deleted_product() -> Result<()> {
    let (db, service) = seeded_service().await?;
    let repo = SeaOrmCatalogRepository::new(db.sea());

    let stale = repo.find_product(1).await?.expect("seeded product");
    assert!(repo.soft_delete_product(1, chrono::Utc::now()).await?);

    let mut edited = stale.clone();
    edited.price += 1.0;
    assert_eq!(repo.update_product(edited).await?, None);

    let row = db
        .repo::<product::Entity>()
        .get_by_id(1i64)
        .await?
        .expect("soft-deleted row");
    assert!(row.is_deleted);
    assert_eq!(row.price, stale.price);
    assert!(matches!(
        service.get_product(1).await.unwrap_err(),
        DomainError::ProductNotFound { id: 1 }
    ));

    let live = repo.find_product(2).await?.expect("seeded product");
    let saved = repo
        .update_product(catalog::model::Product {
            stock: live.stock + 1,
            ..live.clone()
        })
        .await?
        .expect("live product updated");
    assert_eq!(saved.stock, live.stock + 1);
    Ok(())
}

#[tokio::test]
async fn test_product_validation() -> Result<()> {
    let (_db, service) = seeded_service().await?;
    let valid = NewProduct {
        name: "Soup".into(),
        description: None,
        price: 4.0,
        stock: 1,
        category_id: 2,
    };

    let err = service
        .create_product(NewProduct {
            name: "  ".into(),
            ..valid.clone()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "name"));

    let err = service
        .create_product(NewProduct {
            price: -1.0,
            ..valid.clone()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "price"));

    let err = service
        .create_product(NewProduct {
            category_id: 99,
            ..valid.clone()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::CategoryNotFound { id: 99 }));

    let soup = service.create_product(valid).await?;
    let err = service
        .update_product(
            soup.id,
            ProductPatch {
                stock: Some(-3),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "stock"));
    Ok(())
}

#[tokio::test]
async fn test_categories() -> Result<()> {
    let (_db, service) = seeded_service().await?;

    let page = service
        .list_categories(PagedQuery::new(1, 10).with_order("name", false))
        .await?;
    assert_eq!(
        names(&page.items, |c| &c.name),
        vec!["Desserts", "Drinks", "Mains"]
    );

    let err = service
        .create_category(NewCategory {
            name: "Drinks".into(),
            description: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::CategoryAlreadyExists { .. }));

    let sides = service
        .create_category(NewCategory {
            name: "Sides".into(),
            description: Some("Fries and friends".into()),
        })
        .await?;
    let page = service
        .list_categories(PagedQuery::new(1, 10).with_search("friends"))
        .await?;
    assert_eq!(page.items, vec![sides]);
    Ok(())
}

#[tokio::test]
async fn test_local_client_maps_errors() -> Result<()> {
    let (_db, service) = seeded_service().await?;
    let client: Arc<dyn CatalogApi> = Arc::new(CatalogLocalClient::new(service));

    let err = client.get_product(999).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<CatalogError>(),
        Some(&CatalogError::not_found("product", 999))
    );

    let err = client
        .list_products(PagedQuery::new(1, 10).with_order("colour", false))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CatalogError>(),
        Some(CatalogError::InvalidQuery { .. })
    ));

    let page = client.list_products(PagedQuery::new(2, 10)).await?;
    assert_eq!(page.items.len(), 1);
    assert!(page.has_previous_page());
    assert!(!page.has_next_page());
    Ok(())
}
