use std::sync::Arc;

use anyhow::Context;
use query_core::PageLimits;
use resto_db::DbHandle;
use sea_orm_migration::MigratorTrait;

use crate::config::CatalogConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::{migrations::Migrator, SeaOrmCatalogRepository};

pub const MODULE_NAME: &str = "catalog";

/// Run pending migrations, build the service and optionally seed the demo menu.
pub async fn init(
    db: &DbHandle,
    cfg: &CatalogConfig,
    limits: PageLimits,
) -> anyhow::Result<Arc<Service>> {
    Migrator::up(db.conn(), None)
        .await
        .context("catalog migrations failed")?;
    tracing::info!(module = MODULE_NAME, "migrations applied");

    let repo = SeaOrmCatalogRepository::new(db.sea());
    let service = Arc::new(Service::new(
        Arc::new(repo),
        ServiceConfig {
            max_name_length: cfg.max_name_length,
            limits,
        },
    ));

    if cfg.seed_demo_data {
        service
            .seed_demo_data()
            .await
            .context("seeding demo data failed")?;
    }

    Ok(service)
}
