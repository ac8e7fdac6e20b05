use anyhow::{anyhow, Context, Result};
use catalog::client::CatalogApi;
use catalog::config::CatalogConfig;
use catalog::gateways::local::CatalogLocalClient;
use clap::{Args, Parser, Subcommand};
use query_core::PagedQuery;
use resto_db::DbHandle;
use runtime::{AppConfig, CliArgs};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resto CLI - query the restaurant catalog
#[derive(Parser)]
#[command(name = "resto-cli")]
#[command(about = "Resto CLI - query the restaurant catalog")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check configuration
    Check,
    /// List live products
    Products(ListArgs),
    /// List categories
    Categories(ListArgs),
}

#[derive(Args, Debug, Clone)]
struct ListArgs {
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    page: u64,

    /// Page size (clamped to paging.max_page_size)
    #[arg(long)]
    size: Option<u64>,

    /// Property to order by, e.g. "price"
    #[arg(long)]
    sort: Option<String>,

    /// Order descending
    #[arg(long)]
    desc: bool,

    /// Free-text search over the searchable properties
    #[arg(long)]
    search: Option<String>,

    /// Column filter as <property>:<matchMode>:<value>; repeatable
    #[arg(long = "filter", value_name = "FILTER")]
    filters: Vec<String>,

    /// Seed the demo menu when the catalog is empty
    #[arg(long)]
    seed: bool,
}

impl ListArgs {
    fn to_query(&self, default_size: u64) -> Result<PagedQuery> {
        let mut query = PagedQuery::new(self.page, self.size.unwrap_or(default_size));
        if let Some(sort) = &self.sort {
            query = query.with_order(sort.clone(), self.desc);
        }
        if let Some(term) = &self.search {
            query = query.with_search(term.clone());
        }
        for raw in &self.filters {
            query
                .push_filter_param(raw)
                .with_context(|| format!("Invalid --filter '{raw}'"))?;
        }
        Ok(query)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config
        .logging
        .clone()
        .unwrap_or_else(runtime::default_logging_config);
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.home_dir));
    tracing::debug!("Resto CLI starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check_config(&config),
        Commands::Products(list) => {
            let client = open_catalog(&config, list.seed).await?;
            let query = list.to_query(config.paging.limits().default_size)?;
            let page = client
                .list_products(query)
                .await
                .context("Failed to list products")?;
            print_json(&page)
        }
        Commands::Categories(list) => {
            let client = open_catalog(&config, list.seed).await?;
            let query = list.to_query(config.paging.limits().default_size)?;
            let page = client
                .list_categories(query)
                .await
                .context("Failed to list categories")?;
            print_json(&page)
        }
    }
}

/// Connect, migrate and optionally seed; returns the catalog client.
async fn open_catalog(config: &AppConfig, seed: bool) -> Result<Arc<dyn CatalogApi>> {
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("No database configuration found"))?;

    let dsn = db_config.resolve_dsn(Path::new(&config.home_dir))?;
    tracing::info!(
        "Connecting to database: {}",
        resto_db::redact_credentials_in_dsn(Some(&dsn))
    );
    let db = DbHandle::connect(&dsn, db_config.to_connect_opts()).await?;
    tracing::info!("Connected DB backend: {:?}", db.engine());

    let mut catalog_cfg: CatalogConfig = config
        .module_config(catalog::MODULE_NAME)?
        .unwrap_or_default();
    if seed {
        catalog_cfg.seed_demo_data = true;
    }

    let service = catalog::init(&db, &catalog_cfg, config.paging.limits()).await?;
    Ok(Arc::new(CatalogLocalClient::new(service)))
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db) = &config.database {
        db.resolve_dsn(Path::new(&config.home_dir))?;
    }
    config
        .module_config::<CatalogConfig>(catalog::MODULE_NAME)
        .context("catalog module config")?;

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
