//! Process-level plumbing shared by every resto host: layered configuration,
//! home directory resolution and logging initialisation.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, PagingConfig,
    Section,
};
