use serde::{Deserialize, Serialize};

/// `modules.catalog` section of the application config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    /// Insert the demo menu on startup when the catalog is empty.
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_name_length: default_max_name_length(),
            seed_demo_data: false,
        }
    }
}

fn default_max_name_length() -> usize {
    100
}
