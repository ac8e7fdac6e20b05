//! Restaurant catalog: categories and products on top of the generic
//! specification engine in `resto-db`.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{client, error, model};

// === MODULE WIRING ===
pub mod module;
pub use module::{init, MODULE_NAME};

// === INTERNAL MODULES ===
// Exposed for tests and the CLI host; other modules should use `contract`.
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
