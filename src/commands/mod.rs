//! Command implementations for the CLI
//!
//! - estimate: Compare standard and Realm costs for a selection
//! - recommend: Show the baseline traffic for a source
//! - catalog: List catalog entries
//! - test: Validate configuration and catalog
//! - config: Configuration display and validation

pub mod catalog;
pub mod config;
pub mod estimate;
pub mod recommend;
pub mod test;

use anyhow::{Context, Result};
use std::sync::Arc;

use realm_estimator::catalog::{self as catalog_data, Catalog};
use realm_estimator::config::Config;

/// Load the catalog named in the configuration, or the embedded one
pub(crate) fn load_configured_catalog(cfg: &Config) -> Result<Arc<Catalog>> {
    let catalog = catalog_data::load_catalog(cfg.catalog.path.as_deref()).with_context(|| {
        match &cfg.catalog.path {
            Some(path) => format!("Failed to load catalog from {}", path.display()),
            None => "Failed to load embedded catalog".to_string(),
        }
    })?;
    Ok(Arc::new(catalog))
}
