use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::OrganizationSize;
use crate::pricing::PricingConstants;
use crate::report::OutputFormat;
use crate::traffic::TrafficUnit;

pub const DEFAULT_CONFIG_FILE: &str = "realm-estimator.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pricing: PricingConstants,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Alternative catalog JSON; the embedded catalog is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_organization_size")]
    pub organization_size: String,
    #[serde(default = "default_traffic_unit")]
    pub traffic_unit: String,
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            organization_size: default_organization_size(),
            traffic_unit: default_traffic_unit(),
            output_format: default_output_format(),
        }
    }
}

impl DefaultsConfig {
    pub fn organization_size(&self) -> anyhow::Result<OrganizationSize> {
        Ok(self.organization_size.parse()?)
    }

    pub fn traffic_unit(&self) -> anyhow::Result<TrafficUnit> {
        Ok(self.traffic_unit.parse()?)
    }

    pub fn output_format(&self) -> anyhow::Result<OutputFormat> {
        Ok(self.output_format.parse()?)
    }
}

fn default_organization_size() -> String {
    "medium".to_string()
}

fn default_traffic_unit() -> String {
    "gb".to_string()
}

fn default_output_format() -> String {
    "table".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Load configuration from an optional TOML file plus `REALM_ESTIMATOR__*`
/// environment overrides
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("REALM_ESTIMATOR")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    let pricing = &cfg.pricing;

    if !pricing.platform_fee_per_million.is_finite() || pricing.platform_fee_per_million < 0.0 {
        anyhow::bail!(
            "pricing.platform_fee_per_million must be a non-negative number, got {}",
            pricing.platform_fee_per_million
        );
    }
    if !pricing.legacy_pipeline_overhead_per_million.is_finite()
        || pricing.legacy_pipeline_overhead_per_million < 0.0
    {
        anyhow::bail!(
            "pricing.legacy_pipeline_overhead_per_million must be a non-negative number, got {}",
            pricing.legacy_pipeline_overhead_per_million
        );
    }
    if !(0.0..1.0).contains(&pricing.max_realm_optimization) {
        anyhow::bail!(
            "pricing.max_realm_optimization must be in [0, 1), got {}",
            pricing.max_realm_optimization
        );
    }
    if !pricing.days_per_month.is_finite() || pricing.days_per_month <= 0.0 {
        anyhow::bail!(
            "pricing.days_per_month must be positive, got {}",
            pricing.days_per_month
        );
    }

    if let Err(e) = cfg.defaults.organization_size() {
        anyhow::bail!("Invalid defaults.organization_size: {}", e);
    }
    if let Err(e) = cfg.defaults.traffic_unit() {
        anyhow::bail!("Invalid defaults.traffic_unit: {}", e);
    }
    if let Err(e) = cfg.defaults.output_format() {
        anyhow::bail!("Invalid defaults.output_format: {}", e);
    }

    match cfg.logging.format.as_str() {
        "pretty" | "json" => {}
        other => anyhow::bail!(
            "Invalid logging.format: '{}'. Must be one of: pretty, json",
            other
        ),
    }

    Ok(())
}
