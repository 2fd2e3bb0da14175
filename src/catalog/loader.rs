use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::models::{
    BaselineBasis, CombinationOverride, Endpoint, EndpointMetadata, FreeTier, OrganizationSize,
    OrganizationSizeMeta, ReductionBasis, TierMagnitude, TrafficBaseline, TrafficCategory,
};
use crate::catalog::service::{Catalog, CatalogParts};
use crate::error::{EstimatorError, Result};
use crate::traffic::units;

/// Catalog shipped with the binary
pub const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Schema revisions this loader understands
pub const SUPPORTED_SCHEMA_VERSIONS: [u32; 2] = [1, 2];

/// Baseline matrix as written in the file: category -> tier -> cell
type RawMatrix<T> = BTreeMap<String, BTreeMap<String, T>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaHeader {
    schema_version: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOverride {
    source_id: String,
    destination_id: String,
    average_optimization: f64,
    #[serde(default)]
    note: String,
}

// Schema v1: flat pricing fields, employee-driven traffic baselines.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFileV1 {
    #[serde(default)]
    catalog_version: Option<String>,
    sources: Vec<RawEndpointV1>,
    destinations: Vec<RawEndpointV1>,
    #[serde(default)]
    combination_overrides: Vec<RawOverride>,
    organization_sizes: Vec<RawTierV1>,
    #[serde(default)]
    traffic_baselines: RawMatrix<RawBaselineV1>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEndpointV1 {
    id: String,
    label: String,
    #[serde(default)]
    description: String,
    cost_per_million_events: f64,
    realm_optimization: f64,
    #[serde(default)]
    traffic_category: Option<TrafficCategory>,
    #[serde(default)]
    free_tier: Option<FreeTier>,
    #[serde(default)]
    reduction_basis: Option<ReductionBasis>,
    #[serde(default)]
    reference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTierV1 {
    id: OrganizationSize,
    label: String,
    approx_employees: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBaselineV1 {
    events_per_employee_per_day: f64,
    average_event_size_kb: f64,
}

// Schema v2: nested reduction block, volume-driven traffic baselines.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFileV2 {
    #[serde(default)]
    catalog_version: Option<String>,
    sources: Vec<RawEndpointV2>,
    destinations: Vec<RawEndpointV2>,
    #[serde(default)]
    combination_overrides: Vec<RawOverride>,
    organization_sizes: Vec<RawTierV2>,
    #[serde(default)]
    traffic_baselines: RawMatrix<RawBaselineV2>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEndpointV2 {
    id: String,
    label: String,
    #[serde(default)]
    description: String,
    #[serde(alias = "costPerMillionEvents")]
    unit_cost_per_million: f64,
    realm_reduction: RawReduction,
    #[serde(default)]
    traffic_category: Option<TrafficCategory>,
    #[serde(default)]
    free_tier: Option<FreeTier>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReduction {
    factor: f64,
    #[serde(default)]
    basis: Option<ReductionBasis>,
    #[serde(default)]
    reference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTierV2 {
    id: OrganizationSize,
    label: String,
    daily_gigabytes: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBaselineV2 {
    default_daily_gigabytes: f64,
    average_event_size_kb: f64,
}

/// Load the catalog compiled into the binary
pub fn load_embedded() -> Result<Catalog> {
    parse_catalog_json(EMBEDDED_CATALOG)
}

/// Load a catalog from disk, or the embedded one when no path is given
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => {
            info!("Loading catalog from: {}", path.display());
            let content = std::fs::read_to_string(path)?;
            parse_catalog_json(&content)
        }
        None => {
            debug!("Using embedded catalog");
            load_embedded()
        }
    }
}

/// Parse a catalog document of any supported schema revision
pub fn parse_catalog_json(json: &str) -> Result<Catalog> {
    let header: SchemaHeader = serde_json::from_str(json)?;
    let fingerprint = calculate_hash(json);

    let parts = match header.schema_version {
        1 => normalize_v1(serde_json::from_str(json)?, fingerprint)?,
        2 => normalize_v2(serde_json::from_str(json)?, fingerprint)?,
        other => {
            return Err(EstimatorError::InvalidCatalog(format!(
                "unsupported schema version {} (supported: {:?})",
                other, SUPPORTED_SCHEMA_VERSIONS
            )))
        }
    };

    let catalog = Catalog::try_from_parts(parts)?;
    info!(
        "Loaded catalog {} (schema v{}): {} sources, {} destinations, {} overrides",
        catalog.version(),
        catalog.schema_version(),
        catalog.sources().len(),
        catalog.destinations().len(),
        catalog.overrides().len()
    );
    Ok(catalog)
}

/// Calculate SHA256 hash of content
pub fn calculate_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn normalize_v1(file: CatalogFileV1, fingerprint: String) -> Result<CatalogParts> {
    let organization_sizes: Vec<OrganizationSizeMeta> = file
        .organization_sizes
        .iter()
        .map(|tier| OrganizationSizeMeta {
            tier: tier.id,
            label: tier.label.clone(),
            magnitude: TierMagnitude::Employees {
                count: tier.approx_employees,
            },
        })
        .collect();

    let mut baselines = BTreeMap::new();
    for (category, tier, cell) in flatten_matrix(file.traffic_baselines)? {
        let approx_employees = file
            .organization_sizes
            .iter()
            .find(|t| t.id == tier)
            .map(|t| t.approx_employees)
            .ok_or_else(|| {
                EstimatorError::InvalidCatalog(format!(
                    "baseline {}/{} references a tier with no employee count",
                    category, tier
                ))
            })?;

        baselines.insert(
            (category, tier),
            TrafficBaseline {
                daily_events: approx_employees as f64 * cell.events_per_employee_per_day,
                average_event_size_kb: cell.average_event_size_kb,
                basis: BaselineBasis::PerEmployee {
                    approx_employees,
                    events_per_employee_per_day: cell.events_per_employee_per_day,
                },
            },
        );
    }

    Ok(CatalogParts {
        version: file.catalog_version.unwrap_or_else(|| "unversioned".to_string()),
        schema_version: 1,
        fingerprint,
        sources: file.sources.into_iter().map(endpoint_from_v1).collect(),
        destinations: file.destinations.into_iter().map(endpoint_from_v1).collect(),
        overrides: file.combination_overrides.into_iter().map(override_from_raw).collect(),
        organization_sizes,
        baselines,
    })
}

fn normalize_v2(file: CatalogFileV2, fingerprint: String) -> Result<CatalogParts> {
    let organization_sizes = file
        .organization_sizes
        .into_iter()
        .map(|tier| OrganizationSizeMeta {
            tier: tier.id,
            label: tier.label,
            magnitude: TierMagnitude::DailyGigabytes {
                gigabytes: tier.daily_gigabytes,
            },
        })
        .collect();

    let mut baselines = BTreeMap::new();
    for (category, tier, cell) in flatten_matrix(file.traffic_baselines)? {
        baselines.insert(
            (category, tier),
            TrafficBaseline {
                daily_events: units::gigabytes_to_events(
                    cell.default_daily_gigabytes,
                    cell.average_event_size_kb,
                ),
                average_event_size_kb: cell.average_event_size_kb,
                basis: BaselineBasis::Volume {
                    daily_gigabytes: cell.default_daily_gigabytes,
                },
            },
        );
    }

    Ok(CatalogParts {
        version: file.catalog_version.unwrap_or_else(|| "unversioned".to_string()),
        schema_version: 2,
        fingerprint,
        sources: file.sources.into_iter().map(endpoint_from_v2).collect(),
        destinations: file.destinations.into_iter().map(endpoint_from_v2).collect(),
        overrides: file.combination_overrides.into_iter().map(override_from_raw).collect(),
        organization_sizes,
        baselines,
    })
}

fn flatten_matrix<T>(
    matrix: RawMatrix<T>,
) -> Result<Vec<(TrafficCategory, OrganizationSize, T)>> {
    let mut cells = Vec::new();
    for (category, row) in matrix {
        let category: TrafficCategory = category.parse()?;
        for (tier, cell) in row {
            let tier: OrganizationSize = tier.parse().map_err(|_| {
                EstimatorError::InvalidCatalog(format!(
                    "baseline for '{}' uses unknown tier '{}'",
                    category, tier
                ))
            })?;
            cells.push((category, tier, cell));
        }
    }
    Ok(cells)
}

fn endpoint_from_v1(raw: RawEndpointV1) -> Endpoint {
    Endpoint {
        id: raw.id,
        label: raw.label,
        description: raw.description,
        cost_per_million_events: raw.cost_per_million_events,
        realm_optimization: raw.realm_optimization,
        traffic_category: raw.traffic_category,
        metadata: EndpointMetadata {
            free_tier: raw.free_tier,
            reduction_basis: raw.reduction_basis,
            reference: raw.reference,
        },
    }
}

fn endpoint_from_v2(raw: RawEndpointV2) -> Endpoint {
    Endpoint {
        id: raw.id,
        label: raw.label,
        description: raw.description,
        cost_per_million_events: raw.unit_cost_per_million,
        realm_optimization: raw.realm_reduction.factor,
        traffic_category: raw.traffic_category,
        metadata: EndpointMetadata {
            free_tier: raw.free_tier,
            reduction_basis: raw.realm_reduction.basis,
            reference: raw.realm_reduction.reference,
        },
    }
}

fn override_from_raw(raw: RawOverride) -> CombinationOverride {
    CombinationOverride {
        source_id: raw.source_id,
        destination_id: raw.destination_id,
        average_optimization: raw.average_optimization,
        note: raw.note,
    }
}
