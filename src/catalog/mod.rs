pub mod loader;
pub mod models;
pub mod service;

pub use loader::{
    calculate_hash, load_catalog, load_embedded, parse_catalog_json, EMBEDDED_CATALOG,
    SUPPORTED_SCHEMA_VERSIONS,
};
pub use models::{
    BaselineBasis, CombinationOverride, Endpoint, EndpointList, EndpointMetadata, FreeTier,
    OrganizationSize, OrganizationSizeMeta, ReductionBasis, TierMagnitude, TrafficBaseline,
    TrafficCategory,
};
pub use service::{Catalog, CatalogParts};
