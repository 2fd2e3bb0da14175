use std::collections::{BTreeMap, HashMap, HashSet};

use crate::catalog::models::{
    CombinationOverride, Endpoint, EndpointList, OrganizationSize, OrganizationSizeMeta,
    TrafficBaseline, TrafficCategory,
};
use crate::error::{EstimatorError, Result};

/// Normalized catalog contents, before validation
#[derive(Debug, Clone, Default)]
pub struct CatalogParts {
    pub version: String,
    pub schema_version: u32,
    pub fingerprint: String,
    pub sources: Vec<Endpoint>,
    pub destinations: Vec<Endpoint>,
    pub overrides: Vec<CombinationOverride>,
    pub organization_sizes: Vec<OrganizationSizeMeta>,
    pub baselines: BTreeMap<(TrafficCategory, OrganizationSize), TrafficBaseline>,
}

/// Read-only endpoint catalog
///
/// Built once at startup and shared behind an `Arc`. There are no mutation
/// operations; editing the catalog means shipping a new data file.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: String,
    schema_version: u32,
    fingerprint: String,
    sources: Vec<Endpoint>,
    destinations: Vec<Endpoint>,
    /// source id -> destination id -> override
    overrides: HashMap<String, HashMap<String, CombinationOverride>>,
    organization_sizes: Vec<OrganizationSizeMeta>,
    baselines: BTreeMap<(TrafficCategory, OrganizationSize), TrafficBaseline>,
}

impl Catalog {
    /// Validate normalized parts and build the catalog
    pub fn try_from_parts(parts: CatalogParts) -> Result<Self> {
        let violations = validate_parts(&parts);
        if !violations.is_empty() {
            return Err(EstimatorError::InvalidCatalog(violations.join("; ")));
        }

        let mut overrides: HashMap<String, HashMap<String, CombinationOverride>> = HashMap::new();
        for entry in parts.overrides {
            overrides
                .entry(entry.source_id.clone())
                .or_default()
                .insert(entry.destination_id.clone(), entry);
        }

        Ok(Self {
            version: parts.version,
            schema_version: parts.schema_version,
            fingerprint: parts.fingerprint,
            sources: parts.sources,
            destinations: parts.destinations,
            overrides,
            organization_sizes: parts.organization_sizes,
            baselines: parts.baselines,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// SHA-256 of the catalog document this was loaded from
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn sources(&self) -> &[Endpoint] {
        &self.sources
    }

    pub fn destinations(&self) -> &[Endpoint] {
        &self.destinations
    }

    pub fn list(&self, list: EndpointList) -> &[Endpoint] {
        match list {
            EndpointList::Sources => &self.sources,
            EndpointList::Destinations => &self.destinations,
        }
    }

    /// Look up an endpoint by id. Fails when the id is not in the list.
    pub fn get_endpoint(&self, list: EndpointList, id: &str) -> Result<&Endpoint> {
        self.list(list)
            .iter()
            .find(|endpoint| endpoint.id == id)
            .ok_or_else(|| EstimatorError::UnknownEndpoint {
                list,
                id: id.to_string(),
            })
    }

    pub fn combination_override(
        &self,
        source_id: &str,
        destination_id: &str,
    ) -> Option<&CombinationOverride> {
        self.overrides.get(source_id)?.get(destination_id)
    }

    /// All overrides, ordered by source then destination id
    pub fn overrides(&self) -> Vec<&CombinationOverride> {
        let mut all: Vec<&CombinationOverride> =
            self.overrides.values().flat_map(|by_dest| by_dest.values()).collect();
        all.sort_by(|a, b| {
            (a.source_id.as_str(), a.destination_id.as_str())
                .cmp(&(b.source_id.as_str(), b.destination_id.as_str()))
        });
        all
    }

    pub fn organization_sizes(&self) -> &[OrganizationSizeMeta] {
        &self.organization_sizes
    }

    pub fn organization_size(&self, tier: OrganizationSize) -> Option<&OrganizationSizeMeta> {
        self.organization_sizes.iter().find(|meta| meta.tier == tier)
    }

    pub fn baseline(
        &self,
        category: TrafficCategory,
        tier: OrganizationSize,
    ) -> Option<&TrafficBaseline> {
        self.baselines.get(&(category, tier))
    }

    pub fn baseline_count(&self) -> usize {
        self.baselines.len()
    }
}

fn validate_parts(parts: &CatalogParts) -> Vec<String> {
    let mut violations = Vec::new();

    validate_endpoints(&parts.sources, EndpointList::Sources, &mut violations);
    validate_endpoints(&parts.destinations, EndpointList::Destinations, &mut violations);

    let mut seen_pairs = HashSet::new();
    for entry in &parts.overrides {
        if !parts.sources.iter().any(|s| s.id == entry.source_id) {
            violations.push(format!(
                "override references unknown source '{}'",
                entry.source_id
            ));
        }
        if !parts.destinations.iter().any(|d| d.id == entry.destination_id) {
            violations.push(format!(
                "override references unknown destination '{}'",
                entry.destination_id
            ));
        }
        if !is_valid_factor(entry.average_optimization) {
            violations.push(format!(
                "override {} -> {}: average optimization {} is outside [0, 1)",
                entry.source_id, entry.destination_id, entry.average_optimization
            ));
        }
        if !seen_pairs.insert((entry.source_id.as_str(), entry.destination_id.as_str())) {
            violations.push(format!(
                "override {} -> {} is duplicated",
                entry.source_id, entry.destination_id
            ));
        }
    }

    let mut seen_tiers = HashSet::new();
    for meta in &parts.organization_sizes {
        if !seen_tiers.insert(meta.tier) {
            violations.push(format!("organization size '{}' is duplicated", meta.tier));
        }
    }

    for ((category, tier), baseline) in &parts.baselines {
        if !seen_tiers.contains(tier) {
            violations.push(format!(
                "baseline {}/{} references a tier with no metadata",
                category, tier
            ));
        }
        if !baseline.daily_events.is_finite() || baseline.daily_events < 0.0 {
            violations.push(format!(
                "baseline {}/{}: daily events must be a non-negative number",
                category, tier
            ));
        }
        if !baseline.average_event_size_kb.is_finite() || baseline.average_event_size_kb <= 0.0 {
            violations.push(format!(
                "baseline {}/{}: average event size must be positive",
                category, tier
            ));
        }
    }

    violations
}

fn validate_endpoints(endpoints: &[Endpoint], list: EndpointList, violations: &mut Vec<String>) {
    let mut ids = HashSet::new();
    for endpoint in endpoints {
        if endpoint.id.is_empty() {
            violations.push(format!("{} id cannot be empty", list));
        }
        if !ids.insert(endpoint.id.as_str()) {
            violations.push(format!("{} id '{}' is duplicated", list, endpoint.id));
        }
        if !endpoint.cost_per_million_events.is_finite() || endpoint.cost_per_million_events < 0.0 {
            violations.push(format!(
                "{} '{}': cost per million events must be >= 0",
                list, endpoint.id
            ));
        }
        if !is_valid_factor(endpoint.realm_optimization) {
            violations.push(format!(
                "{} '{}': realm optimization {} is outside [0, 1)",
                list, endpoint.id, endpoint.realm_optimization
            ));
        }
    }
}

fn is_valid_factor(value: f64) -> bool {
    (0.0..1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::{BaselineBasis, TierMagnitude};

    fn sample_parts() -> CatalogParts {
        let mut baselines = BTreeMap::new();
        baselines.insert(
            (TrafficCategory::NetworkSecurity, OrganizationSize::Small),
            TrafficBaseline {
                daily_events: 1_000_000.0,
                average_event_size_kb: 0.6,
                basis: BaselineBasis::Volume {
                    daily_gigabytes: 1_000_000.0 * 0.6 / 1_048_576.0,
                },
            },
        );

        CatalogParts {
            version: "test".to_string(),
            schema_version: 2,
            fingerprint: "abc".to_string(),
            sources: vec![
                Endpoint::new("fortinet-fortigate", "Fortinet FortiGate", 20.0, 0.68)
                    .with_category(TrafficCategory::NetworkSecurity),
                Endpoint::new("okta", "Okta", 18.0, 0.55),
            ],
            destinations: vec![Endpoint::new("sumo-logic-siem", "Sumo Logic", 35.0, 0.55)],
            overrides: vec![CombinationOverride {
                source_id: "fortinet-fortigate".to_string(),
                destination_id: "sumo-logic-siem".to_string(),
                average_optimization: 0.2099,
                note: "calibrated".to_string(),
            }],
            organization_sizes: vec![OrganizationSizeMeta {
                tier: OrganizationSize::Small,
                label: "Small".to_string(),
                magnitude: TierMagnitude::DailyGigabytes { gigabytes: 10.0 },
            }],
            baselines,
        }
    }

    #[test]
    fn test_get_endpoint_found() {
        let catalog = Catalog::try_from_parts(sample_parts()).unwrap();
        let endpoint = catalog.get_endpoint(EndpointList::Sources, "okta").unwrap();
        assert_eq!(endpoint.label, "Okta");
    }

    #[test]
    fn test_get_endpoint_unknown_id_fails() {
        let catalog = Catalog::try_from_parts(sample_parts()).unwrap();
        let err = catalog
            .get_endpoint(EndpointList::Sources, "nonexistent-id")
            .unwrap_err();
        assert!(matches!(
            err,
            EstimatorError::UnknownEndpoint { list: EndpointList::Sources, ref id } if id == "nonexistent-id"
        ));
    }

    #[test]
    fn test_lookup_respects_list() {
        let catalog = Catalog::try_from_parts(sample_parts()).unwrap();
        // a destination id is not a source
        assert!(catalog
            .get_endpoint(EndpointList::Sources, "sumo-logic-siem")
            .is_err());
        assert!(catalog
            .get_endpoint(EndpointList::Destinations, "sumo-logic-siem")
            .is_ok());
    }

    #[test]
    fn test_override_lookup_uses_composite_key() {
        let mut parts = sample_parts();
        parts.sources.push(Endpoint::new("a::b", "Odd", 1.0, 0.1));
        parts.destinations.push(Endpoint::new("c", "Odd dest", 1.0, 0.1));
        parts.overrides.push(CombinationOverride {
            source_id: "a::b".to_string(),
            destination_id: "c".to_string(),
            average_optimization: 0.3,
            note: String::new(),
        });
        let catalog = Catalog::try_from_parts(parts).unwrap();

        assert_eq!(
            catalog
                .combination_override("fortinet-fortigate", "sumo-logic-siem")
                .map(|o| o.average_optimization),
            Some(0.2099)
        );
        assert!(catalog.combination_override("a::b", "c").is_some());
        assert!(catalog.combination_override("a", "b::c").is_none());
        assert!(catalog.combination_override("okta", "sumo-logic-siem").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut parts = sample_parts();
        parts.sources.push(Endpoint::new("okta", "Okta again", 1.0, 0.1));
        let err = Catalog::try_from_parts(parts).unwrap_err();
        assert!(err.to_string().contains("source id 'okta' is duplicated"));
    }

    #[test]
    fn test_contract_violations_rejected() {
        let mut parts = sample_parts();
        parts.sources.push(Endpoint::new("negative", "Negative", -1.0, 0.1));
        parts.destinations.push(Endpoint::new("too-good", "Too good", 1.0, 1.0));
        let err = Catalog::try_from_parts(parts).unwrap_err().to_string();
        assert!(err.contains("'negative': cost per million events must be >= 0"));
        assert!(err.contains("'too-good': realm optimization 1 is outside [0, 1)"));
    }

    #[test]
    fn test_override_must_reference_known_endpoints() {
        let mut parts = sample_parts();
        parts.overrides.push(CombinationOverride {
            source_id: "ghost".to_string(),
            destination_id: "sumo-logic-siem".to_string(),
            average_optimization: 0.2,
            note: String::new(),
        });
        let err = Catalog::try_from_parts(parts).unwrap_err();
        assert!(err.to_string().contains("unknown source 'ghost'"));
    }

    #[test]
    fn test_baseline_requires_tier_metadata() {
        let mut parts = sample_parts();
        parts.organization_sizes.clear();
        let err = Catalog::try_from_parts(parts).unwrap_err();
        assert!(err.to_string().contains("references a tier with no metadata"));
    }
}
