use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, Endpoint, OrganizationSize, OrganizationSizeMeta, TrafficCategory};
use crate::error::{EstimatorError, Result};
use crate::traffic::units::{self, TrafficUnit};

/// Suggested daily traffic for one endpoint at one organization size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficRecommendation {
    pub endpoint_id: String,
    pub category: TrafficCategory,
    pub tier: OrganizationSize,
    pub tier_label: String,
    pub daily_events: f64,
    pub average_event_size_kb: f64,
    pub daily_gigabytes: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approx_employees: Option<u64>,
}

impl TrafficRecommendation {
    pub fn daily_kilobytes(&self) -> f64 {
        self.daily_events * self.average_event_size_kb
    }

    /// Recommended volume expressed in `unit`, using `event_size_kb` to
    /// convert bytes into events when the unit is `events`
    pub fn value_in(&self, unit: TrafficUnit, event_size_kb: f64) -> f64 {
        let events = units::gigabytes_to_events(self.daily_gigabytes, event_size_kb);
        unit.from_daily_events(events, event_size_kb)
    }
}

/// Metadata for an organization size tier id such as `"medium"`
pub fn get_organization_size_meta<'a>(
    catalog: &'a Catalog,
    tier_id: &str,
) -> Result<&'a OrganizationSizeMeta> {
    let tier: OrganizationSize = tier_id.parse()?;
    catalog
        .organization_size(tier)
        .ok_or_else(|| EstimatorError::UnknownTier(tier_id.to_string()))
}

/// Baseline recommendation for `endpoint` at `tier_id`
///
/// Uses the endpoint's traffic category, or `identity` when it has none.
/// A missing matrix cell is an error; there is no fallback to another
/// category.
pub fn get_traffic_recommendation(
    catalog: &Catalog,
    endpoint: &Endpoint,
    tier_id: &str,
) -> Result<TrafficRecommendation> {
    let meta = get_organization_size_meta(catalog, tier_id)?;
    let category = endpoint.category();

    let baseline = catalog
        .baseline(category, meta.tier)
        .ok_or(EstimatorError::MissingBaseline {
            category,
            tier: meta.tier,
        })?;

    debug!(
        endpoint = %endpoint.id,
        category = %category,
        tier = %meta.tier,
        daily_events = baseline.daily_events,
        "Resolved traffic baseline"
    );

    Ok(TrafficRecommendation {
        endpoint_id: endpoint.id.clone(),
        category,
        tier: meta.tier,
        tier_label: meta.label.clone(),
        daily_events: baseline.daily_events,
        average_event_size_kb: baseline.average_event_size_kb,
        daily_gigabytes: baseline.daily_gigabytes(),
        approx_employees: baseline.approx_employees(),
    })
}

/// Human-readable baseline sentence
pub fn describe_traffic_recommendation(rec: &TrafficRecommendation) -> String {
    let mut sentence = format!(
        "{} baseline for {}: ~{}/day ({} events/day at {} KB per event)",
        rec.category.label(),
        rec.tier_label,
        units::format_kilobytes(rec.daily_kilobytes()),
        units::format_count(rec.daily_events),
        units::format_decimal(rec.average_event_size_kb, 2),
    );
    if let Some(employees) = rec.approx_employees {
        sentence.push_str(&format!(
            ", assuming ~{} employees",
            units::format_count(employees as f64)
        ));
    }
    sentence.push('.');
    sentence
}
