use crate::catalog::{Catalog, Endpoint, EndpointList};
use crate::error::{EstimatorError, Result};
use crate::pricing::models::{CalculationResult, PricingConstants, SourceSummary};
use std::sync::Arc;
use tracing::{debug, warn};

const EVENTS_PER_MILLION: f64 = 1_000_000.0;

/// Blend the pricing inputs of the selected sources
///
/// One source is used as-is. Several sources are averaged (arithmetic mean of
/// cost and, separately, of optimization), which assumes volume is spread
/// evenly across them.
pub fn summarize_sources(sources: &[&Endpoint]) -> Result<SourceSummary> {
    match sources {
        [] => Err(EstimatorError::EmptySelection),
        [single] => Ok(SourceSummary {
            combined_cost_per_million: single.cost_per_million_events,
            combined_optimization: single.realm_optimization,
            source_count: 1,
        }),
        many => {
            let count = many.len() as f64;
            let total_cost: f64 = many.iter().map(|s| s.cost_per_million_events).sum();
            let total_optimization: f64 = many.iter().map(|s| s.realm_optimization).sum();
            Ok(SourceSummary {
                combined_cost_per_million: total_cost / count,
                combined_optimization: total_optimization / count,
                source_count: many.len(),
            })
        }
    }
}

/// Calculator for standard vs Realm pipeline spend
pub struct CostCalculator {
    catalog: Arc<Catalog>,
    constants: PricingConstants,
}

impl CostCalculator {
    /// Create a new cost calculator
    pub fn new(catalog: Arc<Catalog>, constants: PricingConstants) -> Self {
        Self { catalog, constants }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Calculate the comparison for the given selection
    ///
    /// `daily_events <= 0` is a valid empty scenario and evaluates to zero
    /// cost. Calibration overrides only apply when exactly one source is
    /// selected.
    pub fn calculate(
        &self,
        sources: &[&Endpoint],
        destination: &Endpoint,
        daily_events: f64,
    ) -> Result<CalculationResult> {
        let summary = summarize_sources(sources)?;
        let constants = &self.constants;

        let daily_events = if daily_events.is_finite() && daily_events > 0.0 {
            daily_events
        } else {
            debug!("Non-positive daily traffic ({}), treating as zero", daily_events);
            0.0
        };

        let provider_rate = summary.combined_cost_per_million + destination.cost_per_million_events;
        let legacy_rate = provider_rate + constants.legacy_pipeline_overhead_per_million;

        let monthly_events = daily_events * constants.days_per_month;
        let millions = monthly_events / EVENTS_PER_MILLION;
        let standard_cost = millions * legacy_rate;

        let calibration = match sources {
            [single] => self
                .catalog
                .combination_override(&single.id, &destination.id),
            _ => None,
        };

        let average_optimization = match calibration {
            Some(entry) => entry.average_optimization,
            None => ((summary.combined_optimization + destination.realm_optimization) / 2.0)
                .min(constants.max_realm_optimization),
        };

        let optimized_rate = provider_rate * (1.0 - average_optimization);
        let realm_rate = optimized_rate + constants.platform_fee_per_million;
        let realm_cost = millions * realm_rate;

        let savings = standard_cost - realm_cost;
        let savings_percentage = if standard_cost > 0.0 {
            (savings / standard_cost) * 100.0
        } else {
            0.0
        };
        let roi_percentage = if realm_cost > 0.0 {
            (savings / realm_cost) * 100.0
        } else {
            0.0
        };

        let daily_millions = daily_events / EVENTS_PER_MILLION;

        debug!(
            sources = summary.source_count,
            destination = %destination.id,
            provider_rate,
            average_optimization,
            override_applied = calibration.is_some(),
            standard_cost,
            realm_cost,
            "Calculated estimate"
        );

        if savings < 0.0 {
            warn!(
                "Realm cost exceeds standard cost by {:.2} for {} -> {}",
                -savings,
                sources
                    .iter()
                    .map(|s| s.id.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
                destination.id
            );
        }

        Ok(CalculationResult {
            source_count: summary.source_count,
            daily_events,
            monthly_events,
            standard_cost,
            realm_cost,
            savings,
            savings_percentage,
            daily_standard_cost: daily_millions * legacy_rate,
            daily_realm_cost: daily_millions * realm_rate,
            provider_rate_per_million: provider_rate,
            legacy_rate_per_million: legacy_rate,
            optimized_rate_per_million: optimized_rate,
            average_optimization,
            roi_percentage,
            override_applied: calibration.is_some(),
            calibration_note: calibration.map(|entry| entry.note.clone()),
        })
    }

    /// Resolve ids through the catalog, then calculate
    pub fn calculate_by_id<S: AsRef<str>>(
        &self,
        source_ids: &[S],
        destination_id: &str,
        daily_events: f64,
    ) -> Result<CalculationResult> {
        let sources = source_ids
            .iter()
            .map(|id| self.catalog.get_endpoint(EndpointList::Sources, id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let destination = self
            .catalog
            .get_endpoint(EndpointList::Destinations, destination_id)?;

        self.calculate(&sources, destination, daily_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{load_embedded, CatalogParts};

    fn embedded_calculator() -> CostCalculator {
        CostCalculator::new(Arc::new(load_embedded().unwrap()), PricingConstants::default())
    }

    fn bare_calculator(constants: PricingConstants) -> CostCalculator {
        let catalog = Catalog::try_from_parts(CatalogParts::default()).unwrap();
        CostCalculator::new(Arc::new(catalog), constants)
    }

    #[test]
    fn test_single_source_is_used_verbatim() {
        let source = Endpoint::new("okta", "Okta", 18.3, 0.551);
        let summary = summarize_sources(&[&source]).unwrap();

        assert_eq!(summary.combined_cost_per_million, 18.3);
        assert_eq!(summary.combined_optimization, 0.551);
        assert_eq!(summary.source_count, 1);
    }

    #[test]
    fn test_multiple_sources_use_arithmetic_mean() {
        let first = Endpoint::new("a", "A", 18.0, 0.5);
        let second = Endpoint::new("b", "B", 22.0, 0.7);
        let summary = summarize_sources(&[&first, &second]).unwrap();

        assert_eq!(summary.combined_cost_per_million, 20.0);
        assert!((summary.combined_optimization - 0.6).abs() < 1e-12);
        assert_eq!(summary.source_count, 2);
    }

    #[test]
    fn test_empty_selection_fails() {
        assert!(matches!(
            summarize_sources(&[]),
            Err(EstimatorError::EmptySelection)
        ));

        let calculator = bare_calculator(PricingConstants::default());
        let destination = Endpoint::new("d", "D", 10.0, 0.5);
        assert!(matches!(
            calculator.calculate(&[], &destination, 1_000_000.0),
            Err(EstimatorError::EmptySelection)
        ));
    }

    #[test]
    fn test_optimization_is_capped() {
        let calculator = bare_calculator(PricingConstants::default());
        let source = Endpoint::new("s", "S", 10.0, 0.9);
        let destination = Endpoint::new("d", "D", 10.0, 0.9);

        let result = calculator
            .calculate(&[&source], &destination, 5_000_000.0)
            .unwrap();
        assert_eq!(result.average_optimization, 0.75);
        assert!(!result.override_applied);
    }

    #[test]
    fn test_zero_traffic_yields_zero_costs() {
        let calculator = embedded_calculator();
        let result = calculator
            .calculate_by_id(&["okta"], "splunk-es", 0.0)
            .unwrap();

        assert_eq!(result.monthly_events, 0.0);
        assert_eq!(result.standard_cost, 0.0);
        assert_eq!(result.realm_cost, 0.0);
        assert_eq!(result.savings, 0.0);
        assert_eq!(result.savings_percentage, 0.0);
        assert_eq!(result.roi_percentage, 0.0);
        assert!(!result.is_increase());
    }

    #[test]
    fn test_negative_and_non_finite_traffic_treated_as_zero() {
        let calculator = embedded_calculator();
        for daily_events in [-5.0, f64::NAN, f64::NEG_INFINITY] {
            let result = calculator
                .calculate_by_id(&["okta"], "splunk-es", daily_events)
                .unwrap();
            assert_eq!(result.daily_events, 0.0);
            assert_eq!(result.standard_cost, 0.0);
            assert_eq!(result.savings_percentage, 0.0);
        }
    }

    #[test]
    fn test_rate_composition() {
        let constants = PricingConstants {
            platform_fee_per_million: 0.5,
            legacy_pipeline_overhead_per_million: 2.0,
            max_realm_optimization: 0.75,
            days_per_month: 30.0,
        };
        let calculator = bare_calculator(constants);
        let source = Endpoint::new("s", "S", 20.0, 0.6);
        let destination = Endpoint::new("d", "D", 30.0, 0.4);

        // 1M events/day -> 30M events/month
        let result = calculator
            .calculate(&[&source], &destination, 1_000_000.0)
            .unwrap();

        assert_eq!(result.provider_rate_per_million, 50.0);
        assert_eq!(result.legacy_rate_per_million, 52.0);
        assert_eq!(result.monthly_events, 30_000_000.0);
        assert!((result.standard_cost - 1560.0).abs() < 1e-9);
        assert!((result.average_optimization - 0.5).abs() < 1e-12);
        assert!((result.optimized_rate_per_million - 25.0).abs() < 1e-9);
        assert!((result.realm_cost - 765.0).abs() < 1e-9);
        assert!((result.savings - 795.0).abs() < 1e-9);
        assert!((result.savings_percentage - 795.0 / 1560.0 * 100.0).abs() < 1e-9);
        assert!((result.roi_percentage - 795.0 / 765.0 * 100.0).abs() < 1e-9);
        assert!((result.daily_standard_cost - 52.0).abs() < 1e-9);
        assert!((result.daily_realm_cost - 25.5).abs() < 1e-9);
    }

    #[test]
    fn test_negative_savings_are_reported() {
        let constants = PricingConstants {
            platform_fee_per_million: 5.0,
            legacy_pipeline_overhead_per_million: 0.0,
            max_realm_optimization: 0.75,
            days_per_month: 30.0,
        };
        let calculator = bare_calculator(constants);
        let source = Endpoint::new("s", "S", 2.0, 0.1);
        let destination = Endpoint::new("d", "D", 2.0, 0.1);

        let result = calculator
            .calculate(&[&source], &destination, 100_000.0)
            .unwrap();
        assert!(result.savings < 0.0);
        assert!(result.savings_percentage < 0.0);
        assert!(result.is_increase());
    }

    #[test]
    fn test_override_takes_precedence_for_single_source() {
        let calculator = embedded_calculator();
        let result = calculator
            .calculate_by_id(&["fortinet-fortigate"], "sumo-logic-siem", 10_000_000.0)
            .unwrap();

        assert_eq!(result.average_optimization, 0.2099);
        assert!(result.override_applied);
        assert!(result.calibration_note.is_some());
    }

    #[test]
    fn test_override_disabled_with_multiple_sources() {
        let calculator = embedded_calculator();
        let result = calculator
            .calculate_by_id(&["fortinet-fortigate", "okta"], "sumo-logic-siem", 10_000_000.0)
            .unwrap();

        let catalog = calculator.catalog();
        let fortigate = catalog
            .get_endpoint(EndpointList::Sources, "fortinet-fortigate")
            .unwrap();
        let okta = catalog.get_endpoint(EndpointList::Sources, "okta").unwrap();
        let sumo = catalog
            .get_endpoint(EndpointList::Destinations, "sumo-logic-siem")
            .unwrap();
        let expected = (((fortigate.realm_optimization + okta.realm_optimization) / 2.0
            + sumo.realm_optimization)
            / 2.0)
            .min(0.75);

        assert!(!result.override_applied);
        assert!(result.calibration_note.is_none());
        assert!((result.average_optimization - expected).abs() < 1e-12);
        assert_ne!(result.average_optimization, 0.2099);
    }

    #[test]
    fn test_calculate_by_id_unknown_endpoint() {
        let calculator = embedded_calculator();
        let err = calculator
            .calculate_by_id(&["nonexistent-id"], "splunk-es", 1.0)
            .unwrap_err();
        assert!(matches!(
            err,
            EstimatorError::UnknownEndpoint { list: EndpointList::Sources, .. }
        ));

        let err = calculator
            .calculate_by_id(&["okta"], "okta", 1.0)
            .unwrap_err();
        assert!(matches!(
            err,
            EstimatorError::UnknownEndpoint { list: EndpointList::Destinations, .. }
        ));
    }
}
