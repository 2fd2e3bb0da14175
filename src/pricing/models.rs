use serde::{Deserialize, Serialize};

/// Global pricing constants, immutable after load
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConstants {
    /// Flat fee per million events added on top of the optimized rate
    #[serde(default = "default_platform_fee_per_million")]
    pub platform_fee_per_million: f64,

    /// Third-party pipeline tooling cost, only part of the standard baseline
    #[serde(default = "default_legacy_pipeline_overhead_per_million")]
    pub legacy_pipeline_overhead_per_million: f64,

    /// Upper clamp on the blended reduction factor
    #[serde(default = "default_max_realm_optimization")]
    pub max_realm_optimization: f64,

    #[serde(default = "default_days_per_month")]
    pub days_per_month: f64,
}

impl Default for PricingConstants {
    fn default() -> Self {
        Self {
            platform_fee_per_million: default_platform_fee_per_million(),
            legacy_pipeline_overhead_per_million: default_legacy_pipeline_overhead_per_million(),
            max_realm_optimization: default_max_realm_optimization(),
            days_per_month: default_days_per_month(),
        }
    }
}

fn default_platform_fee_per_million() -> f64 {
    0.35
}

fn default_legacy_pipeline_overhead_per_million() -> f64 {
    0.9
}

fn default_max_realm_optimization() -> f64 {
    0.75
}

fn default_days_per_month() -> f64 {
    30.0
}

/// Blended pricing inputs of the selected sources
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceSummary {
    pub combined_cost_per_million: f64,
    pub combined_optimization: f64,
    pub source_count: usize,
}

/// Outcome of one standard-vs-Realm comparison
///
/// Recomputed on every input change; monetary figures are per month unless
/// prefixed with `daily_`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub source_count: usize,
    pub daily_events: f64,
    pub monthly_events: f64,
    pub standard_cost: f64,
    pub realm_cost: f64,
    pub savings: f64,
    pub savings_percentage: f64,
    pub daily_standard_cost: f64,
    pub daily_realm_cost: f64,
    pub provider_rate_per_million: f64,
    pub legacy_rate_per_million: f64,
    pub optimized_rate_per_million: f64,
    pub average_optimization: f64,
    pub roi_percentage: f64,
    pub override_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration_note: Option<String>,
}

impl CalculationResult {
    /// Realm costs more than the standard pipeline
    pub fn is_increase(&self) -> bool {
        self.savings < 0.0
    }
}
