pub mod calculator;
pub mod models;

pub use calculator::{summarize_sources, CostCalculator};
pub use models::{CalculationResult, PricingConstants, SourceSummary};
