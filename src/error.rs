use serde_json::json;
use thiserror::Error;

use crate::catalog::{EndpointList, OrganizationSize, TrafficCategory};

/// Estimator error types
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// Requested id is not part of the given catalog list
    #[error("Unknown {list} endpoint: {id}")]
    UnknownEndpoint { list: EndpointList, id: String },

    /// Blending or calculation was asked to run with no sources
    #[error("At least one source must be selected")]
    EmptySelection,

    /// Organization size id outside the fixed tier enumeration
    #[error("Unknown organization size tier: {0}")]
    UnknownTier(String),

    /// The catalog has no baseline cell for this category/tier pair
    #[error("No traffic baseline for category '{category}' at tier '{tier}'")]
    MissingBaseline {
        category: TrafficCategory,
        tier: OrganizationSize,
    },

    /// Catalog document failed to parse or violates its contract
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Caller-side input rejected before reaching the engine
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An estimate could not be written out as JSON
    #[error("Failed to serialize report: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EstimatorError>;

impl EstimatorError {
    /// Stable machine-readable name, used in JSON error output
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::UnknownEndpoint { .. } => "unknown_endpoint",
            Self::EmptySelection => "empty_selection",
            Self::UnknownTier(_) => "unknown_tier",
            Self::MissingBaseline { .. } => "missing_baseline",
            Self::InvalidCatalog(_) => "invalid_catalog",
            Self::InvalidInput(_) => "invalid_input",
            Self::Serialization(_) => "serialization_error",
            Self::Io(_) => "io_error",
        }
    }

    /// JSON error body in the same envelope the JSON export uses
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "error": {
                "message": self.to_string(),
                "type": self.type_name(),
            }
        })
    }
}

impl From<serde_json::Error> for EstimatorError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidCatalog(format!("JSON error: {}", err))
    }
}
