use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EstimatorError;
use crate::traffic::units;

/// Telemetry category used to pick a traffic baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrafficCategory {
    #[default]
    Identity,
    CloudInfrastructure,
    NetworkSecurity,
    EndpointEdr,
    SaasBusiness,
}

impl TrafficCategory {
    pub const ALL: [TrafficCategory; 5] = [
        Self::Identity,
        Self::CloudInfrastructure,
        Self::NetworkSecurity,
        Self::EndpointEdr,
        Self::SaasBusiness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::CloudInfrastructure => "cloud-infrastructure",
            Self::NetworkSecurity => "network-security",
            Self::EndpointEdr => "endpoint-edr",
            Self::SaasBusiness => "saas-business",
        }
    }

    /// Display name used in baseline sentences
    pub fn label(&self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::CloudInfrastructure => "Cloud infrastructure",
            Self::NetworkSecurity => "Network security",
            Self::EndpointEdr => "Endpoint / EDR",
            Self::SaasBusiness => "SaaS business apps",
        }
    }
}

impl fmt::Display for TrafficCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrafficCategory {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == needle)
            .ok_or_else(|| {
                EstimatorError::InvalidCatalog(format!("unknown traffic category '{}'", s))
            })
    }
}

/// Organization size / volume tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationSize {
    Small,
    Medium,
    Large,
}

impl OrganizationSize {
    pub const ALL: [OrganizationSize; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for OrganizationSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrganizationSize {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == needle)
            .ok_or_else(|| EstimatorError::UnknownTier(s.to_string()))
    }
}

/// Which of the two catalog lists an endpoint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointList {
    Sources,
    Destinations,
}

impl fmt::Display for EndpointList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sources => f.write_str("source"),
            Self::Destinations => f.write_str("destination"),
        }
    }
}

/// Whether a reduction factor was measured or assumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionBasis {
    Empirical,
    Assumption,
}

impl fmt::Display for ReductionBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empirical => f.write_str("empirical"),
            Self::Assumption => f.write_str("assumption"),
        }
    }
}

/// Vendor free-tier allowance (informational)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_gigabytes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Pass-through metadata. Never read by the cost math.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EndpointMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_tier: Option<FreeTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduction_basis: Option<ReductionBasis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl EndpointMetadata {
    pub fn is_empty(&self) -> bool {
        self.free_tier.is_none() && self.reduction_basis.is_none() && self.reference.is_none()
    }
}

/// A source or destination integration entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    pub id: String,
    pub label: String,
    pub description: String,
    /// Standard-market price per million ingested events
    pub cost_per_million_events: f64,
    /// Fractional cost reduction claimed for this endpoint, in [0, 1)
    pub realm_optimization: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_category: Option<TrafficCategory>,
    #[serde(skip_serializing_if = "EndpointMetadata::is_empty")]
    pub metadata: EndpointMetadata,
}

impl Endpoint {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        cost_per_million_events: f64,
        realm_optimization: f64,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            cost_per_million_events,
            realm_optimization,
            traffic_category: None,
            metadata: EndpointMetadata::default(),
        }
    }

    pub fn with_category(mut self, category: TrafficCategory) -> Self {
        self.traffic_category = Some(category);
        self
    }

    /// Category used for baseline lookup, `identity` when unset
    pub fn category(&self) -> TrafficCategory {
        self.traffic_category.unwrap_or_default()
    }
}

/// Calibrated optimization factor for one source/destination pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationOverride {
    pub source_id: String,
    pub destination_id: String,
    pub average_optimization: f64,
    pub note: String,
}

/// Defining magnitude of an organization size tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TierMagnitude {
    Employees { count: u64 },
    DailyGigabytes { gigabytes: f64 },
}

impl fmt::Display for TierMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Employees { count } => write!(
                f,
                "~{} employees",
                units::format_count(*count as f64)
            ),
            Self::DailyGigabytes { gigabytes } => write!(f, "~{} GB/day", gigabytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationSizeMeta {
    pub tier: OrganizationSize,
    pub label: String,
    pub magnitude: TierMagnitude,
}

/// How a baseline cell was authored in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum BaselineBasis {
    PerEmployee {
        approx_employees: u64,
        events_per_employee_per_day: f64,
    },
    Volume {
        daily_gigabytes: f64,
    },
}

/// Canonical traffic baseline for one (category, tier) cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrafficBaseline {
    pub daily_events: f64,
    pub average_event_size_kb: f64,
    pub basis: BaselineBasis,
}

impl TrafficBaseline {
    pub fn daily_gigabytes(&self) -> f64 {
        units::events_to_gigabytes(self.daily_events, self.average_event_size_kb)
    }

    pub fn approx_employees(&self) -> Option<u64> {
        match self.basis {
            BaselineBasis::PerEmployee {
                approx_employees, ..
            } => Some(approx_employees),
            BaselineBasis::Volume { .. } => None,
        }
    }
}
