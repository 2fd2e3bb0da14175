//! Caller-held input state for an estimate
//!
//! The core keeps no mutable state. Whoever drives it (the CLI here) owns a
//! `FormState` and threads it through `FormState::apply`, which returns a new
//! state and leaves the old one untouched.
//!
//! Recommendation refresh rules:
//! - selecting sources fills only fields the user has not edited;
//! - changing the organization size overwrites both fields and clears both
//!   edited flags;
//! - changing the unit re-fills the traffic value in the new unit and clears
//!   the traffic flag; a user-set event size is kept. With no source selected
//!   the current value is converted to the new unit instead, or cleared when
//!   the conversion needs an event size that is not set.

use tracing::debug;

use crate::catalog::{Catalog, EndpointList, OrganizationSize};
use crate::error::{EstimatorError, Result};
use crate::pricing::{CalculationResult, CostCalculator};
use crate::traffic::{get_traffic_recommendation, TrafficRecommendation, TrafficUnit};

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub source_ids: Vec<String>,
    pub destination_id: Option<String>,
    pub organization_size: OrganizationSize,
    pub traffic_unit: TrafficUnit,
    pub traffic_value: Option<f64>,
    pub event_size_kb: Option<f64>,
    /// Traffic value was typed by the user
    pub traffic_edited: bool,
    /// Event size was typed by the user
    pub event_size_edited: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    SourcesSelected(Vec<String>),
    DestinationSelected(String),
    OrganizationSizeChanged(OrganizationSize),
    UnitChanged(TrafficUnit),
    TrafficEdited(f64),
    EventSizeEdited(f64),
}

impl FormState {
    pub fn new(organization_size: OrganizationSize, traffic_unit: TrafficUnit) -> Self {
        Self {
            source_ids: Vec::new(),
            destination_id: None,
            organization_size,
            traffic_unit,
            traffic_value: None,
            event_size_kb: None,
            traffic_edited: false,
            event_size_edited: false,
        }
    }

    /// Apply one input event and return the resulting state
    pub fn apply(&self, event: FormEvent, catalog: &Catalog) -> Result<FormState> {
        let mut next = self.clone();

        match event {
            FormEvent::SourcesSelected(ids) => {
                for id in &ids {
                    catalog.get_endpoint(EndpointList::Sources, id)?;
                }
                next.source_ids = ids;
                next.fill_recommendation(catalog)?;
            }
            FormEvent::DestinationSelected(id) => {
                catalog.get_endpoint(EndpointList::Destinations, &id)?;
                next.destination_id = Some(id);
            }
            FormEvent::OrganizationSizeChanged(tier) => {
                next.organization_size = tier;
                next.traffic_edited = false;
                next.event_size_edited = false;
                next.fill_recommendation(catalog)?;
            }
            FormEvent::UnitChanged(unit) => {
                let previous = next.traffic_unit;
                next.traffic_unit = unit;
                if next.recommendation(catalog)?.is_some() {
                    next.traffic_edited = false;
                    next.fill_recommendation(catalog)?;
                } else {
                    // No baseline to reset to: keep the same volume in the new unit
                    next.traffic_value =
                        convert_traffic(next.traffic_value, previous, unit, next.event_size_kb);
                    if next.traffic_value.is_none() {
                        next.traffic_edited = false;
                    }
                }
            }
            FormEvent::TrafficEdited(value) => {
                validate_traffic(value)?;
                next.traffic_value = Some(value);
                next.traffic_edited = true;
            }
            FormEvent::EventSizeEdited(size_kb) => {
                validate_event_size(size_kb)?;
                next.event_size_kb = Some(size_kb);
                next.event_size_edited = true;
            }
        }

        Ok(next)
    }

    /// Recommendation for the first selected source, if any
    pub fn recommendation(&self, catalog: &Catalog) -> Result<Option<TrafficRecommendation>> {
        let Some(first) = self.source_ids.first() else {
            return Ok(None);
        };
        let endpoint = catalog.get_endpoint(EndpointList::Sources, first)?;
        get_traffic_recommendation(catalog, endpoint, self.organization_size.as_str()).map(Some)
    }

    fn fill_recommendation(&mut self, catalog: &Catalog) -> Result<()> {
        let Some(rec) = self.recommendation(catalog)? else {
            return Ok(());
        };

        if !self.event_size_edited {
            self.event_size_kb = Some(rec.average_event_size_kb);
        }
        if !self.traffic_edited {
            let size_kb = self.event_size_kb.unwrap_or(rec.average_event_size_kb);
            self.traffic_value = Some(rec.value_in(self.traffic_unit, size_kb));
        }

        debug!(
            tier = %self.organization_size,
            unit = %self.traffic_unit,
            traffic = ?self.traffic_value,
            event_size_kb = ?self.event_size_kb,
            "Applied traffic recommendation"
        );
        Ok(())
    }

    /// Canonical events/day for the current traffic input
    pub fn daily_events(&self) -> Result<f64> {
        let value = self
            .traffic_value
            .ok_or_else(|| EstimatorError::InvalidInput("traffic volume is required".to_string()))?;
        validate_traffic(value)?;

        match self.traffic_unit {
            TrafficUnit::Events => Ok(value),
            unit => {
                let size_kb = self.event_size_kb.ok_or_else(|| {
                    EstimatorError::InvalidInput(
                        "average event size is required for byte units".to_string(),
                    )
                })?;
                validate_event_size(size_kb)?;
                Ok(unit.to_daily_events(value, size_kb))
            }
        }
    }

    /// Run the calculator on the current inputs
    pub fn estimate(&self, calculator: &CostCalculator) -> Result<CalculationResult> {
        let destination_id = self.destination_id.as_deref().ok_or_else(|| {
            EstimatorError::InvalidInput("a destination must be selected".to_string())
        })?;
        if self.source_ids.is_empty() {
            return Err(EstimatorError::EmptySelection);
        }

        let daily_events = self.daily_events()?;
        calculator.calculate_by_id(&self.source_ids, destination_id, daily_events)
    }
}

/// Express a traffic value entered in `from` in the `to` unit
///
/// Byte units convert without an event size; converting to or from events
/// needs one.
fn convert_traffic(
    value: Option<f64>,
    from: TrafficUnit,
    to: TrafficUnit,
    event_size_kb: Option<f64>,
) -> Option<f64> {
    let value = value?;
    let size_kb = match (from, to) {
        _ if from == to => return Some(value),
        (TrafficUnit::Events, _) | (_, TrafficUnit::Events) => event_size_kb?,
        _ => 1.0,
    };
    Some(to.from_daily_events(from.to_daily_events(value, size_kb), size_kb))
}

fn validate_traffic(value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EstimatorError::InvalidInput(format!(
            "traffic must be a non-negative number, got {}",
            value
        )));
    }
    Ok(())
}

fn validate_event_size(size_kb: f64) -> Result<()> {
    if !size_kb.is_finite() || size_kb <= 0.0 {
        return Err(EstimatorError::InvalidInput(format!(
            "average event size must be positive, got {}",
            size_kb
        )));
    }
    Ok(())
}
