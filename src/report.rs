//! Export summaries of a finished estimate
//!
//! One `EstimateReport` renders three ways: a terminal table, a Markdown
//! block for pasting into proposals, and JSON for other tools.

use chrono::{SecondsFormat, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::{Catalog, EndpointList, OrganizationSize};
use crate::error::{EstimatorError, Result};
use crate::form::FormState;
use crate::pricing::CalculationResult;
use crate::traffic::units::{format_decimal, format_kilobytes};
use crate::traffic::TrafficUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Markdown => "markdown",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(EstimatorError::InvalidInput(format!(
                "unknown output format '{}' (expected table, markdown or json)",
                s
            ))),
        }
    }
}

/// Traffic input as the user entered it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSummary {
    pub unit: TrafficUnit,
    pub value: f64,
    pub average_event_size_kb: Option<f64>,
    pub daily_events: f64,
}

impl TrafficSummary {
    pub fn describe(&self) -> String {
        let entered = format!("{} {}/day", format_decimal(self.value, 2), self.unit.suffix());
        match (self.unit, self.average_event_size_kb) {
            (TrafficUnit::Events, Some(size_kb)) => format!(
                "{} (~{}/day)",
                entered,
                format_kilobytes(self.daily_events * size_kb)
            ),
            (_, Some(size_kb)) => format!(
                "{} ({} events/day at {} KB per event)",
                entered,
                format_decimal(self.daily_events, 0),
                format_decimal(size_kb, 2)
            ),
            (_, None) => entered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateReport {
    pub generated_at: String,
    pub catalog_version: String,
    pub catalog_fingerprint: String,
    pub sources: Vec<String>,
    pub destination: String,
    pub organization_size: OrganizationSize,
    pub traffic: TrafficSummary,
    pub result: CalculationResult,
}

impl EstimateReport {
    /// Assemble a report for the selection held in `form`
    pub fn from_form(catalog: &Catalog, form: &FormState, result: CalculationResult) -> Result<Self> {
        let sources = form
            .source_ids
            .iter()
            .map(|id| {
                catalog
                    .get_endpoint(EndpointList::Sources, id)
                    .map(|e| e.label.clone())
            })
            .collect::<Result<Vec<_>>>()?;

        let destination_id = form.destination_id.as_deref().ok_or_else(|| {
            EstimatorError::InvalidInput("a destination must be selected".to_string())
        })?;
        let destination = catalog
            .get_endpoint(EndpointList::Destinations, destination_id)?
            .label
            .clone();

        Ok(Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            catalog_version: catalog.version().to_string(),
            catalog_fingerprint: catalog.fingerprint().to_string(),
            sources,
            destination,
            organization_size: form.organization_size,
            traffic: TrafficSummary {
                unit: form.traffic_unit,
                value: form.traffic_value.unwrap_or_default(),
                average_event_size_kb: form.event_size_kb,
                daily_events: result.daily_events,
            },
            result,
        })
    }

    /// "savings" or "increase" depending on the sign of the difference
    pub fn savings_word(&self) -> &'static str {
        if self.result.is_increase() {
            "increase"
        } else {
            "savings"
        }
    }

    pub fn headline(&self) -> String {
        format!(
            "Estimated monthly {}: {} ({}%)",
            self.savings_word(),
            format_currency(self.result.savings.abs()),
            format_decimal(self.result.savings_percentage.abs(), 1)
        )
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self.to_table()),
            OutputFormat::Markdown => Ok(self.to_markdown()),
            OutputFormat::Json => self.to_json(),
        }
    }

    pub fn to_table(&self) -> String {
        let r = &self.result;

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("METRIC").fg(Color::Cyan),
            Cell::new("STANDARD").fg(Color::Cyan),
            Cell::new("REALM").fg(Color::Cyan),
        ]);
        table.add_row(vec![
            Cell::new("Monthly cost"),
            Cell::new(format_currency(r.standard_cost)),
            Cell::new(format_currency(r.realm_cost)),
        ]);
        table.add_row(vec![
            Cell::new("Daily cost"),
            Cell::new(format_currency(r.daily_standard_cost)),
            Cell::new(format_currency(r.daily_realm_cost)),
        ]);
        table.add_row(vec![
            Cell::new("Rate per million events"),
            Cell::new(format_currency(r.legacy_rate_per_million)),
            Cell::new(format_currency(r.optimized_rate_per_million)),
        ]);

        let difference_color = if r.is_increase() { Color::Red } else { Color::Green };
        table.add_row(vec![
            Cell::new(format!("Monthly {}", self.savings_word())),
            Cell::new(format!(
                "{}%",
                format_decimal(r.savings_percentage.abs(), 1)
            ))
            .fg(difference_color),
            Cell::new(format_currency(r.savings.abs())).fg(difference_color),
        ]);

        let mut out = String::new();
        out.push_str(&format!("Sources:      {}\n", self.sources.join(", ")));
        out.push_str(&format!("Destination:  {}\n", self.destination));
        out.push_str(&format!("Traffic:      {}\n", self.traffic.describe()));
        out.push_str(&format!(
            "Optimization: {}%{}\n",
            format_decimal(r.average_optimization * 100.0, 1),
            if r.override_applied { " (calibrated)" } else { "" }
        ));
        out.push_str(&table.to_string());
        out.push('\n');
        out.push_str(&self.headline());
        out
    }

    pub fn to_markdown(&self) -> String {
        let r = &self.result;
        let mut lines = vec![
            "## Realm cost estimate".to_string(),
            String::new(),
            format!("- **Sources:** {}", self.sources.join(", ")),
            format!("- **Destination:** {}", self.destination),
            format!("- **Organization size:** {}", self.organization_size),
            format!("- **Traffic:** {}", self.traffic.describe()),
            format!(
                "- **Average optimization:** {}%",
                format_decimal(r.average_optimization * 100.0, 1)
            ),
        ];
        if let Some(note) = &r.calibration_note {
            lines.push(format!("- **Calibration:** {}", note));
        }
        lines.extend([
            String::new(),
            "| Metric | Standard | Realm |".to_string(),
            "|---|---:|---:|".to_string(),
            format!(
                "| Monthly cost | {} | {} |",
                format_currency(r.standard_cost),
                format_currency(r.realm_cost)
            ),
            format!(
                "| Daily cost | {} | {} |",
                format_currency(r.daily_standard_cost),
                format_currency(r.daily_realm_cost)
            ),
            format!(
                "| Rate per million events | {} | {} |",
                format_currency(r.legacy_rate_per_million),
                format_currency(r.optimized_rate_per_million)
            ),
            String::new(),
            format!("**{}**", self.headline()),
            String::new(),
            format!(
                "_Catalog {} ({}), generated {}_",
                self.catalog_version,
                short_fingerprint(&self.catalog_fingerprint),
                self.generated_at
            ),
        ]);
        lines.join("\n")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(EstimatorError::Serialization)
    }
}

/// Dollar amount with thousands separators ("$1,234.56", "-$12.00")
pub fn format_currency(amount: f64) -> String {
    let formatted = format_decimal(amount, 2);
    match formatted.strip_prefix('-') {
        Some(digits) => format!("-${}", digits),
        None => format!("${}", formatted),
    }
}

fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}
