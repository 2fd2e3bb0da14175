use anyhow::Result;
use colored::Colorize;
use realm_estimator::catalog::{Catalog, OrganizationSize};
use realm_estimator::config::Config;
use realm_estimator::error::EstimatorError;
use realm_estimator::form::{FormEvent, FormState};
use realm_estimator::pricing::CostCalculator;
use realm_estimator::report::{EstimateReport, OutputFormat};
use realm_estimator::traffic::TrafficUnit;
use tracing::info;

use crate::cli::EstimateArgs;

use super::load_configured_catalog;

/// Execute the estimate command
///
/// In JSON mode a failure is also reported on stdout as an error envelope.
pub fn execute(cfg: &Config, args: EstimateArgs) -> Result<()> {
    let format: OutputFormat = match &args.format {
        Some(format) => format.parse()?,
        None => cfg.defaults.output_format()?,
    };

    match build_report(cfg, &args) {
        Ok(report) => {
            if format == OutputFormat::Table {
                println!("{}", "Realm cost estimate".green().bold());
                println!();
            }
            println!("{}", report.render(format)?);
            Ok(())
        }
        Err(e) => {
            if format == OutputFormat::Json {
                if let Some(envelope) = error_envelope(&e) {
                    println!("{}", serde_json::to_string_pretty(&envelope)?);
                }
            }
            Err(e)
        }
    }
}

/// JSON error body for failures raised by the estimator library
fn error_envelope(e: &anyhow::Error) -> Option<serde_json::Value> {
    e.downcast_ref::<EstimatorError>().map(EstimatorError::to_json)
}

fn build_report(cfg: &Config, args: &EstimateArgs) -> Result<EstimateReport> {
    let catalog = load_configured_catalog(cfg)?;

    let tier: OrganizationSize = match &args.tier {
        Some(tier) => tier.parse()?,
        None => cfg.defaults.organization_size()?,
    };
    let unit: TrafficUnit = match &args.unit {
        Some(unit) => unit.parse()?,
        None => cfg.defaults.traffic_unit()?,
    };

    let form = build_form(&catalog, args, tier, unit)?;
    let calculator = CostCalculator::new(catalog.clone(), cfg.pricing);
    let result = form.estimate(&calculator)?;

    info!(
        sources = ?form.source_ids,
        destination = ?form.destination_id,
        savings = result.savings,
        "Estimate complete"
    );

    Ok(EstimateReport::from_form(&catalog, &form, result)?)
}

/// Feed the command-line selection through the form state
///
/// Values given on the command line count as user edits, so the baseline
/// recommendation only fills what was left out.
fn build_form(
    catalog: &Catalog,
    args: &EstimateArgs,
    tier: OrganizationSize,
    unit: TrafficUnit,
) -> Result<FormState> {
    let mut events = vec![
        FormEvent::SourcesSelected(args.sources.clone()),
        FormEvent::DestinationSelected(args.destination.clone()),
    ];
    if let Some(size_kb) = args.event_size_kb {
        events.push(FormEvent::EventSizeEdited(size_kb));
    }
    if let Some(traffic) = args.traffic {
        events.push(FormEvent::TrafficEdited(traffic));
    }

    let mut form = FormState::new(tier, unit);
    for event in events {
        form = form.apply(event, catalog)?;
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_estimator::catalog::load_embedded;

    fn args(traffic: Option<f64>, event_size_kb: Option<f64>) -> EstimateArgs {
        EstimateArgs {
            sources: vec!["fortinet-fortigate".to_string()],
            destination: "splunk-es".to_string(),
            traffic,
            unit: None,
            event_size_kb,
            tier: None,
            format: None,
        }
    }

    #[test]
    fn test_build_form_fills_missing_values() {
        let catalog = load_embedded().unwrap();
        let form = build_form(
            &catalog,
            &args(None, None),
            OrganizationSize::Small,
            TrafficUnit::Gb,
        )
        .unwrap();

        assert!((form.traffic_value.unwrap() - 40.0).abs() < 1e-6);
        assert_eq!(form.event_size_kb, Some(0.6));
        assert!(!form.traffic_edited);
    }

    #[test]
    fn test_build_form_keeps_user_values() {
        let catalog = load_embedded().unwrap();
        let form = build_form(
            &catalog,
            &args(Some(10.0), Some(2.0)),
            OrganizationSize::Small,
            TrafficUnit::Tb,
        )
        .unwrap();

        assert_eq!(form.traffic_value, Some(10.0));
        assert_eq!(form.event_size_kb, Some(2.0));
        assert!(form.traffic_edited);
        assert!(form.event_size_edited);
    }

    #[test]
    fn test_build_form_rejects_unknown_destination() {
        let catalog = load_embedded().unwrap();
        let mut bad = args(None, None);
        bad.destination = "nowhere".to_string();

        let err = build_form(&catalog, &bad, OrganizationSize::Small, TrafficUnit::Gb)
            .unwrap_err();
        assert!(err.to_string().contains("Unknown destination endpoint: nowhere"));
    }

    #[test]
    fn test_unknown_source_yields_error_envelope() {
        let mut bad = args(Some(10.0), None);
        bad.sources = vec!["nonexistent-id".to_string()];

        let err = build_report(&Config::default(), &bad).unwrap_err();
        let envelope = error_envelope(&err).unwrap();

        assert_eq!(envelope["error"]["type"], "unknown_endpoint");
        assert_eq!(
            envelope["error"]["message"],
            "Unknown source endpoint: nonexistent-id"
        );
    }

    #[test]
    fn test_non_library_errors_have_no_envelope() {
        let err = anyhow::anyhow!("plain failure");
        assert!(error_envelope(&err).is_none());
    }
}
