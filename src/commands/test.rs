use anyhow::Result;
use colored::Colorize;
use realm_estimator::catalog::{Catalog, OrganizationSize};
use realm_estimator::config::Config;
use realm_estimator::traffic::get_traffic_recommendation;
use std::path::Path;
use tracing::info;

use super::config::describe_source;
use super::load_configured_catalog;

/// Execute the test command
///
/// Validates the configuration and checks that every source resolves to a
/// traffic baseline at every organization size.
pub fn execute(cfg: &Config, path: &Path) -> Result<()> {
    println!("{}", "Testing configuration...".yellow());
    info!("Loading and validating configuration");

    println!("{}", "✓ Configuration test successful".green());
    println!("  {}: {}", "File".cyan(), describe_source(path));
    println!("  {}: {}", "Log Level".cyan(), cfg.logging.level);
    println!("  {}: {}", "Log Format".cyan(), cfg.logging.format);
    println!();

    println!("{}", "Testing catalog...".yellow());
    let catalog = load_configured_catalog(cfg)?;
    let problems = check_baseline_coverage(&catalog);

    println!(
        "  {}: {} (schema v{})",
        "Catalog".cyan(),
        catalog.version(),
        catalog.schema_version()
    );
    println!(
        "  {}: {} sources, {} destinations, {} overrides",
        "Entries".cyan(),
        catalog.sources().len(),
        catalog.destinations().len(),
        catalog.overrides().len()
    );

    if !problems.is_empty() {
        for problem in &problems {
            println!("    {} {}", "✗".red(), problem);
        }
        anyhow::bail!("Catalog has {} missing traffic baselines", problems.len());
    }

    println!("{}", "✓ Catalog test successful".green());
    info!("Configuration and catalog validation completed successfully");
    Ok(())
}

/// Every source must have a baseline at every tier
fn check_baseline_coverage(catalog: &Catalog) -> Vec<String> {
    let mut problems = Vec::new();
    for source in catalog.sources() {
        for tier in OrganizationSize::ALL {
            if let Err(e) = get_traffic_recommendation(catalog, source, tier.as_str()) {
                problems.push(format!("{}: {}", source.id, e));
            }
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_estimator::catalog::{load_embedded, CatalogParts, Endpoint, TrafficCategory};

    #[test]
    fn test_embedded_catalog_has_full_coverage() {
        let catalog = load_embedded().unwrap();
        assert!(check_baseline_coverage(&catalog).is_empty());
    }

    #[test]
    fn test_missing_baselines_are_reported() {
        let parts = CatalogParts {
            sources: vec![
                Endpoint::new("okta", "Okta", 18.0, 0.55).with_category(TrafficCategory::Identity)
            ],
            ..CatalogParts::default()
        };
        let catalog = Catalog::try_from_parts(parts).unwrap();

        let problems = check_baseline_coverage(&catalog);
        assert_eq!(problems.len(), 3);
        assert!(problems[0].starts_with("okta: "));
    }
}
