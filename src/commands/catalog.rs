use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use realm_estimator::catalog::{Catalog, Endpoint, TrafficCategory};
use realm_estimator::config::Config;
use realm_estimator::traffic::units::format_decimal;
use tracing::info;

use crate::cli::CatalogView;

use super::load_configured_catalog;

/// Execute the catalog command
///
/// Without a view, prints a summary followed by sources and destinations.
pub fn execute(cfg: &Config, view: Option<CatalogView>) -> Result<()> {
    let catalog = load_configured_catalog(cfg)?;
    info!(version = %catalog.version(), "Listing catalog");

    match view {
        Some(CatalogView::Sources) => println!("{}", endpoint_table(catalog.sources(), true)),
        Some(CatalogView::Destinations) => {
            println!("{}", endpoint_table(catalog.destinations(), false))
        }
        Some(CatalogView::Overrides) => println!("{}", override_table(&catalog)),
        Some(CatalogView::Tiers) => println!("{}", tier_table(&catalog)),
        None => {
            print_summary(&catalog);
            println!();
            println!("{}", "Sources:".bold());
            println!("{}", endpoint_table(catalog.sources(), true));
            println!();
            println!("{}", "Destinations:".bold());
            println!("{}", endpoint_table(catalog.destinations(), false));
        }
    }

    Ok(())
}

fn print_summary(catalog: &Catalog) {
    println!("{}", "Catalog Summary:".bold());
    println!(
        "  {}: {} (schema v{})",
        "Version".cyan(),
        catalog.version(),
        catalog.schema_version()
    );
    println!("  {}: {}", "Fingerprint".cyan(), catalog.fingerprint());
    println!("  {}: {}", "Sources".cyan(), catalog.sources().len());
    println!("  {}: {}", "Destinations".cyan(), catalog.destinations().len());
    println!("  {}: {}", "Overrides".cyan(), catalog.overrides().len());
    println!("  {}: {}", "Baselines".cyan(), catalog.baseline_count());
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn endpoint_table(endpoints: &[Endpoint], with_category: bool) -> Table {
    let mut table = new_table();

    let mut header = vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("LABEL").fg(Color::Cyan),
    ];
    if with_category {
        header.push(Cell::new("CATEGORY").fg(Color::Cyan));
    }
    header.extend([
        Cell::new("COST / M EVENTS").fg(Color::Cyan),
        Cell::new("OPTIMIZATION").fg(Color::Cyan),
        Cell::new("BASIS").fg(Color::Cyan),
        Cell::new("FREE TIER").fg(Color::Cyan),
    ]);
    table.set_header(header);

    for endpoint in endpoints {
        let mut row = vec![Cell::new(&endpoint.id), Cell::new(&endpoint.label)];
        if with_category {
            let category = match endpoint.traffic_category {
                Some(category) => category.label().to_string(),
                None => format!("{} (default)", TrafficCategory::default().label()),
            };
            row.push(Cell::new(category));
        }

        let basis = endpoint
            .metadata
            .reduction_basis
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".to_string());
        let free_tier = endpoint
            .metadata
            .free_tier
            .as_ref()
            .and_then(|ft| ft.daily_gigabytes)
            .map(|gb| format!("{} GB/day", format_decimal(gb, 0)))
            .unwrap_or_else(|| "-".to_string());

        row.extend([
            Cell::new(format!("${}", format_decimal(endpoint.cost_per_million_events, 2))),
            Cell::new(format!("{}%", format_decimal(endpoint.realm_optimization * 100.0, 1))),
            Cell::new(basis),
            Cell::new(free_tier),
        ]);
        table.add_row(row);
    }

    table
}

fn override_table(catalog: &Catalog) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("SOURCE").fg(Color::Cyan),
        Cell::new("DESTINATION").fg(Color::Cyan),
        Cell::new("OPTIMIZATION").fg(Color::Cyan),
        Cell::new("NOTE").fg(Color::Cyan),
    ]);

    for entry in catalog.overrides() {
        table.add_row(vec![
            Cell::new(&entry.source_id),
            Cell::new(&entry.destination_id),
            Cell::new(format!("{}%", format_decimal(entry.average_optimization * 100.0, 2))),
            Cell::new(&entry.note),
        ]);
    }

    table
}

fn tier_table(catalog: &Catalog) -> Table {
    let mut table = new_table();

    let mut header = vec![
        Cell::new("TIER").fg(Color::Cyan),
        Cell::new("LABEL").fg(Color::Cyan),
        Cell::new("SIZE").fg(Color::Cyan),
    ];
    header.extend(
        TrafficCategory::ALL
            .iter()
            .map(|c| Cell::new(format!("{} (GB/day)", c.label())).fg(Color::Cyan)),
    );
    table.set_header(header);

    for meta in catalog.organization_sizes() {
        let mut row = vec![
            Cell::new(meta.tier),
            Cell::new(&meta.label),
            Cell::new(meta.magnitude),
        ];
        row.extend(TrafficCategory::ALL.iter().map(|category| {
            match catalog.baseline(*category, meta.tier) {
                Some(baseline) => Cell::new(format_decimal(baseline.daily_gigabytes(), 2)),
                None => Cell::new("-").fg(Color::Red),
            }
        }));
        table.add_row(row);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_estimator::catalog::load_embedded;

    #[test]
    fn test_endpoint_table_lists_every_source() {
        let catalog = load_embedded().unwrap();
        let mut table = endpoint_table(catalog.sources(), true);
        table.set_content_arrangement(ContentArrangement::Disabled);
        let rendered = table.to_string();

        for source in catalog.sources() {
            assert!(rendered.contains(&source.id));
        }
        assert!(rendered.contains("Identity (default)"));
    }

    #[test]
    fn test_override_table_lists_calibrations() {
        let catalog = load_embedded().unwrap();
        let mut table = override_table(&catalog);
        table.set_content_arrangement(ContentArrangement::Disabled);
        let rendered = table.to_string();
        assert!(rendered.contains("fortinet-fortigate"));
        assert!(rendered.contains("20.99%"));
    }

    #[test]
    fn test_tier_table_has_every_tier() {
        let catalog = load_embedded().unwrap();
        let mut table = tier_table(&catalog);
        table.set_content_arrangement(ContentArrangement::Disabled);
        let rendered = table.to_string();
        assert!(rendered.contains("medium"));
        assert!(rendered.contains("300.00"));
    }
}
