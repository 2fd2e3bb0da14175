use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use realm_estimator::catalog::EndpointList;
use realm_estimator::config::Config;
use realm_estimator::traffic::units::format_decimal;
use realm_estimator::traffic::{
    describe_traffic_recommendation, get_organization_size_meta, get_traffic_recommendation,
    TrafficUnit,
};
use tracing::info;

use super::load_configured_catalog;

/// Execute the recommend command
pub fn execute(cfg: &Config, source_id: &str, tier: Option<&str>) -> Result<()> {
    let catalog = load_configured_catalog(cfg)?;

    let tier_id = match tier {
        Some(tier) => tier.to_string(),
        None => cfg.defaults.organization_size.clone(),
    };
    let meta = get_organization_size_meta(&catalog, &tier_id)?;
    let endpoint = catalog.get_endpoint(EndpointList::Sources, source_id)?;
    let rec = get_traffic_recommendation(&catalog, endpoint, &tier_id)?;

    info!(source = %endpoint.id, tier = %meta.tier, "Traffic recommendation");

    println!(
        "{} {} ({})",
        "Baseline for".green().bold(),
        endpoint.label.bold(),
        meta.label
    );
    println!("{}", describe_traffic_recommendation(&rec));
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("UNIT").fg(Color::Cyan),
        Cell::new("PER DAY").fg(Color::Cyan),
    ]);
    for unit in TrafficUnit::ALL {
        let value = rec.value_in(unit, rec.average_event_size_kb);
        let decimals = if unit == TrafficUnit::Events { 0 } else { 2 };
        table.add_row(vec![
            Cell::new(unit.suffix()),
            Cell::new(format_decimal(value, decimals)),
        ]);
    }
    println!("{}", table);

    Ok(())
}
