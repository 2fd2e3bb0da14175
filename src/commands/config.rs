use anyhow::Result;
use colored::Colorize;
use realm_estimator::config::Config;
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration after file and environment layering
pub fn show(cfg: &Config) -> Result<()> {
    info!("Displaying effective configuration");

    println!("{}", "Current Configuration:".green().bold());
    println!();

    // Serialize to TOML format
    let toml_string = toml::to_string_pretty(cfg)?;
    println!("{}", toml_string);

    Ok(())
}

/// Execute the config validate command
///
/// Loading already validated the configuration; this reports the outcome
pub fn validate(cfg: &Config, path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  File: {}", describe_source(path));
    println!("  Platform Fee: ${} per million events", cfg.pricing.platform_fee_per_million);
    println!(
        "  Legacy Pipeline Overhead: ${} per million events",
        cfg.pricing.legacy_pipeline_overhead_per_million
    );
    println!(
        "  Optimization Cap: {}%",
        cfg.pricing.max_realm_optimization * 100.0
    );
    println!("  Days per Month: {}", cfg.pricing.days_per_month);

    info!("Configuration validation successful");
    Ok(())
}

/// Describe where the configuration came from
pub(crate) fn describe_source(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_source() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(describe_source(file.path()), file.path().display().to_string());

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(describe_source(&missing).ends_with("(not found, using defaults)"));
    }

    #[test]
    fn test_default_config_serializes_to_toml() {
        let toml_string = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml_string.contains("[pricing]"));
        assert!(toml_string.contains("platform_fee_per_million = 0.35"));
        assert!(toml_string.contains("[logging]"));
    }
}
