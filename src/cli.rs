use clap::{Parser, Subcommand};
use realm_estimator::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "realm-estimator", version, about = "Realm integration cost estimator")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compare standard and Realm pipeline costs for a selection
    Estimate(EstimateArgs),

    /// Show the baseline traffic recommendation for a source
    Recommend {
        /// Source endpoint id
        #[arg(short, long)]
        source: String,

        /// Organization size: small, medium, large (defaults from config)
        #[arg(short, long)]
        tier: Option<String>,
    },

    /// List catalog entries (default)
    Catalog {
        #[command(subcommand)]
        view: Option<CatalogView>,
    },

    /// Test configuration and catalog validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EstimateArgs {
    /// Source endpoint id (repeat for several sources)
    #[arg(short, long = "source", required = true)]
    pub sources: Vec<String>,

    /// Destination endpoint id
    #[arg(short, long)]
    pub destination: String,

    /// Daily traffic in --unit (auto-filled from the baseline when omitted)
    #[arg(long)]
    pub traffic: Option<f64>,

    /// Traffic unit: events, gb, tb (defaults from config)
    #[arg(short, long)]
    pub unit: Option<String>,

    /// Average event size in KB (auto-filled from the baseline when omitted)
    #[arg(long)]
    pub event_size_kb: Option<f64>,

    /// Organization size: small, medium, large (defaults from config)
    #[arg(short, long)]
    pub tier: Option<String>,

    /// Output format: table, markdown, json (defaults from config)
    #[arg(short, long)]
    pub format: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogView {
    /// Source endpoints
    Sources,
    /// Destination endpoints
    Destinations,
    /// Calibrated source/destination pairs
    Overrides,
    /// Organization size tiers and baselines
    Tiers,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to a catalog listing
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Catalog { view: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_catalog() {
        let cli = Cli {
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
            command: None,
        };

        match cli.get_command() {
            Commands::Catalog { view } => assert!(view.is_none()),
            _ => panic!("Expected Catalog command"),
        }
    }

    #[test]
    fn test_cli_parsing_estimate_with_sources() {
        let args = vec![
            "realm-estimator",
            "estimate",
            "--source",
            "fortinet-fortigate",
            "--source",
            "okta",
            "--destination",
            "splunk-es",
            "--traffic",
            "10",
            "--unit",
            "tb",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Estimate(args) => {
                assert_eq!(args.sources, vec!["fortinet-fortigate", "okta"]);
                assert_eq!(args.destination, "splunk-es");
                assert_eq!(args.traffic, Some(10.0));
                assert_eq!(args.unit.as_deref(), Some("tb"));
                assert!(args.event_size_kb.is_none());
            }
            _ => panic!("Expected Estimate command"),
        }
    }

    #[test]
    fn test_cli_estimate_requires_source() {
        let args = vec!["realm-estimator", "estimate", "--destination", "splunk-es"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_config_defaults_to_standard_file() {
        let cli = Cli::try_parse_from(vec!["realm-estimator", "catalog"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_cli_parsing_catalog_view() {
        let cli = Cli::try_parse_from(vec!["realm-estimator", "catalog", "overrides"]).unwrap();

        match cli.get_command() {
            Commands::Catalog { view } => assert_eq!(view, Some(CatalogView::Overrides)),
            _ => panic!("Expected Catalog command"),
        }
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli = Cli::try_parse_from(vec![
            "realm-estimator",
            "config",
            "show",
            "--config",
            "custom.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert!(matches!(
            cli.get_command(),
            Commands::Config {
                action: ConfigCommands::Show
            }
        ));
    }
}
