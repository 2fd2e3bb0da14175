use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use realm_estimator::{config, init_tracing};

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();

    // Version needs neither configuration nor catalog
    if let cli::Commands::Version = args.get_command() {
        print_version();
        return Ok(());
    }

    let cfg = config::load_config(&args.config)?;
    init_tracing(&cfg.logging);

    // Dispatch to appropriate command handler
    match args.get_command() {
        cli::Commands::Estimate(estimate_args) => {
            commands::estimate::execute(&cfg, estimate_args)?;
        }
        cli::Commands::Recommend { source, tier } => {
            commands::recommend::execute(&cfg, &source, tier.as_deref())?;
        }
        cli::Commands::Catalog { view } => {
            commands::catalog::execute(&cfg, view)?;
        }
        cli::Commands::Test => {
            commands::test::execute(&cfg, &args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&cfg)?,
            cli::ConfigCommands::Validate => commands::config::validate(&cfg, &args.config)?,
        },
        cli::Commands::Version => print_version(),
    }

    Ok(())
}

fn print_version() {
    println!("Realm Estimator v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Catalog schema versions: {:?}",
        realm_estimator::catalog::SUPPORTED_SCHEMA_VERSIONS
    );
}
