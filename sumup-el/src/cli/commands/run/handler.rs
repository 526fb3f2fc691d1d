//! Run command handler

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;
use crate::run::run_pipeline;

/// Build the configuration and run the pipeline once
pub async fn handle_run_command(args: Cli) -> Result<()> {
    // Handle --no-color flag
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = apply_overrides(Config::from_env(), &args);
    log::debug!("Resolved configuration: {:?}", config);

    let report = run_pipeline(&config).await?;
    log::debug!("Run report: {:?}", report);

    Ok(())
}

/// Command-line flags take precedence over the environment
pub fn apply_overrides(mut config: Config, args: &Cli) -> Config {
    if let Some(path) = &args.raw_data_path {
        config.raw_data_path = path.clone();
    }
    if let Some(credentials) = &args.credentials {
        config.credentials = Some(credentials.clone());
    }
    config.dry_run = args.dry_run;
    config
}
