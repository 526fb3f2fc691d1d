use anyhow::Result;
use clap::Parser;

use sumup_el::cli::Cli;
use sumup_el::cli::commands::run::handle_run_command;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Values in .env never override variables already set in the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    handle_run_command(cli).await
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();
}
