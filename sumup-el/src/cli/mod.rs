//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use clap::Parser;

/// Load the stores, devices and transactions workbooks into the warehouse
#[derive(Parser, Debug)]
#[command(name = "sumup-el", version, about)]
pub struct Cli {
    /// Directory holding stores.xlsx, devices.xlsx and transactions.xlsx
    /// [env: RAW_DATA_PATH, default: data/raw]
    #[arg(long, value_name = "DIR")]
    pub raw_data_path: Option<PathBuf>,

    /// Destination connection string, e.g. sqlite:///warehouse.db
    /// [env: DESTINATION__SQLALCHEMY__CREDENTIALS]
    #[arg(long, value_name = "URL")]
    pub credentials: Option<String>,

    /// Read the workbooks and report record counts without loading
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
