//! One pass over the source datasets: read each workbook and replace its table

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::*;

use crate::config::Config;
use crate::datasets::{self, DatasetDescriptor};
use crate::extract::read_sheet;
use crate::load::{LoadInfo, Pipeline, Resource};

/// What happened to one dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    /// Table replaced
    Loaded(LoadInfo),
    /// Workbook read in dry-run mode, nothing written
    Extracted { records: usize },
    /// Source workbook absent; table left untouched
    Skipped { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: &'static str,
    pub outcome: TableOutcome,
}

/// Per-table outcomes of a run, in load order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub tables: Vec<TableReport>,
}

impl RunReport {
    pub fn outcome(&self, table: &str) -> Option<&TableOutcome> {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map(|t| &t.outcome)
    }

    pub fn skipped(&self) -> usize {
        self.tables
            .iter()
            .filter(|t| matches!(t.outcome, TableOutcome::Skipped { .. }))
            .count()
    }
}

/// Run the pipeline over every dataset
pub async fn run_pipeline(config: &Config) -> Result<RunReport> {
    run_datasets(config, &datasets::ALL).await
}

/// Run the pipeline over the given datasets, in order.
///
/// A missing workbook is skipped with a warning. Any other error stops the
/// run; tables loaded before it keep their new contents.
pub async fn run_datasets(config: &Config, datasets: &[&DatasetDescriptor]) -> Result<RunReport> {
    log::info!(
        "Starting pipeline {}: {} datasets into {} dataset '{}', raw data in {}",
        config.pipeline_name,
        datasets.len(),
        config.destination,
        config.dataset_name,
        config.raw_data_path.display()
    );

    let mut pipeline = Pipeline::new(
        config.pipeline_name.as_str(),
        config.destination.as_str(),
        config.dataset_name.as_str(),
        config.credentials.clone(),
    );

    let result = load_datasets(&mut pipeline, config, datasets).await;
    pipeline.finish().await;
    let report = result?;

    log::info!(
        "Pipeline {} done: {} tables processed, {} skipped",
        config.pipeline_name,
        report.tables.len(),
        report.skipped()
    );
    println!("{}", finished_line());

    Ok(report)
}

async fn load_datasets(
    pipeline: &mut Pipeline,
    config: &Config,
    datasets: &[&DatasetDescriptor],
) -> Result<RunReport> {
    let mut report = RunReport::default();

    for dataset in datasets {
        let path = dataset.source_path(&config.raw_data_path);

        if !path.exists() {
            println!("{}", missing_file_line(&path));
            log::warn!("Skipping {}: {} does not exist", dataset.table, path.display());
            report.tables.push(TableReport {
                table: dataset.table,
                outcome: TableOutcome::Skipped { path },
            });
            continue;
        }

        println!("{}", loading_line(dataset.table, &path));
        let sheet = read_sheet(&path)?;

        if config.dry_run {
            println!(
                "  {} records read {}",
                sheet.records.len(),
                "(dry run, not loaded)".dimmed()
            );
            report.tables.push(TableReport {
                table: dataset.table,
                outcome: TableOutcome::Extracted {
                    records: sheet.records.len(),
                },
            });
            continue;
        }

        let info = pipeline
            .run(Resource {
                name: dataset.table,
                headers: &sheet.headers,
                records: &sheet.records,
                columns: dataset.columns,
            })
            .await?;

        println!(
            "  {} rows loaded into {}.{}",
            info.row_count.to_string().bright_green(),
            config.dataset_name,
            info.table
        );
        log::info!(
            "Pipeline {}: loaded {} rows into {} (load {})",
            pipeline.name(),
            info.row_count,
            info.table,
            info.load_id
        );

        report.tables.push(TableReport {
            table: dataset.table,
            outcome: TableOutcome::Loaded(info),
        });
    }

    Ok(report)
}

fn missing_file_line(path: &Path) -> String {
    format!("{} File not found at {}", "Warning:".yellow().bold(), path.display())
}

fn loading_line(table: &str, path: &Path) -> String {
    format!("Loading {} from {}...", table.cyan(), path.display())
}

fn finished_line() -> String {
    "Pipeline finished!".green().bold().to_string()
}
