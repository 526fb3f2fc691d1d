//! Named pipeline that loads resources into a destination dataset

use anyhow::{Context, Result, bail};
use chrono::Utc;

use super::destination::{LoadJob, SqlDestination};
use super::schema::{ColumnHint, resolve_table_schema};
use crate::extract::Record;

/// Destination kind backed by SQLAlchemy-style connection strings
pub const SQLALCHEMY_DESTINATION: &str = "sqlalchemy";

/// Rows for one destination table
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    /// Destination table name
    pub name: &'a str,
    /// Source header row, used for column order
    pub headers: &'a [String],
    pub records: &'a [Record],
    pub columns: &'a [ColumnHint],
}

/// Outcome of a single table load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadInfo {
    pub load_id: String,
    pub table: String,
    pub row_count: u64,
}

/// A pipeline writing into one dataset of one destination.
///
/// The destination is connected on the first load, so a run that has nothing
/// to load never needs credentials.
pub struct Pipeline {
    name: String,
    destination_kind: String,
    dataset: String,
    credentials: Option<String>,
    destination: Option<SqlDestination>,
}

impl Pipeline {
    pub fn new(
        name: impl Into<String>,
        destination_kind: impl Into<String>,
        dataset: impl Into<String>,
        credentials: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            destination_kind: destination_kind.into(),
            dataset: dataset.into(),
            credentials,
            destination: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the resource's table with its records
    pub async fn run(&mut self, resource: Resource<'_>) -> Result<LoadInfo> {
        let schema = resolve_table_schema(
            resource.name,
            resource.headers,
            resource.records,
            resource.columns,
        );
        let rows = schema.coerce_rows(resource.records)?;
        let load_id = new_load_id();

        log::debug!(
            "Pipeline {}: load {} replaces {}.{} with {} rows ({} columns)",
            self.name,
            load_id,
            self.dataset,
            schema.name,
            rows.len(),
            schema.columns.len()
        );

        let pipeline_name = self.name.clone();
        let destination = self.destination().await?;
        let row_count = destination
            .replace_table(&LoadJob {
                pipeline_name: &pipeline_name,
                load_id: &load_id,
                schema: &schema,
                rows: &rows,
            })
            .await
            .with_context(|| format!("Failed to load table {}", schema.name))?;

        Ok(LoadInfo {
            load_id,
            table: schema.name,
            row_count,
        })
    }

    /// Close the destination connection, if one was opened
    pub async fn finish(self) {
        if let Some(destination) = self.destination {
            destination.close().await;
        }
    }

    async fn destination(&mut self) -> Result<&SqlDestination> {
        if self.destination.is_none() {
            if self.destination_kind != SQLALCHEMY_DESTINATION {
                bail!("Unsupported destination: {}", self.destination_kind);
            }
            let credentials = self.credentials.as_deref().with_context(|| {
                format!(
                    "No credentials configured for destination '{}' (set {})",
                    self.destination_kind,
                    crate::config::CREDENTIALS_VAR
                )
            })?;
            let destination = SqlDestination::connect(credentials, &self.dataset).await?;
            self.destination = Some(destination);
        }

        self.destination
            .as_ref()
            .context("Destination is not connected")
    }

    #[cfg(test)]
    pub fn connected(&self) -> Option<&SqlDestination> {
        self.destination.as_ref()
    }
}

/// Load ids are the load's start time in seconds since the epoch
fn new_load_id() -> String {
    let micros = Utc::now().timestamp_micros();
    format!("{}.{:06}", micros.div_euclid(1_000_000), micros.rem_euclid(1_000_000))
}
