//! SQL destination: full-replace table writes and the load history table

use anyhow::{Context, Result, bail};
use chrono::Utc;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqlitePoolOptions};

use super::credentials::{SqliteTarget, parse_credentials};
use super::schema::{SqlValue, TableSchema};

/// Name of the table recording every completed table load
pub const LOADS_TABLE: &str = "_pipeline_loads";

/// The only schema a plain SQLite connection can write to
const SQLITE_MAIN_SCHEMA: &str = "main";

/// One table load, written in a single transaction
#[derive(Debug)]
pub struct LoadJob<'a> {
    pub pipeline_name: &'a str,
    pub load_id: &'a str,
    pub schema: &'a TableSchema,
    pub rows: &'a [Vec<SqlValue>],
}

/// A row of the load history table
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRecord {
    pub load_id: String,
    pub pipeline_name: String,
    pub table_name: String,
    pub row_count: i64,
    pub inserted_at: chrono::NaiveDateTime,
}

/// Connected SQL destination
pub struct SqlDestination {
    pool: SqlitePool,
    dataset: String,
}

impl SqlDestination {
    /// Connect using a SQLAlchemy-style connection string
    pub async fn connect(credentials: &str, dataset: &str) -> Result<Self> {
        if dataset != SQLITE_MAIN_SCHEMA {
            bail!(
                "Dataset '{}' is not available on sqlite destinations (only '{}')",
                dataset,
                SQLITE_MAIN_SCHEMA
            );
        }

        let target = parse_credentials(credentials)?;
        if let SqliteTarget::File(path) = &target {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        // A single connection keeps in-memory databases alive for the whole run
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(target.connect_options()?)
            .await
            .with_context(|| format!("Failed to connect to {}", target))?;

        log::info!("Connected to {} (dataset '{}')", target, dataset);

        Ok(Self {
            pool,
            dataset: dataset.to_string(),
        })
    }

    /// Replace the contents of a table with the job's rows.
    ///
    /// Drop, create, insert and the history entry share one transaction, so a
    /// failed load leaves the previous table in place.
    pub async fn replace_table(&self, job: &LoadJob<'_>) -> Result<u64> {
        let table = self.qualified(&job.schema.name);
        if job.schema.columns.is_empty() {
            bail!("Table {} has no columns to create", table);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start transaction")?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to drop table {}", table))?;

        sqlx::query(&create_table_sql(&table, job.schema))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to create table {}", table))?;

        let insert_sql = insert_sql(&table, job.schema);
        let mut inserted = 0u64;
        for (idx, row) in job.rows.iter().enumerate() {
            let mut query = sqlx::query(&insert_sql);
            for value in row {
                query = bind_value(query, value);
            }
            let result = query.execute(&mut *tx).await.with_context(|| {
                format!("Failed to insert record {} into {}", idx + 1, table)
            })?;
            inserted += result.rows_affected();
        }

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                load_id TEXT NOT NULL,
                pipeline_name TEXT NOT NULL,
                table_name TEXT NOT NULL,
                row_count BIGINT NOT NULL,
                inserted_at TIMESTAMP NOT NULL
            )",
            self.qualified(LOADS_TABLE)
        ))
        .execute(&mut *tx)
        .await
        .context("Failed to create load history table")?;

        sqlx::query(&format!(
            "INSERT INTO {} (load_id, pipeline_name, table_name, row_count, inserted_at)
             VALUES (?, ?, ?, ?, ?)",
            self.qualified(LOADS_TABLE)
        ))
        .bind(job.load_id)
        .bind(job.pipeline_name)
        .bind(&job.schema.name)
        .bind(inserted as i64)
        .bind(Utc::now().naive_utc())
        .execute(&mut *tx)
        .await
        .context("Failed to record load")?;

        tx.commit().await.context("Failed to commit transaction")?;

        Ok(inserted)
    }

    /// Load history, oldest first
    #[cfg(test)]
    pub async fn load_history(&self) -> Result<Vec<LoadRecord>> {
        use sqlx::Row;

        let rows = sqlx::query(&format!(
            "SELECT load_id, pipeline_name, table_name, row_count, inserted_at
             FROM {} ORDER BY rowid",
            self.qualified(LOADS_TABLE)
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to read load history")?;

        let mut loads = Vec::with_capacity(rows.len());
        for row in rows {
            loads.push(LoadRecord {
                load_id: row.try_get("load_id")?,
                pipeline_name: row.try_get("pipeline_name")?,
                table_name: row.try_get("table_name")?,
                row_count: row.try_get("row_count")?,
                inserted_at: row.try_get("inserted_at")?,
            });
        }
        Ok(loads)
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }

    fn qualified(&self, table: &str) -> String {
        format!("{}.{}", quote_ident(&self.dataset), quote_ident(table))
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(table: &str, schema: &TableSchema) -> String {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.data_type.sql_type()))
        .collect();
    format!("CREATE TABLE {} ({})", table, columns.join(", "))
}

fn insert_sql(table: &str, schema: &TableSchema) -> String {
    let columns: Vec<String> = schema.columns.iter().map(|c| quote_ident(&c.name)).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    )
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Double(f) => query.bind(*f),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Text(s) => query.bind(s.as_str()),
        SqlValue::Timestamp(ts) => query.bind(*ts),
        SqlValue::Date(d) => query.bind(*d),
    }
}
