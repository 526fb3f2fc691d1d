//! SQLAlchemy-style connection strings for the SQL destination
//!
//! Only the SQLite dialect is supported:
//! - `sqlite://` and `sqlite:///:memory:` → in-memory database
//! - `sqlite:///warehouse.db` → path relative to the working directory
//! - `sqlite:////var/data/warehouse.db` → absolute path
//!
//! A driver suffix (`sqlite+pysqlite://`) and query parameters are accepted
//! and ignored.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use sqlx::sqlite::SqliteConnectOptions;

/// Where the SQLite database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
    Memory,
    File(PathBuf),
}

impl SqliteTarget {
    /// Connection options for this target; file databases are created if missing
    pub fn connect_options(&self) -> Result<SqliteConnectOptions> {
        match self {
            SqliteTarget::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .context("Failed to build in-memory SQLite options"),
            SqliteTarget::File(path) => Ok(SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)),
        }
    }
}

impl std::fmt::Display for SqliteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqliteTarget::Memory => write!(f, "sqlite (in-memory)"),
            SqliteTarget::File(path) => write!(f, "sqlite at {}", path.display()),
        }
    }
}

/// Parse a connection string into a SQLite target
pub fn parse_credentials(url: &str) -> Result<SqliteTarget> {
    let url = url.trim();
    let (scheme, rest) = url
        .split_once("://")
        .with_context(|| format!("Malformed connection string (expected '<dialect>://...'): {}", redact(url)))?;

    let dialect = scheme.split('+').next().unwrap_or(scheme).to_lowercase();
    if dialect != "sqlite" {
        bail!(
            "Unsupported destination dialect '{}': only sqlite connection strings are supported",
            dialect
        );
    }

    let location = rest.split('?').next().unwrap_or(rest);
    let path = match location.strip_prefix('/') {
        Some(path) => path,
        None if location.is_empty() => return Ok(SqliteTarget::Memory),
        None => bail!(
            "Malformed sqlite connection string '{}': expected sqlite:///<path>",
            url
        ),
    };

    if path.is_empty() || path == ":memory:" {
        return Ok(SqliteTarget::Memory);
    }

    Ok(SqliteTarget::File(PathBuf::from(path)))
}

/// Hide the password part of a URL before it goes into an error message
fn redact(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return "<redacted>".to_string();
    };
    match rest.split_once('@') {
        Some((userinfo, host)) => {
            let user = userinfo.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => url.to_string(),
    }
}
