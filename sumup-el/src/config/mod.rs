//! Run configuration, resolved once from the environment at start-up

use std::path::PathBuf;

/// Base directory of the source workbooks
pub const RAW_DATA_PATH_VAR: &str = "RAW_DATA_PATH";
/// Connection string for the SQL destination
pub const CREDENTIALS_VAR: &str = "DESTINATION__SQLALCHEMY__CREDENTIALS";

pub const DEFAULT_RAW_DATA_PATH: &str = "data/raw";
pub const PIPELINE_NAME: &str = "sumup";
pub const DATASET_NAME: &str = "main";

/// Everything a run needs, passed explicitly to the orchestrator
#[derive(Clone)]
pub struct Config {
    pub raw_data_path: PathBuf,
    /// Not validated here; a bad or missing value fails when the destination connects
    pub credentials: Option<String>,
    pub pipeline_name: String,
    pub destination: String,
    pub dataset_name: String,
    /// Read the workbooks but do not load anything
    pub dry_run: bool,
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            raw_data_path: var(RAW_DATA_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RAW_DATA_PATH)),
            credentials: var(CREDENTIALS_VAR),
            pipeline_name: PIPELINE_NAME.to_string(),
            destination: crate::load::SQLALCHEMY_DESTINATION.to_string(),
            dataset_name: DATASET_NAME.to_string(),
            dry_run: false,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("raw_data_path", &self.raw_data_path)
            .field(
                "credentials",
                &self.credentials.as_ref().map(|_| "<redacted>"),
            )
            .field("pipeline_name", &self.pipeline_name)
            .field("destination", &self.destination)
            .field("dataset_name", &self.dataset_name)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.raw_data_path, PathBuf::from("data/raw"));
        assert_eq!(config.credentials, None);
        assert_eq!(config.pipeline_name, "sumup");
        assert_eq!(config.destination, "sqlalchemy");
        assert_eq!(config.dataset_name, "main");
        assert!(!config.dry_run);
    }

    #[test]
    fn test_values_from_environment() {
        let config = config_from(&[
            ("RAW_DATA_PATH", "/srv/raw"),
            ("DESTINATION__SQLALCHEMY__CREDENTIALS", "sqlite:///dwh.db"),
        ]);

        assert_eq!(config.raw_data_path, PathBuf::from("/srv/raw"));
        assert_eq!(config.credentials.as_deref(), Some("sqlite:///dwh.db"));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = config_from(&[("RAW_DATA_PATH", ""), ("DESTINATION__SQLALCHEMY__CREDENTIALS", "  ")]);

        assert_eq!(config.raw_data_path, PathBuf::from("data/raw"));
        assert_eq!(config.credentials, None);
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = config_from(&[(
            "DESTINATION__SQLALCHEMY__CREDENTIALS",
            "postgresql://loader:hunter2@db/dwh",
        )]);

        let debug = format!("{:?}", config);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("hunter2"));
    }
}
