//! Configuration types for pulselog

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Remote repository configuration
///
/// Identifies the version-controlled content store the export writes to
/// and the credentials used to reach it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the contents API (default: `https://api.github.com`)
    ///
    /// Tests point this at a local mock server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Account that owns the export repository
    #[serde(default)]
    pub owner: String,

    /// Repository name (default: "health")
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Access token used for basic authentication
    #[serde(default)]
    pub token: Option<String>,

    /// Author name recorded on export commits (default: "pulselog")
    #[serde(default = "default_author_name")]
    pub author_name: String,

    /// Author email recorded on export commits
    #[serde(default = "default_author_email")]
    pub author_email: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            owner: String::new(),
            repository: default_repository(),
            token: None,
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

/// Export behavior configuration (history window, README template)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// First day considered when fetching activity and distance history
    /// (default: 2014-01-01, the earliest date the data source can hold)
    #[serde(default = "default_history_start")]
    pub history_start: NaiveDate,

    /// Content written to the repository README during first-time setup
    #[serde(default = "default_readme_template")]
    pub readme_template: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            history_start: default_history_start(),
            readme_template: default_readme_template(),
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path to the SQLite database holding sync-state markers
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Main configuration for the export engine
///
/// Fields are organized into logical sub-configs:
/// - [`remote`](RemoteConfig) — repository identity and credentials
/// - [`export`](ExportConfig) — history window and README template
/// - [`persistence`](PersistenceConfig) — sync-state storage
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote repository settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Export behavior settings
    #[serde(flatten)]
    pub export: ExportConfig,

    /// Data storage and state management
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_repository() -> String {
    "health".to_string()
}

fn default_author_name() -> String {
    "pulselog".to_string()
}

fn default_author_email() -> String {
    "export@pulselog.dev".to_string()
}

fn default_history_start() -> NaiveDate {
    // Earliest day the upstream data source can report
    NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_readme_template() -> String {
    "This repository is managed by pulselog.\n".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./pulselog.db")
}
