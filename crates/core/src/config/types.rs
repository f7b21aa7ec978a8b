use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::checkpoint::CHECKPOINT_FORMAT;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub libraries: LibrariesConfig,
    #[serde(default)]
    pub orders: OrdersConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Locations of the run's inputs and outputs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_inventory")]
    pub inventory: PathBuf,
    #[serde(default = "default_orders")]
    pub orders: PathBuf,
    #[serde(default = "default_checkpoint")]
    pub checkpoint: PathBuf,
    /// Root of the output tree.
    #[serde(default = "default_downloads")]
    pub downloads: PathBuf,
    /// Name of the quarantine directory inside `downloads`.
    #[serde(default = "default_quarantine_dir_name")]
    pub quarantine_dir_name: String,
    #[serde(default = "default_report_file_name")]
    pub report_file_name: String,
}

impl PathsConfig {
    /// Absolute location of the quarantine area.
    pub fn quarantine_dir(&self) -> PathBuf {
        self.downloads.join(&self.quarantine_dir_name)
    }

    /// Location of the consolidated failure report.
    pub fn report_path(&self) -> PathBuf {
        self.quarantine_dir().join(&self.report_file_name)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            inventory: default_inventory(),
            orders: default_orders(),
            checkpoint: default_checkpoint(),
            downloads: default_downloads(),
            quarantine_dir_name: default_quarantine_dir_name(),
            report_file_name: default_report_file_name(),
        }
    }
}

fn default_inventory() -> PathBuf {
    PathBuf::from("inventory.csv")
}

fn default_orders() -> PathBuf {
    PathBuf::from("order.csv")
}

fn default_checkpoint() -> PathBuf {
    PathBuf::from("lastrun")
}

fn default_downloads() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_quarantine_dir_name() -> String {
    "errors".to_string()
}

fn default_report_file_name() -> String {
    "errors.txt".to_string()
}

/// Reference library roots searched by the local-copy strategies
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrariesConfig {
    #[serde(default = "default_primary_library")]
    pub primary: PathBuf,
    #[serde(default = "default_secondary_library")]
    pub secondary: PathBuf,
}

impl Default for LibrariesConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_library(),
            secondary: default_secondary_library(),
        }
    }
}

fn default_primary_library() -> PathBuf {
    PathBuf::from("library/primary")
}

fn default_secondary_library() -> PathBuf {
    PathBuf::from("library/secondary")
}

/// How the order feed is read
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrdersConfig {
    /// Leading banner rows skipped before the first order.
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,
    /// chrono format applied to `"{date},{time}"`.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    /// Tried when `timestamp_format` does not match.
    #[serde(default = "default_fallback_timestamp_format")]
    pub fallback_timestamp_format: String,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            header_rows: default_header_rows(),
            timestamp_format: default_timestamp_format(),
            fallback_timestamp_format: default_fallback_timestamp_format(),
        }
    }
}

fn default_header_rows() -> usize {
    6
}

fn default_timestamp_format() -> String {
    CHECKPOINT_FORMAT.to_string()
}

fn default_fallback_timestamp_format() -> String {
    "%m/%d/%Y,%H:%M".to_string()
}

/// Remote image fetch settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Write buffer size for streamed bodies, in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Request timeout. Unset means requests may block indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_secs: None,
        }
    }
}

fn default_chunk_size() -> usize {
    1024
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/17.2.1 Safari/605.1.15"
        .to_string()
}

fn default_accept_language() -> String {
    "en-GB,en-US;q=0.9,en;q=0.8".to_string()
}

/// Log sinks
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Console filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// File filter when `RUST_LOG` is not set.
    #[serde(default = "default_file_log_level")]
    pub file_level: String,
    /// Directory for the rolling log file.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
    /// Rotated log files kept on disk.
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
    /// Mirror log lines to stdout.
    #[serde(default = "default_true")]
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_level: default_file_log_level(),
            dir: default_log_dir(),
            file_prefix: default_log_file_prefix(),
            max_files: default_max_log_files(),
            console: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_file_log_level() -> String {
    "debug".to_string()
}

fn default_max_log_files() -> usize {
    5
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_file_prefix() -> String {
    "orderpix.log".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.paths.inventory, PathBuf::from("inventory.csv"));
        assert_eq!(config.paths.orders, PathBuf::from("order.csv"));
        assert_eq!(config.paths.checkpoint, PathBuf::from("lastrun"));
        assert_eq!(config.orders.header_rows, 6);
        assert_eq!(config.orders.timestamp_format, "%m/%d/%Y,%I:%M %p");
        assert_eq!(config.fetch.chunk_size, 1024);
        assert!(config.fetch.timeout_secs.is_none());
        assert!(config.logging.console);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file_level, "debug");
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn test_quarantine_paths_derive_from_downloads() {
        let toml = r#"
[paths]
downloads = "/srv/out"
quarantine_dir_name = "failed"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.paths.quarantine_dir(), PathBuf::from("/srv/out/failed"));
        assert_eq!(
            config.paths.report_path(),
            PathBuf::from("/srv/out/failed/errors.txt")
        );
    }

    #[test]
    fn test_deserialize_libraries_and_fetch() {
        let toml = r#"
[libraries]
primary = "/lib/a"
secondary = "/lib/b"

[fetch]
chunk_size = 4096
timeout_secs = 15
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.libraries.primary, PathBuf::from("/lib/a"));
        assert_eq!(config.libraries.secondary, PathBuf::from("/lib/b"));
        assert_eq!(config.fetch.chunk_size, 4096);
        assert_eq!(config.fetch.timeout_secs, Some(15));
        assert!(config.fetch.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_wrong_value_type_fails() {
        let toml = r#"
[orders]
header_rows = "six"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
