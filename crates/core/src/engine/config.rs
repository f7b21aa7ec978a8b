//! Engine configuration.

use std::path::PathBuf;

use crate::config::Config;

/// Settings the engine needs, derived from the full [`Config`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root of the output tree.
    pub downloads_dir: PathBuf,
    /// Quarantine area, normally inside `downloads_dir`.
    pub quarantine_dir: PathBuf,
    /// File name of the failure report inside `quarantine_dir`.
    pub report_file_name: String,
    pub primary_library: PathBuf,
    pub secondary_library: PathBuf,
    /// Leading order feed rows to skip.
    pub header_rows: usize,
    pub timestamp_format: String,
    pub fallback_timestamp_format: String,
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            downloads_dir: config.paths.downloads.clone(),
            quarantine_dir: config.paths.quarantine_dir(),
            report_file_name: config.paths.report_file_name.clone(),
            primary_library: config.libraries.primary.clone(),
            secondary_library: config.libraries.secondary.clone(),
            header_rows: config.orders.header_rows,
            timestamp_format: config.orders.timestamp_format.clone(),
            fallback_timestamp_format: config.orders.fallback_timestamp_format.clone(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.paths.downloads = PathBuf::from("/srv/out");
        config.paths.quarantine_dir_name = "failed".to_string();
        config.orders.header_rows = 2;

        let engine = EngineConfig::from(&config);
        assert_eq!(engine.downloads_dir, PathBuf::from("/srv/out"));
        assert_eq!(engine.quarantine_dir, PathBuf::from("/srv/out/failed"));
        assert_eq!(engine.report_file_name, "errors.txt");
        assert_eq!(engine.header_rows, 2);
        assert_eq!(engine.timestamp_format, "%m/%d/%Y,%I:%M %p");
        assert_eq!(engine.fallback_timestamp_format, "%m/%d/%Y,%H:%M");
    }
}
