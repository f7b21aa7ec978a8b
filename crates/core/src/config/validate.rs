use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Fetch chunk size is not 0
/// - Quarantine directory name is a single non-empty path component
/// - Inventory and order feeds are different files
/// - At least one log file is kept
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.fetch.chunk_size == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.chunk_size cannot be 0".to_string(),
        ));
    }

    let quarantine = config.paths.quarantine_dir_name.trim();
    if quarantine.is_empty()
        || quarantine.contains(['/', '\\'])
        || quarantine == "."
        || quarantine == ".."
    {
        return Err(ConfigError::ValidationError(format!(
            "paths.quarantine_dir_name must be a plain directory name, got {:?}",
            config.paths.quarantine_dir_name
        )));
    }

    if config.paths.report_file_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "paths.report_file_name cannot be empty".to_string(),
        ));
    }

    if config.paths.inventory == config.paths.orders {
        return Err(ConfigError::ValidationError(
            "paths.inventory and paths.orders point at the same file".to_string(),
        ));
    }

    if config.logging.max_files == 0 {
        return Err(ConfigError::ValidationError(
            "logging.max_files cannot be 0".to_string(),
        ));
    }

    Ok(())
}
