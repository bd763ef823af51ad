//! Configuration module
//!
//! Provides layered configuration loading from files, environment
//! variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`TRIAGE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use triage::config::TriageConfig;
//!
//! // Load defaults
//! let config = TriageConfig::default();
//! assert_eq!(config.batch.cutover_hour_utc, 15);
//!
//! // Parse from TOML
//! let toml = r#"
//! [batch]
//! cutover_hour_utc = 0
//! "#;
//! let config: TriageConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.batch.cutover_hour_utc, 0);
//! ```

pub mod batch;
pub mod catalog;
pub mod directory;
pub mod error;
pub mod logging;

pub use batch::BatchConfig;
pub use catalog::CatalogConfig;
pub use directory::{
    vendor_map, AccountRouteConfig, AllocationConfig, AreaRouteConfig, DirectoryConfig,
    NoTouchRouteConfig, ProfileConfig,
};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for a triage run.
///
/// Aggregates the batch settings, keyword catalog location, logging, the
/// routing profiles and the dispatch directory tables.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TriageConfig {
    /// Batch stage settings
    pub batch: BatchConfig,
    /// Keyword catalog location
    pub catalog: CatalogConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Routing profile declarations
    pub profiles: Vec<ProfileConfig>,
    /// Destination configuration tables
    pub directory: DirectoryConfig,
}

impl TriageConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports TRIAGE_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("TRIAGE_DATA_DIR") {
            self.batch.data_dir = dir.into();
        }
        if let Ok(hour) = std::env::var("TRIAGE_CUTOVER_HOUR") {
            if let Ok(h) = hour.parse() {
                self.batch.cutover_hour_utc = h;
            }
        }
        if let Ok(dir) = std::env::var("TRIAGE_CATALOG_DIR") {
            self.catalog.dir = dir.into();
        }
        if let Ok(level) = std::env::var("TRIAGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TRIAGE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.cutover_hour_utc > 23 {
            return Err(ConfigError::Validation {
                field: "batch.cutover_hour_utc".to_string(),
                message: "must be an hour 0-23".to_string(),
            });
        }

        directory::validate_profiles(&self.profiles)?;
        self.directory.validate(&self.profiles)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_triage_config_defaults() {
        let config = TriageConfig::default();
        assert_eq!(config.batch.cutover_hour_utc, 15);
        assert!(config.profiles.is_empty());
        assert!(config.directory.allocations.is_empty());
    }

    #[test]
    fn test_config_parse_minimal_toml() {
        let toml = r#"
        [batch]
        cutover_hour_utc = 0
        "#;

        let config: TriageConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.batch.cutover_hour_utc, 0);
        assert_eq!(config.catalog.dir, std::path::PathBuf::from("config/catalog"));
    }

    #[test]
    fn test_config_parse_full_toml() {
        let toml = include_str!("../../triage.example.toml");
        let config: TriageConfig = toml::from_str(toml).unwrap();
        assert!(!config.profiles.is_empty());
        assert!(!config.directory.allocations.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_config_parse_directory_tables() {
        let toml = r#"
        [[profiles]]
        id = "00000000-0000-0000-0000-000000000001"
        name = "metro-east"

        [[directory.allocations]]
        profile = "00000000-0000-0000-0000-000000000001"
        rate = 1.5
        rate_a = 2.0
        normal = { a = true, b = true }
        destination = { company = "00000000-0000-0000-0000-000000000010", division = "00000000-0000-0000-0000-000000000011", section = "00000000-0000-0000-0000-000000000012", unit = "00000000-0000-0000-0000-000000000013" }
        "#;

        let config: TriageConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.directory.allocations.len(), 1);
        let alloc = &config.directory.allocations[0];
        assert!((alloc.rate - 1.5).abs() < f64::EPSILON);
        assert!(alloc.normal.a && alloc.normal.b && !alloc.normal.c);
        config.validate().unwrap();
    }

    #[test]
    fn test_config_load_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[batch]\ncutover_hour_utc = 6").unwrap();

        let config = TriageConfig::load(Some(temp.path())).unwrap();
        assert_eq!(config.batch.cutover_hour_utc, 6);
    }

    #[test]
    fn test_config_missing_file_error() {
        let result = TriageConfig::load(Some(Path::new("/nonexistent/triage.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_env_override_data_dir() {
        std::env::set_var("TRIAGE_DATA_DIR", "/tmp/triage-data");
        let config = TriageConfig::default().with_env_overrides();
        std::env::remove_var("TRIAGE_DATA_DIR");

        assert_eq!(
            config.batch.data_dir,
            std::path::PathBuf::from("/tmp/triage-data")
        );
    }

    #[test]
    fn test_config_env_override_log_level() {
        std::env::set_var("TRIAGE_LOG_LEVEL", "debug");
        let config = TriageConfig::default().with_env_overrides();
        std::env::remove_var("TRIAGE_LOG_LEVEL");

        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_env_invalid_value_ignored() {
        std::env::set_var("TRIAGE_CUTOVER_HOUR", "not-a-number");
        let config = TriageConfig::default().with_env_overrides();
        std::env::remove_var("TRIAGE_CUTOVER_HOUR");

        // Should keep default, not crash
        assert_eq!(config.batch.cutover_hour_utc, 15);
    }

    #[test]
    fn test_config_validation_bad_cutover_hour() {
        let mut config = TriageConfig::default();
        config.batch.cutover_hour_utc = 24;

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "batch.cutover_hour_utc"
        ));
    }

    #[test]
    fn test_config_load_none_returns_defaults() {
        let config = TriageConfig::load(None).unwrap();
        assert_eq!(config.batch.cutover_hour_utc, 15);
    }
}
