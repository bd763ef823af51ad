//! Batch run configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings of the batch stage itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory receiving run outputs (error CSV, routed tickets).
    pub data_dir: PathBuf,
    /// UTC hour at which the daily/monthly allocation windows cut over.
    pub cutover_hour_utc: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cutover_hour_utc: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BatchConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.cutover_hour_utc, 15);
    }
}
