//! Keyword catalog location configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the keyword rule files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("config/catalog"),
        }
    }
}
