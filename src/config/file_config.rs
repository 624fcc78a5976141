use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Optional TOML configuration file. Every field is optional; values set
/// here override CLI arguments during [`super::AppConfig::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub data_dir: Option<String>,
    pub catalog_dir: Option<String>,
    pub slot_quota_bytes: Option<usize>,
    pub history_max_entries: Option<usize>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
        let text = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {:?}", path.as_ref()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {:?}", path.as_ref()))
    }
}
