mod file_config;

pub use file_config::FileConfig;

use crate::user_data::DEFAULT_HISTORY_MAX_ENTRIES;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// Mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub data_dir: Option<PathBuf>,
    pub catalog_dir: Option<PathBuf>,
    pub slot_quota_bytes: Option<usize>,
    pub history_max_entries: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the slot documents. Created on first write, so
    /// it does not have to exist yet.
    pub data_dir: PathBuf,
    pub catalog_dir: Option<PathBuf>,
    pub slot_quota_bytes: Option<usize>,
    pub history_max_entries: Option<usize>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<AppConfig> {
        let file = file_config.unwrap_or_default();

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .or_else(|| cli.data_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("data_dir must be specified via --data-dir or in config file")
            })?;

        if data_dir.exists() && !data_dir.is_dir() {
            bail!("data_dir is not a directory: {:?}", data_dir);
        }

        let catalog_dir = file
            .catalog_dir
            .map(PathBuf::from)
            .or_else(|| cli.catalog_dir.clone());

        if let Some(catalog_dir) = &catalog_dir {
            if !catalog_dir.is_dir() {
                bail!("Catalog directory does not exist: {:?}", catalog_dir);
            }
        }

        let slot_quota_bytes = file.slot_quota_bytes.or(cli.slot_quota_bytes);
        let history_max_entries = file
            .history_max_entries
            .or(cli.history_max_entries)
            .or(Some(DEFAULT_HISTORY_MAX_ENTRIES));

        Ok(AppConfig {
            data_dir,
            catalog_dir,
            slot_quota_bytes,
            history_max_entries,
        })
    }
}
