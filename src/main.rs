use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pezzottube_local_store::catalog::load_catalog;
use pezzottube_local_store::config::{AppConfig, CliConfig, FileConfig};
use pezzottube_local_store::session::{AccountStore, SessionStore};
use pezzottube_local_store::storage::FileSlotStore;
use pezzottube_local_store::user_data::{unparseable_slots, UserData};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the slot documents. Created on first write.
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_path)]
    pub data_dir: Option<PathBuf>,

    /// Directory of the canonical catalog (videos/ and channels/ subdirs).
    /// When given, stored ids are checked against it.
    #[clap(long, value_parser = parse_path)]
    pub catalog_dir: Option<PathBuf>,

    /// Maximum payload size of a single slot, in bytes.
    #[clap(long)]
    pub slot_quota_bytes: Option<usize>,

    /// Maximum number of watch-history entries to retain.
    #[clap(long)]
    pub history_max_entries: Option<usize>,

    /// Only report on the store contents; exit non-zero when a slot fails
    /// to parse or a stored id is stale.
    #[clap(long)]
    pub check_only: bool,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            data_dir: args.data_dir.clone(),
            catalog_dir: args.catalog_dir.clone(),
            slot_quota_bytes: args.slot_quota_bytes,
            history_max_entries: args.history_max_entries,
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&CliConfig::from(&cli_args), file_config)?;

    let slots = Arc::new(FileSlotStore::with_quota(
        &config.data_dir,
        config.slot_quota_bytes,
    )?);
    let user_data = UserData::load_with_history_cap(slots.clone(), config.history_max_entries)?;
    let accounts = AccountStore::load(slots.clone())?;
    let session = SessionStore::new(slots.clone());

    match session.current()? {
        Some(record) => info!("Signed in as {}", record.handle),
        None => info!("Nobody is signed in"),
    }
    info!(
        "Store at {:?} has:\n{} liked videos\n{} watch-later videos\n{} history entries\n{} subscriptions\n{} playlists\n{} accounts",
        config.data_dir,
        user_data.liked_videos.len(),
        user_data.watch_later.len(),
        user_data.history.len(),
        user_data.subscriptions.len(),
        user_data.playlists.len(),
        accounts.len(),
    );

    let mut check_failed = false;

    if cli_args.check_only {
        let corrupt = unparseable_slots(slots.as_ref());
        if corrupt.is_empty() {
            info!("Every slot parses.");
        } else {
            warn!("Found {} unparseable slots:", corrupt.len());
            for problem in &corrupt {
                warn!("- {}", problem);
            }
            check_failed = true;
        }
    }

    if let Some(catalog_dir) = &config.catalog_dir {
        let catalog = load_catalog(catalog_dir)?;
        let stale = user_data.stale_references(&catalog);
        if stale.is_empty() {
            info!("All stored ids resolve against the catalog.");
        } else {
            warn!("Found {} stale references:", stale.total());
            for (collection, ids) in [
                ("liked videos", &stale.liked_videos),
                ("watch later", &stale.watch_later),
                ("history", &stale.history),
                ("subscriptions", &stale.subscriptions),
                ("playlists", &stale.playlist_videos),
            ] {
                for id in ids {
                    warn!("- {}: {}", collection, id);
                }
            }
            check_failed = true;
        }
    } else if cli_args.check_only {
        warn!("--check-only without --catalog-dir, stale references not checked");
    }

    if cli_args.check_only && check_failed {
        std::process::exit(1);
    }
    Ok(())
}
