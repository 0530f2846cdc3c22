use std::fs;
use std::path::{Path, PathBuf};

use super::core::KbstatsConfig;
use super::CONFIG_FILE_NAME;
use crate::errors::{Error, Result};

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse config file contents.
pub fn parse_config(contents: &str) -> std::result::Result<KbstatsConfig, String> {
    toml::from_str::<KbstatsConfig>(contents)
        .map_err(|e| format!("Failed to parse {CONFIG_FILE_NAME}: {e}"))
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config_from(path: &Path) -> Result<KbstatsConfig> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::Configuration(format!("cannot read {}: {e}", path.display()))
    })?;
    let config = parse_config(&contents)
        .map_err(|e| Error::Configuration(format!("{}: {e}", path.display())))?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// `start` and up to `max_depth - 1` of its ancestors, nearest first.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Find the nearest config file at or above `start`.
pub fn find_config(start: PathBuf) -> Option<PathBuf> {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|path| path.is_file())
}

/// Load the nearest config file above the current directory, or the
/// defaults when there is none. A file that exists but does not parse is an
/// error.
pub fn load_config() -> Result<KbstatsConfig> {
    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            return Ok(KbstatsConfig::default());
        }
    };

    match find_config(current) {
        Some(path) => load_config_from(&path),
        None => {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            Ok(KbstatsConfig::default())
        }
    }
}
