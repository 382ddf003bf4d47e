//! CLI configuration discovery and loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rebalance_core::EngineConfig;
use tracing::debug;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "REBALANCE_CONFIG";

/// Configuration file picked up from the working directory.
pub const LOCAL_CONFIG: &str = "rebalance.toml";

/// Resolve which configuration file to use.
///
/// Precedence:
/// 1. `--config` argument
/// 2. `REBALANCE_CONFIG` environment variable
/// 3. `./rebalance.toml` if present
/// 4. None (built-in defaults)
pub fn resolve_path(cli: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var(CONFIG_ENV).ok().filter(|path| !path.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(LOCAL_CONFIG);
    local.is_file().then_some(local)
}

/// Load the effective engine configuration.
pub fn load(cli: Option<&Path>) -> Result<EngineConfig> {
    match resolve_path(cli) {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration");
            EngineConfig::load_from_file(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}
