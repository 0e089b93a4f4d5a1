//! Configuration file lookup and loading.
//!
//! Resolution order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `swift-style.toml` or `.swift-style.toml` in the checked directory or
//!    one of its parents, up to the package root (`Package.swift` or `.git`)
//! 3. `$SWIFT_STYLE_CONFIG_DIR/config.toml`, else `~/.swift-style/config.toml`
//! 4. No config found: defaults

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use swift_style::Config;
use tracing::{debug, info};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found next to the sources.
    Project(PathBuf),
    /// Found in the user's global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            info!("Using global config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// File names recognised next to the sources, in priority order.
const PROJECT_CONFIG_NAMES: &[&str] = &["swift-style.toml", ".swift-style.toml"];

/// Files that mark the top of a package; the upward search stops there.
const ROOT_MARKERS: &[&str] = &["Package.swift", ".git"];

/// Config file name inside the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration for checking `target`.
#[must_use]
pub fn resolve(target: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_with(target, explicit, global_config_dir())
}

fn resolve_with(target: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    let start = if target.is_file() {
        target.parent().unwrap_or(target)
    } else {
        target
    };
    for dir in start.ancestors() {
        if let Some(found) = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            debug!("Found project config: {}", found.display());
            return ConfigSource::Project(found);
        }
        if ROOT_MARKERS.iter().any(|marker| dir.join(marker).exists()) {
            break;
        }
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, |found| {
            debug!("Found global config: {}", found.display());
            ConfigSource::Global(found)
        })
}

/// The global config directory: `$SWIFT_STYLE_CONFIG_DIR`, else
/// `~/.swift-style/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("SWIFT_STYLE_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".swift-style"))
}
