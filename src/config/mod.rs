//! Configuration management

pub mod app_config;

pub use app_config::AppConfig;

use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Versioned config migration
pub trait Migrate {
    /// The version currently stored on disk
    fn current_version(&self) -> u32;

    /// The version this build writes
    fn target_version() -> u32;

    /// Migrate the config in place up to the target version
    fn migrate(&mut self) -> Result<()>;
}

/// Default data directory for the catalog core
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join("catalog-core"))
        .ok_or_else(|| anyhow!("Could not determine local data directory"))
}
