//! Content loaders for reading battle data from files.
//!
//! Each loader converts one RON/TOML file into `battle-core` types; the
//! [`ContentFactory`] ties them to a data directory and cross-validates the
//! loaded set.

pub mod abilities;
pub mod config;
pub mod enemies;
pub mod factory;
pub mod loot;
pub mod roster;

pub use abilities::AbilityLoader;
pub use config::{ConfigLoader, ContentConfig, ProgressionConfig};
pub use enemies::EnemyLoader;
pub use factory::{ContentBundle, ContentFactory};
pub use loot::LootLoader;
pub use roster::RosterLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
