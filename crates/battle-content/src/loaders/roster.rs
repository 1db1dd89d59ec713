//! Roster character loader.

use std::path::Path;

use battle_core::RosterCharacter;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Roster structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterFile {
    pub characters: Vec<RosterCharacter>,
}

/// Loader for roster characters from RON files.
pub struct RosterLoader;

impl RosterLoader {
    /// Load roster characters from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<RosterCharacter>> {
        let content = read_file(path)?;
        let file: RosterFile = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;

        Ok(file.characters)
    }
}
