//! Loot table loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::LootTable;
use crate::loaders::{LoadResult, read_file};

/// Loot table structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootFile {
    pub tables: Vec<LootTable>,
}

/// Loader for loot tables from RON files.
pub struct LootLoader;

impl LootLoader {
    /// Load loot tables from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<LootTable>> {
        let content = read_file(path)?;
        let file: LootFile = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse loot table RON: {}", e))?;

        Ok(file.tables)
    }
}
