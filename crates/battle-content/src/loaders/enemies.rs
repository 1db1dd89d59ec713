//! Enemy template loader.

use std::path::Path;

use battle_core::EnemyTemplate;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Enemy catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyFile {
    pub enemies: Vec<EnemyTemplate>,
}

/// Loader for enemy templates from RON files.
pub struct EnemyLoader;

impl EnemyLoader {
    /// Load enemy templates from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<EnemyTemplate>> {
        let content = read_file(path)?;
        let file: EnemyFile = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse enemy catalog RON: {}", e))?;

        Ok(file.enemies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_enemies_parse() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data/enemies.ron"));
        let enemies = EnemyLoader::load(path).expect("Failed to load enemies.ron");

        assert!(enemies.len() >= 3);
        let boss = enemies
            .iter()
            .find(|e| e.is_boss)
            .expect("no boss template shipped");
        assert!(!boss.phase2_abilities.is_empty());

        for enemy in &enemies {
            if let Some(weights) = &enemy.ai_weights {
                assert_eq!(weights.len(), enemy.abilities.len(), "{}", enemy.id);
            }
        }
    }
}
