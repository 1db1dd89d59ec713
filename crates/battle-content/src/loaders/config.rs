//! Encounter configuration loader.

use std::path::Path;

use battle_core::BattleConfig;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Top-level configuration structure for TOML files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    pub battle: BattleConfig,
    #[serde(default)]
    pub progression: ProgressionConfig,
}

/// Party progression parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Cumulative XP totals needed to reach level 2, 3, and so on.
    pub xp_thresholds: Vec<u32>,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_thresholds: vec![30, 80, 160, 280, 450],
        }
    }
}

/// Loader for encounter configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> LoadResult<ContentConfig> {
        let content = read_file(path)?;
        let config: ContentConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_parses() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data/battle.toml"));
        let config = ConfigLoader::load(path).expect("Failed to load battle.toml");

        assert!(config.battle.flee_allowed);
        // Thresholds must be strictly increasing for the leveling walk.
        let t = &config.progression.xp_thresholds;
        assert!(t.windows(2).all(|w| w[0] < w[1]));
    }
}
