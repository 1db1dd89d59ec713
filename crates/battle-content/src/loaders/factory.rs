//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use battle_core::{AbilityId, EnemyTemplate, RosterCharacter};

use crate::catalog::{AbilityCatalog, LootTable, StaticLootTable, ThresholdLeveling};
use crate::loaders::{
    AbilityLoader, ConfigLoader, ContentConfig, EnemyLoader, LoadResult, LootLoader, RosterLoader,
};

/// Everything a battle needs, loaded and cross-validated.
#[derive(Debug)]
pub struct ContentBundle {
    pub config: ContentConfig,
    pub catalog: AbilityCatalog,
    pub enemies: Vec<EnemyTemplate>,
    pub roster: Vec<RosterCharacter>,
    pub loot: StaticLootTable,
    pub leveling: ThresholdLeveling,
}

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── battle.toml
/// ├── abilities.ron
/// ├── enemies.ron
/// ├── roster.ron
/// └── loot.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load encounter configuration from `battle.toml`.
    pub fn load_config(&self) -> LoadResult<ContentConfig> {
        ConfigLoader::load(&self.data_dir.join("battle.toml"))
    }

    /// Load and validate the ability catalog from `abilities.ron`.
    pub fn load_abilities(&self) -> LoadResult<AbilityCatalog> {
        let definitions = AbilityLoader::load(&self.data_dir.join("abilities.ron"))?;
        AbilityCatalog::new(definitions)
    }

    /// Load enemy templates from `enemies.ron`.
    pub fn load_enemies(&self) -> LoadResult<Vec<EnemyTemplate>> {
        EnemyLoader::load(&self.data_dir.join("enemies.ron"))
    }

    /// Load roster characters from `roster.ron`.
    pub fn load_roster(&self) -> LoadResult<Vec<RosterCharacter>> {
        RosterLoader::load(&self.data_dir.join("roster.ron"))
    }

    /// Load and validate loot tables from `loot.ron`.
    pub fn load_loot(&self) -> LoadResult<StaticLootTable> {
        let tables: Vec<LootTable> = LootLoader::load(&self.data_dir.join("loot.ron"))?;
        StaticLootTable::new(tables)
    }

    /// Load the complete content set and check cross-references.
    ///
    /// Beyond per-file validation this verifies that every ability key used
    /// by an enemy or roster character exists in the catalog, and that every
    /// loot table belongs to a known enemy template. Catching dangling keys
    /// here keeps battle construction failures out of play sessions.
    pub fn load_bundle(&self) -> LoadResult<ContentBundle> {
        let config = self.load_config().context("loading battle.toml")?;
        let catalog = self.load_abilities().context("loading abilities.ron")?;
        let enemies = self.load_enemies().context("loading enemies.ron")?;
        let roster = self.load_roster().context("loading roster.ron")?;
        let loot = self.load_loot().context("loading loot.ron")?;

        for enemy in &enemies {
            let keys = enemy
                .abilities
                .iter()
                .chain(enemy.phase2_abilities.iter())
                .chain(enemy.default_ability.iter());
            for key in keys {
                require_known(&catalog, key, &enemy.id)?;
            }
        }
        for character in &roster {
            for key in &character.abilities {
                require_known(&catalog, key, &character.name)?;
            }
        }

        for template_id in loot.template_ids() {
            if !enemies.iter().any(|e| e.id == template_id) {
                bail!("loot table references unknown enemy template `{template_id}`");
            }
        }

        let leveling = ThresholdLeveling::new(config.progression.xp_thresholds.clone());

        Ok(ContentBundle {
            config,
            catalog,
            enemies,
            roster,
            loot,
            leveling,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn require_known(catalog: &AbilityCatalog, key: &AbilityId, owner: &str) -> LoadResult<()> {
    if catalog.get(key).is_none() {
        bail!("`{owner}` references unknown ability `{key}`");
    }
    Ok(())
}
