//! Oracle implementations backed by loaded content.
//!
//! These are the runtime counterparts of the data files: an ability catalog
//! serving [`battle_core::AbilityOracle`], a weighted loot table serving
//! [`battle_core::LootOracle`], and a threshold-based leveling model serving
//! [`battle_core::LevelingOracle`].

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::bail;
use battle_core::{
    AbilityDefinition, AbilityId, AbilityKind, AbilityOracle, LevelUp, LevelingOracle, LootOracle,
    PcgRng, RngOracle,
};
use serde::{Deserialize, Serialize};

/// Immutable ability catalog with load-time integrity checks.
#[derive(Debug, Clone)]
pub struct AbilityCatalog {
    abilities: HashMap<AbilityId, AbilityDefinition>,
}

impl AbilityCatalog {
    /// Builds the catalog, rejecting definitions that cannot work at runtime.
    pub fn new(definitions: Vec<AbilityDefinition>) -> anyhow::Result<Self> {
        let mut abilities = HashMap::with_capacity(definitions.len());
        for definition in definitions {
            if matches!(definition.kind, AbilityKind::Buff | AbilityKind::Debuff)
                && definition.power == 0
                && definition.effect.is_none()
            {
                bail!(
                    "ability `{}` is a support ability with neither power nor effect",
                    definition.id
                );
            }
            if definition.revive && definition.kind != AbilityKind::Heal {
                bail!("ability `{}` is revive-flagged but not a heal", definition.id);
            }
            if matches!(definition.kind, AbilityKind::Heal) && definition.heal_amount.is_none() {
                bail!("heal ability `{}` has no heal amount", definition.id);
            }

            let id = definition.id.clone();
            if abilities.insert(id.clone(), definition).is_some() {
                bail!("duplicate ability id `{id}`");
            }
        }
        Ok(Self { abilities })
    }

    pub fn get(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &AbilityId> {
        self.abilities.keys()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

impl AbilityOracle for AbilityCatalog {
    fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.get(id)
    }
}

/// One possible drop within an enemy's loot table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootEntry {
    /// Item key handed to the inventory layer.
    pub item: String,
    /// Drop chance in percent.
    pub chance: u32,
}

/// Loot table for one enemy template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootTable {
    /// Enemy template key this table belongs to.
    pub enemy: String,
    pub entries: Vec<LootEntry>,
}

/// Seed-addressed loot oracle over static per-template tables.
///
/// One d100 is rolled per defeated enemy and walked through the entries
/// cumulatively, so a table of `35 / 25` drops the first item on 1-35, the
/// second on 36-60, and nothing otherwise.
#[derive(Debug, Clone)]
pub struct StaticLootTable {
    tables: HashMap<String, Vec<LootEntry>>,
    rng: PcgRng,
}

impl StaticLootTable {
    pub fn new(tables: Vec<LootTable>) -> anyhow::Result<Self> {
        let mut map = HashMap::with_capacity(tables.len());
        for table in tables {
            let total: u32 = table.entries.iter().map(|e| e.chance).sum();
            if total > 100 {
                bail!(
                    "loot table for `{}` has drop chances summing to {total}%",
                    table.enemy
                );
            }
            if map.insert(table.enemy.clone(), table.entries).is_some() {
                bail!("duplicate loot table for `{}`", table.enemy);
            }
        }
        Ok(Self {
            tables: map,
            rng: PcgRng,
        })
    }

    pub fn template_ids(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl LootOracle for StaticLootTable {
    fn roll_loot(&self, template_id: &str, seed: u64) -> Option<String> {
        let entries = self.tables.get(template_id)?;
        let roll = self.rng.roll_d100(seed);

        let mut cumulative = 0;
        for entry in entries {
            cumulative += entry.chance;
            if roll <= cumulative {
                return Some(entry.item.clone());
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct MemberProgress {
    level: u32,
    xp: u32,
}

/// Leveling oracle over cumulative XP thresholds.
///
/// `thresholds[i]` is the total XP needed to reach level `i + 2`; everyone
/// starts at level 1 with zero XP. Progress is tracked per roster member and
/// persists for the oracle's lifetime, spanning battles.
#[derive(Debug)]
pub struct ThresholdLeveling {
    thresholds: Vec<u32>,
    progress: Mutex<HashMap<String, MemberProgress>>,
}

impl ThresholdLeveling {
    pub fn new(thresholds: Vec<u32>) -> Self {
        Self {
            thresholds,
            progress: Mutex::new(HashMap::new()),
        }
    }

    /// Current level of a member; 1 if they have never been awarded XP.
    pub fn level_of(&self, member: &str) -> u32 {
        self.lock().get(member).map(|p| p.level).unwrap_or(1)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, MemberProgress>> {
        match self.progress.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl LevelingOracle for ThresholdLeveling {
    fn award_xp(&self, member: &str, amount: u32) -> LevelUp {
        let mut progress = self.lock();
        let entry = progress
            .entry(member.to_string())
            .or_insert(MemberProgress { level: 1, xp: 0 });

        entry.xp = entry.xp.saturating_add(amount);
        let reached = 1 + self.thresholds.iter().filter(|&&t| entry.xp >= t).count() as u32;
        let leveled = reached > entry.level;
        entry.level = entry.level.max(reached);

        LevelUp {
            leveled,
            new_level: entry.level,
        }
    }
}
