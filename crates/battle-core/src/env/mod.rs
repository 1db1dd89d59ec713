//! Traits describing read-only collaborator data.
//!
//! Oracles expose the ability catalog, loot tables, the leveling function,
//! and the RNG. The [`BattleEnv`] aggregate bundles them so the engine can
//! reach everything it needs without hard coupling to concrete
//! implementations — content crates and tests supply their own.

pub mod rng;

use crate::ability::{AbilityDefinition, AbilityId};

pub use rng::{PcgRng, RngOracle, compute_seed};

/// Oracle serving immutable ability definitions by id.
///
/// Unknown ids are a data-table integrity failure: the engine rejects battle
/// construction rather than substituting silently.
pub trait AbilityOracle: Send + Sync {
    fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition>;
}

/// Oracle rolling loot drops per defeated enemy template.
pub trait LootOracle: Send + Sync {
    /// Rolls one drop for an enemy template. `None` means no drop.
    fn roll_loot(&self, template_id: &str, seed: u64) -> Option<String>;
}

/// Result of awarding XP to one roster member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelUp {
    pub leveled: bool,
    pub new_level: u32,
}

/// External leveling collaborator.
///
/// Victory XP is shared: every recruited roster member receives the award,
/// not only those who fought. Implementations own the persistent character
/// model and report level-ups back for the battle-end summary.
pub trait LevelingOracle: Send + Sync {
    fn award_xp(&self, member: &str, amount: u32) -> LevelUp;
}

/// Aggregates the read-only oracles required by a battle.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    abilities: &'a dyn AbilityOracle,
    loot: &'a dyn LootOracle,
    leveling: &'a dyn LevelingOracle,
    rng: &'a dyn RngOracle,
}

impl<'a> BattleEnv<'a> {
    pub fn new(
        abilities: &'a dyn AbilityOracle,
        loot: &'a dyn LootOracle,
        leveling: &'a dyn LevelingOracle,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self {
            abilities,
            loot,
            leveling,
            rng,
        }
    }

    pub fn abilities(&self) -> &'a dyn AbilityOracle {
        self.abilities
    }

    pub fn loot(&self) -> &'a dyn LootOracle {
        self.loot
    }

    pub fn leveling(&self) -> &'a dyn LevelingOracle {
        self.leveling
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }
}
