//! Combatants and the templates they are built from.
//!
//! A [`Combatant`] is constructed once per battle — from a persistent roster
//! character for the party side, or from an [`EnemyTemplate`] for the enemy
//! side — and mutated in place for the battle's duration. Effective stats are
//! never stored here; see [`crate::stats::effective_stat`].

use crate::ability::AbilityId;

use super::common::{CombatantId, Side};
use super::status::StatusEffects;

/// Base attack/defense/speed triple.
///
/// Used both for a combatant's innate stats and for the equipment-derived
/// bonus snapshot taken at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStats {
    pub atk: u32,
    pub def: u32,
    pub spd: u32,
}

impl BaseStats {
    pub const fn new(atk: u32, def: u32, spd: u32) -> Self {
        Self { atk, def, spd }
    }
}

/// AI configuration carried by enemy combatants.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyAi {
    /// Selection weights aligned index-for-index with the combatant's
    /// ability list. Uniform when empty.
    pub weights: Vec<u32>,
    /// Substitute offensive ability when a conditional choice has no legal
    /// target. Must cost no MP.
    pub default_ability: AbilityId,
    pub is_boss: bool,
    /// Abilities unlocked when a boss first drops below half health.
    pub phase2_abilities: Vec<AbilityId>,
    /// Set once; a later HP recovery never reverts the phase.
    pub phase2_active: bool,
}

/// A unit on either side of the battle.
#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub side: Side,

    /// Innate stats (level-scaled for roster characters, flat for enemies).
    pub base: BaseStats,
    /// Equipment contribution, snapshotted from the externally-owned
    /// character model at battle construction.
    pub equip_bonus: BaseStats,

    pub max_hp: u32,
    pub hp: u32,
    pub max_mp: u32,
    pub mp: u32,

    /// Set by the Defend ability; doubles effective defense until cleared at
    /// the start of this unit's next turn.
    pub is_defending: bool,
    /// Set by the Charge ability; the next physical or debuff action doubles
    /// its power, consuming the flag.
    pub is_charged: bool,
    /// Roster equipment snapshot: true blocks two-handed abilities.
    pub off_hand_occupied: bool,

    pub statuses: StatusEffects,
    pub abilities: Vec<AbilityId>,

    /// Present on enemy combatants only.
    pub ai: Option<EnemyAi>,
    /// Enemy template key, used for per-enemy loot rolls on victory.
    pub template_id: Option<String>,
    pub xp_reward: u32,
    pub gold_reward: u32,
}

impl Combatant {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Builds a party-side combatant from a roster character.
    pub fn from_roster(id: CombatantId, character: &RosterCharacter) -> Self {
        Self {
            id,
            name: character.name.clone(),
            side: Side::Party,
            base: character.base,
            equip_bonus: character.equip_bonus,
            max_hp: character.max_hp,
            hp: character.max_hp,
            max_mp: character.max_mp,
            mp: character.max_mp,
            is_defending: false,
            is_charged: false,
            off_hand_occupied: character.off_hand_occupied,
            statuses: StatusEffects::empty(),
            abilities: character.abilities.clone(),
            ai: None,
            template_id: None,
            xp_reward: 0,
            gold_reward: 0,
        }
    }

    /// Builds an enemy-side combatant from a template.
    ///
    /// The template's `default_ability` falls back to its first listed
    /// ability when unspecified.
    pub fn from_template(id: CombatantId, template: &EnemyTemplate) -> Self {
        let default_ability = template
            .default_ability
            .clone()
            .or_else(|| template.abilities.first().cloned())
            .unwrap_or_else(|| AbilityId::from("attack"));

        Self {
            id,
            name: template.name.clone(),
            side: Side::Enemy,
            base: template.base,
            equip_bonus: BaseStats::default(),
            max_hp: template.max_hp,
            hp: template.max_hp,
            max_mp: template.max_mp,
            mp: template.max_mp,
            is_defending: false,
            is_charged: false,
            off_hand_occupied: false,
            statuses: StatusEffects::empty(),
            abilities: template.abilities.clone(),
            ai: Some(EnemyAi {
                weights: template.ai_weights.clone().unwrap_or_default(),
                default_ability,
                is_boss: template.is_boss,
                phase2_abilities: template.phase2_abilities.clone(),
                phase2_active: false,
            }),
            template_id: Some(template.id.clone()),
            xp_reward: template.xp_reward,
            gold_reward: template.gold_reward,
        }
    }
}

/// Battle-facing snapshot of a persistent roster character.
///
/// The character model (leveling, equipment slots, inventory) lives outside
/// this crate; callers flatten it into this struct when a battle starts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RosterCharacter {
    pub name: String,
    /// Level-scaled base stats.
    pub base: BaseStats,
    /// Equipment-derived bonus, already summed across slots.
    #[cfg_attr(feature = "serde", serde(default))]
    pub equip_bonus: BaseStats,
    pub max_hp: u32,
    pub max_mp: u32,
    pub abilities: Vec<AbilityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub off_hand_occupied: bool,
}

/// Immutable enemy archetype, normally loaded from a content catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyTemplate {
    /// Catalog key; also the loot-table key.
    pub id: String,
    pub name: String,
    pub base: BaseStats,
    pub max_hp: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_mp: u32,
    pub abilities: Vec<AbilityId>,
    /// Aligned with `abilities`; uniform selection when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ai_weights: Option<Vec<u32>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_ability: Option<AbilityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_boss: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub phase2_abilities: Vec<AbilityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub xp_reward: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub gold_reward: u32,
}
