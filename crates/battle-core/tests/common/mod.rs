//! Shared fixtures for engine integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use battle_core::{
    AbilityDefinition, AbilityId, AbilityKind, AbilityOracle, BaseStats, BattleEnv, Combatant,
    CombatantId, EnemyTemplate, LevelUp, LevelingOracle, LootOracle, RngOracle, RosterCharacter,
    StatusTemplate, TargetScope,
};

/// RNG stub returning one fixed word for every seed.
///
/// `FixedRng(0)` makes every d100 roll 1 (always hits), every fraction 0.0
/// (variance bottoms out at 0.9, flee always succeeds), and every range pick
/// its minimum. `FixedRng(u32::MAX)` rolls d100 96 and a fraction just under
/// 1.0 (flee always fails against the 0.85 cap).
pub struct FixedRng(pub u32);

impl RngOracle for FixedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }
}

pub struct Catalog {
    abilities: HashMap<AbilityId, AbilityDefinition>,
}

impl Catalog {
    pub fn new(definitions: Vec<AbilityDefinition>) -> Self {
        Self {
            abilities: definitions.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }
}

impl AbilityOracle for Catalog {
    fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.get(id)
    }
}

/// Loot stub: drops the same item key for every defeated template.
pub struct AlwaysDrop(pub &'static str);

impl LootOracle for AlwaysDrop {
    fn roll_loot(&self, _template_id: &str, _seed: u64) -> Option<String> {
        Some(self.0.to_string())
    }
}

pub struct NoLoot;

impl LootOracle for NoLoot {
    fn roll_loot(&self, _template_id: &str, _seed: u64) -> Option<String> {
        None
    }
}

/// Leveling stub recording awards; levels everyone to 2 when `levels` is set.
pub struct RecordingLeveler {
    pub levels: bool,
    pub awards: Mutex<Vec<(String, u32)>>,
}

impl RecordingLeveler {
    pub fn new(levels: bool) -> Self {
        Self {
            levels,
            awards: Mutex::new(Vec::new()),
        }
    }
}

impl LevelingOracle for RecordingLeveler {
    fn award_xp(&self, member: &str, amount: u32) -> LevelUp {
        if let Ok(mut awards) = self.awards.lock() {
            awards.push((member.to_string(), amount));
        }
        LevelUp {
            leveled: self.levels,
            new_level: if self.levels { 2 } else { 1 },
        }
    }
}

pub fn env<'a>(
    catalog: &'a Catalog,
    loot: &'a dyn LootOracle,
    leveling: &'a dyn LevelingOracle,
    rng: &'a dyn RngOracle,
) -> BattleEnv<'a> {
    BattleEnv::new(catalog, loot, leveling, rng)
}

// ============================================================================
// Ability definitions
// ============================================================================

pub fn physical(id: &str, power: u32, target: TargetScope) -> AbilityDefinition {
    AbilityDefinition {
        id: AbilityId::from(id),
        name: id.to_string(),
        kind: AbilityKind::Physical,
        target,
        power,
        accuracy: 100,
        mp_cost: 0,
        effect: None,
        heal_amount: None,
        revive: false,
        two_handed: false,
    }
}

pub fn strike() -> AbilityDefinition {
    physical("strike", 20, TargetScope::SingleEnemy)
}

pub fn defend() -> AbilityDefinition {
    AbilityDefinition {
        id: AbilityId::from("defend"),
        name: "Defend".to_string(),
        kind: AbilityKind::Defend,
        target: TargetScope::SelfOnly,
        power: 0,
        accuracy: 100,
        mp_cost: 0,
        effect: None,
        heal_amount: None,
        revive: false,
        two_handed: false,
    }
}

pub fn charge() -> AbilityDefinition {
    AbilityDefinition {
        id: AbilityId::from("charge"),
        name: "Charge".to_string(),
        kind: AbilityKind::Charge,
        target: TargetScope::SelfOnly,
        power: 0,
        accuracy: 100,
        mp_cost: 0,
        effect: None,
        heal_amount: None,
        revive: false,
        two_handed: false,
    }
}

pub fn pure_debuff(id: &str, effect: StatusTemplate) -> AbilityDefinition {
    AbilityDefinition {
        id: AbilityId::from(id),
        name: id.to_string(),
        kind: AbilityKind::Debuff,
        target: TargetScope::SingleEnemy,
        power: 0,
        accuracy: 100,
        mp_cost: 0,
        effect: Some(effect),
        heal_amount: None,
        revive: false,
        two_handed: false,
    }
}

// ============================================================================
// Combatants
// ============================================================================

pub fn hero(id: u32, name: &str, stats: BaseStats, hp: u32, mp: u32, abilities: &[&str]) -> Combatant {
    Combatant::from_roster(
        CombatantId(id),
        &RosterCharacter {
            name: name.to_string(),
            base: stats,
            equip_bonus: BaseStats::default(),
            max_hp: hp,
            max_mp: mp,
            abilities: abilities.iter().map(|&a| AbilityId::from(a)).collect(),
            off_hand_occupied: false,
        },
    )
}

pub fn enemy(id: u32, template: &str, stats: BaseStats, hp: u32, abilities: &[&str]) -> Combatant {
    Combatant::from_template(
        CombatantId(id),
        &EnemyTemplate {
            id: template.to_string(),
            name: format!("{template}-{id}"),
            base: stats,
            max_hp: hp,
            max_mp: 0,
            abilities: abilities.iter().map(|&a| AbilityId::from(a)).collect(),
            ai_weights: None,
            default_ability: None,
            is_boss: false,
            phase2_abilities: vec![],
            xp_reward: 10,
            gold_reward: 5,
        },
    )
}

pub fn boss(
    id: u32,
    template: &str,
    stats: BaseStats,
    hp: u32,
    abilities: &[&str],
    phase2: &[&str],
) -> Combatant {
    Combatant::from_template(
        CombatantId(id),
        &EnemyTemplate {
            id: template.to_string(),
            name: template.to_string(),
            base: stats,
            max_hp: hp,
            max_mp: 0,
            abilities: abilities.iter().map(|&a| AbilityId::from(a)).collect(),
            ai_weights: None,
            default_ability: None,
            is_boss: true,
            phase2_abilities: phase2.iter().map(|&a| AbilityId::from(a)).collect(),
            xp_reward: 100,
            gold_reward: 50,
        },
    )
}
