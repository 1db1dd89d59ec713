//! Enemy action selection.
//!
//! Enemies pick abilities by weighted random draw over their `aiWeights`,
//! falling back to a fixed default attack when a conditional choice has no
//! legal target (a reanimation heal with nobody to raise) or when the draw
//! lands on something the enemy cannot afford. Bosses escalate: the first
//! time they drop below half health they irreversibly unlock their
//! second-phase ability list with heavier weights.
//!
//! Selection is deterministic under the battle seed; every draw goes through
//! [`compute_seed`] with a distinct context.

use crate::ability::{AbilityId, TargetScope};
use crate::env::BattleEnv;
use crate::env::rng::compute_seed;
use crate::state::combatant::Combatant;
use crate::state::common::{Side, TargetRef};

/// Selection weight given to freshly unlocked phase-2 abilities.
pub const PHASE2_NEW_WEIGHT: u32 = 40;

/// Selection weight phase-1 abilities are rebalanced to at the transition.
pub const PHASE2_BASE_WEIGHT: u32 = 25;

// Roll contexts within one enemy decision.
const CTX_ABILITY_DRAW: u32 = 0;
const CTX_TARGET_PICK: u32 = 1;

/// An enemy's chosen ability plus explicit target where the scope needs one.
#[derive(Clone, Debug, PartialEq)]
pub struct ChosenAction {
    pub ability: AbilityId,
    pub target: Option<TargetRef>,
}

/// Fires the boss phase-2 transition if its threshold was just crossed.
///
/// Returns the newly unlocked abilities when the transition fires. It fires
/// at most once per battle: `phase2_active` latches, and recovering above
/// half health later never reverts it.
pub fn check_phase_transition(enemy: &mut Combatant) -> Option<Vec<AbilityId>> {
    let hp = enemy.hp;
    let max_hp = enemy.max_hp;
    let ai = enemy.ai.as_mut()?;

    if !ai.is_boss || ai.phase2_active || ai.phase2_abilities.is_empty() {
        return None;
    }
    if hp * 2 >= max_hp {
        return None;
    }

    ai.phase2_active = true;
    let unlocked = ai.phase2_abilities.clone();

    // Rebalance so the new kit dominates the draw.
    ai.weights = vec![PHASE2_BASE_WEIGHT; enemy.abilities.len()];
    ai.weights
        .extend(std::iter::repeat_n(PHASE2_NEW_WEIGHT, unlocked.len()));
    enemy.abilities.extend(unlocked.iter().cloned());

    tracing::debug!(
        boss = %enemy.name,
        unlocked = unlocked.len(),
        "boss entered phase 2"
    );
    Some(unlocked)
}

/// Chooses the acting enemy's ability and target.
///
/// `enemy_index` addresses the actor within `enemies`. The party is assumed
/// to have at least one living member (the engine checks terminal states
/// before dispatching turns).
pub fn choose_action(
    enemy_index: usize,
    enemies: &[Combatant],
    party: &[Combatant],
    env: &BattleEnv<'_>,
    seed: u64,
    nonce: u64,
) -> ChosenAction {
    let enemy = &enemies[enemy_index];
    let Some(ai) = enemy.ai.as_ref() else {
        // Party-side combatants never reach AI selection.
        return ChosenAction {
            ability: enemy
                .abilities
                .first()
                .cloned()
                .unwrap_or_else(|| AbilityId::from("attack")),
            target: pick_party_target(party, env, seed, nonce, enemy.id.0),
        };
    };

    let draw_seed = compute_seed(seed, nonce, enemy.id.0, CTX_ABILITY_DRAW);
    let drawn = weighted_draw(&enemy.abilities, &ai.weights, env, draw_seed);

    let Some(ability_id) = drawn else {
        return fallback(enemy, party, env, seed, nonce);
    };
    let Some(definition) = env.abilities().ability(&ability_id) else {
        return fallback(enemy, party, env, seed, nonce);
    };

    if enemy.mp < definition.mp_cost {
        tracing::debug!(
            enemy = %enemy.name,
            ability = %ability_id,
            "cannot afford drawn ability, using default"
        );
        return fallback(enemy, party, env, seed, nonce);
    }

    let target = match definition.target {
        TargetScope::SingleEnemy => {
            // Enemies treat the party as their opposing side.
            pick_party_target(party, env, seed, nonce, enemy.id.0)
        }
        TargetScope::SingleAlly | TargetScope::AllyOfEnemy => {
            let Some(ally) = pick_ally_target(enemies, definition.revive) else {
                tracing::debug!(
                    enemy = %enemy.name,
                    ability = %ability_id,
                    "no damaged ally for support ability, using default"
                );
                return fallback(enemy, party, env, seed, nonce);
            };
            Some(ally)
        }
        _ => None,
    };

    ChosenAction {
        ability: ability_id,
        target,
    }
}

/// Weighted random draw aligned index-for-index with the ability list.
///
/// Uniform weights when none are supplied.
fn weighted_draw(
    abilities: &[AbilityId],
    weights: &[u32],
    env: &BattleEnv<'_>,
    seed: u64,
) -> Option<AbilityId> {
    if abilities.is_empty() {
        return None;
    }
    let uniform;
    let weights = if weights.len() == abilities.len() {
        weights
    } else {
        uniform = vec![1u32; abilities.len()];
        &uniform
    };

    let total: u32 = weights.iter().sum();
    if total == 0 {
        return abilities.first().cloned();
    }

    let mut roll = env.rng().range(seed, 0, total - 1) as i64;
    for (ability, &weight) in abilities.iter().zip(weights) {
        roll -= weight as i64;
        if roll < 0 {
            return Some(ability.clone());
        }
    }
    abilities.last().cloned()
}

/// Uniform-random living party member.
fn pick_party_target(
    party: &[Combatant],
    env: &BattleEnv<'_>,
    seed: u64,
    nonce: u64,
    actor: u32,
) -> Option<TargetRef> {
    let living: Vec<usize> = party
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_alive())
        .map(|(i, _)| i)
        .collect();
    if living.is_empty() {
        return None;
    }
    let pick_seed = compute_seed(seed, nonce, actor, CTX_TARGET_PICK);
    let pick = env.rng().range(pick_seed, 0, living.len() as u32 - 1) as usize;
    Some(TargetRef::new(Side::Party, living[pick]))
}

/// First eligible ally for a support ability: a dead one for revives, else
/// the most wounded living one.
fn pick_ally_target(enemies: &[Combatant], revive: bool) -> Option<TargetRef> {
    if revive {
        return enemies
            .iter()
            .position(|c| !c.is_alive())
            .map(|i| TargetRef::new(Side::Enemy, i));
    }
    enemies
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_alive() && c.hp < c.max_hp)
        .min_by_key(|(_, c)| c.hp)
        .map(|(i, _)| TargetRef::new(Side::Enemy, i))
}

/// Default offensive choice against a random living party member.
fn fallback(
    enemy: &Combatant,
    party: &[Combatant],
    env: &BattleEnv<'_>,
    seed: u64,
    nonce: u64,
) -> ChosenAction {
    let default_ability = enemy
        .ai
        .as_ref()
        .map(|ai| ai.default_ability.clone())
        .or_else(|| enemy.abilities.first().cloned())
        .unwrap_or_else(|| AbilityId::from("attack"));

    ChosenAction {
        ability: default_ability,
        target: pick_party_target(party, env, seed, nonce, enemy.id.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityDefinition, AbilityKind};
    use crate::env::rng::RngOracle;
    use crate::env::{AbilityOracle, LevelUp, LevelingOracle, LootOracle};
    use crate::state::combatant::{BaseStats, EnemyTemplate, RosterCharacter};
    use crate::state::common::CombatantId;

    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    struct Catalog(Vec<AbilityDefinition>);

    impl AbilityOracle for Catalog {
        fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
            self.0.iter().find(|d| &d.id == id)
        }
    }

    struct NoLoot;

    impl LootOracle for NoLoot {
        fn roll_loot(&self, _template_id: &str, _seed: u64) -> Option<String> {
            None
        }
    }

    struct NoLeveling;

    impl LevelingOracle for NoLeveling {
        fn award_xp(&self, _member: &str, _amount: u32) -> LevelUp {
            LevelUp {
                leveled: false,
                new_level: 1,
            }
        }
    }

    fn catalog() -> Catalog {
        let mend = AbilityDefinition {
            id: AbilityId::from("dark_mending"),
            name: "Dark Mending".to_string(),
            kind: AbilityKind::Heal,
            target: TargetScope::AllyOfEnemy,
            power: 0,
            accuracy: 100,
            mp_cost: 0,
            effect: None,
            heal_amount: Some(20),
            revive: false,
            two_handed: false,
        };
        let mut claw = mend.clone();
        claw.id = AbilityId::from("claw");
        claw.name = "Claw".to_string();
        claw.kind = AbilityKind::Physical;
        claw.target = TargetScope::SingleEnemy;
        claw.power = 12;
        claw.heal_amount = None;
        Catalog(vec![mend, claw])
    }

    /// Weights pin the draw on the support ability.
    fn healer(id: u32) -> Combatant {
        Combatant::from_template(
            CombatantId(id),
            &EnemyTemplate {
                id: "acolyte".to_string(),
                name: "Acolyte".to_string(),
                base: BaseStats::new(6, 5, 7),
                max_hp: 30,
                max_mp: 10,
                abilities: vec![AbilityId::from("dark_mending"), AbilityId::from("claw")],
                ai_weights: Some(vec![1, 0]),
                default_ability: Some(AbilityId::from("claw")),
                is_boss: false,
                phase2_abilities: vec![],
                xp_reward: 0,
                gold_reward: 0,
            },
        )
    }

    fn hero() -> Combatant {
        Combatant::from_roster(
            CombatantId(0),
            &RosterCharacter {
                name: "hero".to_string(),
                base: BaseStats::new(8, 6, 9),
                equip_bonus: BaseStats::default(),
                max_hp: 50,
                max_mp: 10,
                abilities: vec![],
                off_hand_occupied: false,
            },
        )
    }

    #[test]
    fn support_pick_without_a_wounded_ally_falls_back() {
        let catalog = catalog();
        let rng = FixedRng(0);
        let env = BattleEnv::new(&catalog, &NoLoot, &NoLeveling, &rng);

        // Everyone at full health: the drawn heal has no legal target.
        let enemies = vec![healer(10), healer(11)];
        let party = vec![hero()];

        let chosen = choose_action(0, &enemies, &party, &env, 0, 0);
        assert_eq!(chosen.ability, AbilityId::from("claw"));
        assert_eq!(chosen.target, Some(TargetRef::new(Side::Party, 0)));
    }

    #[test]
    fn support_pick_heals_the_most_wounded_ally() {
        let catalog = catalog();
        let rng = FixedRng(0);
        let env = BattleEnv::new(&catalog, &NoLoot, &NoLeveling, &rng);

        let mut enemies = vec![healer(10), healer(11)];
        enemies[1].hp = 5;
        let party = vec![hero()];

        let chosen = choose_action(0, &enemies, &party, &env, 0, 0);
        assert_eq!(chosen.ability, AbilityId::from("dark_mending"));
        assert_eq!(chosen.target, Some(TargetRef::new(Side::Enemy, 1)));
    }
}
