//! Terminal detection, reward aggregation, and flee math.

use crate::env::BattleEnv;
use crate::env::rng::compute_seed;
use crate::state::combatant::Combatant;
use crate::stats::effective_speed;

/// Base flee success probability at equal average speed.
pub const FLEE_BASE: f64 = 0.4;

/// Probability gained per point of average-speed advantage.
pub const FLEE_SPEED_FACTOR: f64 = 0.04;

/// Flee probability clamp bounds.
pub const FLEE_MIN: f64 = 0.15;
pub const FLEE_MAX: f64 = 0.85;

/// How a battle ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BattleOutcome {
    Victory(Rewards),
    Defeat,
    Fled,
}

/// One roster member's level-up, reported by the leveling collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelUpReport {
    pub member: String,
    pub new_level: u32,
}

/// Spoils of a won battle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rewards {
    /// Shared progression: every recruited roster member receives this, not
    /// only those who fought.
    pub xp_per_member: u32,
    pub gold: u32,
    /// Item keys rolled independently per defeated enemy template.
    pub loot: Vec<String>,
    pub level_ups: Vec<LevelUpReport>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TerminalKind {
    Win,
    Lose,
}

/// Checks for a terminal state. Win is checked first, so a resolution step
/// that empties both sides still reports a win exactly once.
pub(crate) fn check_terminal(party: &[Combatant], enemies: &[Combatant]) -> Option<TerminalKind> {
    if enemies.iter().all(|c| !c.is_alive()) {
        return Some(TerminalKind::Win);
    }
    if party.iter().all(|c| !c.is_alive()) {
        return Some(TerminalKind::Lose);
    }
    None
}

/// Flee success probability from average effective speeds.
///
/// ```text
/// chance = clamp(0.4 + 0.04 × (avg party spd − avg enemy spd), 0.15, 0.85)
/// ```
///
/// Averages run over living combatants only.
pub fn flee_chance(party: &[Combatant], enemies: &[Combatant]) -> f64 {
    let chance = FLEE_BASE + FLEE_SPEED_FACTOR * (avg_speed(party) - avg_speed(enemies));
    chance.clamp(FLEE_MIN, FLEE_MAX)
}

fn avg_speed(group: &[Combatant]) -> f64 {
    let living: Vec<_> = group.iter().filter(|c| c.is_alive()).collect();
    if living.is_empty() {
        return 0.0;
    }
    let total: u32 = living.iter().map(|c| effective_speed(c)).sum();
    total as f64 / living.len() as f64
}

/// Aggregates victory rewards.
///
/// XP and gold are flat sums over the defeated group; loot rolls once per
/// enemy through the loot oracle; XP is then pushed to every roster member
/// through the leveling oracle, collecting reported level-ups.
pub(crate) fn victory_rewards(
    enemies: &[Combatant],
    roster: &[String],
    env: &BattleEnv<'_>,
    seed: u64,
    nonce: u64,
) -> Rewards {
    let xp_per_member: u32 = enemies.iter().map(|c| c.xp_reward).sum();
    let gold: u32 = enemies.iter().map(|c| c.gold_reward).sum();

    let mut loot = Vec::new();
    for (index, enemy) in enemies.iter().enumerate() {
        if let Some(template_id) = &enemy.template_id {
            let roll_seed = compute_seed(seed, nonce, enemy.id.0, index as u32);
            if let Some(item) = env.loot().roll_loot(template_id, roll_seed) {
                loot.push(item);
            }
        }
    }

    let mut level_ups = Vec::new();
    for member in roster {
        let result = env.leveling().award_xp(member, xp_per_member);
        if result.leveled {
            level_ups.push(LevelUpReport {
                member: member.clone(),
                new_level: result.new_level,
            });
        }
    }

    Rewards {
        xp_per_member,
        gold,
        loot,
        level_ups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::combatant::{BaseStats, Combatant, RosterCharacter};
    use crate::state::common::CombatantId;

    fn unit(id: u32, spd: u32, hp: u32) -> Combatant {
        let mut c = Combatant::from_roster(
            CombatantId(id),
            &RosterCharacter {
                name: format!("unit-{id}"),
                base: BaseStats::new(5, 5, spd),
                equip_bonus: BaseStats::default(),
                max_hp: 20,
                max_mp: 0,
                abilities: vec![],
                off_hand_occupied: false,
            },
        );
        c.hp = hp;
        c
    }

    #[test]
    fn equal_speeds_clamp_to_base_chance() {
        let party = vec![unit(0, 10, 20)];
        let enemies = vec![unit(1, 10, 20)];
        assert!((flee_chance(&party, &enemies) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn flee_chance_is_clamped_both_ways() {
        let fast = vec![unit(0, 100, 20)];
        let slow = vec![unit(1, 1, 20)];
        assert!((flee_chance(&fast, &slow) - FLEE_MAX).abs() < 1e-9);
        assert!((flee_chance(&slow, &fast) - FLEE_MIN).abs() < 1e-9);
    }

    #[test]
    fn win_takes_priority_over_simultaneous_loss() {
        let party = vec![unit(0, 5, 0)];
        let enemies = vec![unit(1, 5, 0)];
        assert_eq!(check_terminal(&party, &enemies), Some(TerminalKind::Win));
    }

    #[test]
    fn no_terminal_while_both_sides_stand() {
        let party = vec![unit(0, 5, 10)];
        let enemies = vec![unit(1, 5, 10)];
        assert_eq!(check_terminal(&party, &enemies), None);
    }
}
