//! Effective stat computation.
//!
//! Effective stats are NOT stored — always recomputed from base stats,
//! equipment bonus, and active status modifiers when needed, so a stale
//! derived value can never leak into a damage formula.
//!
//! # Formula
//!
//! ```text
//! effective = base + equip_bonus
//!           + Σ percent modifiers × base     (buff +, debuff −)
//!           + Σ flat shield bonuses          (Def only)
//! effective = max(effective, 1)
//! if defending and stat == Def: effective *= 2
//! ```
//!
//! Percent modifiers apply against the *base* stat, never the
//! equipment-inflated value, so equipment does not amplify buffs.

use crate::state::combatant::Combatant;
use crate::state::common::Stat;
use crate::state::status::{StatusAmount, StatusKind};

/// Computes a combatant's usable stat value.
pub fn effective_stat(combatant: &Combatant, stat: Stat) -> u32 {
    let base = match stat {
        Stat::Atk => combatant.base.atk,
        Stat::Def => combatant.base.def,
        Stat::Spd => combatant.base.spd,
    };
    let equip = match stat {
        Stat::Atk => combatant.equip_bonus.atk,
        Stat::Def => combatant.equip_bonus.def,
        Stat::Spd => combatant.equip_bonus.spd,
    };

    let mut value = base as i64 + equip as i64;

    for effect in combatant.statuses.iter() {
        if effect.stat != Some(stat) {
            continue;
        }
        match (effect.kind, effect.amount) {
            (StatusKind::Buff, StatusAmount::Percent(p)) => {
                value += (p * base as f64).round() as i64;
            }
            (StatusKind::Debuff, StatusAmount::Percent(p)) => {
                value -= (p * base as f64).round() as i64;
            }
            (StatusKind::Buff, StatusAmount::Flat(n)) => value += n as i64,
            (StatusKind::Debuff, StatusAmount::Flat(n)) => value -= n as i64,
            (StatusKind::Shield, StatusAmount::Flat(n)) if stat == Stat::Def => {
                value += n as i64;
            }
            _ => {}
        }
    }

    let mut value = value.max(1) as u32;

    if stat == Stat::Def && combatant.is_defending {
        value *= 2;
    }

    value
}

/// Effective speed, the turn-ordering key.
#[inline]
pub fn effective_speed(combatant: &Combatant) -> u32 {
    effective_stat(combatant, Stat::Spd)
}
