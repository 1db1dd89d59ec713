//! Round-boundary status processing.
//!
//! Two passes run per round: DOT resolution at round start (from round 2
//! onwards) and duration ticking at round end. Both operate on one side's
//! group at a time; the engine calls them for each side.

use crate::formation::apply_formation_reduction;
use crate::state::combatant::Combatant;
use crate::state::common::CombatantId;
use crate::state::status::{StatusAmount, StatusEffect, StatusKind};

/// One damage-over-time hit.
#[derive(Clone, Debug, PartialEq)]
pub struct DotTick {
    pub target: CombatantId,
    pub label: String,
    pub damage: u32,
}

/// Resolves DOT effects for every living member of a group.
///
/// Each tick routes through formation mitigation at the owner's own slot, so
/// a poisoned rear-line combatant behind a full line takes a tenth of the
/// listed amount. Ticks resolve in slot order; a front-liner dying to its
/// own DOT weakens the cover observed by later ticks, the same sequential
/// rule AoE resolution follows.
pub fn resolve_dots(group: &mut [Combatant]) -> Vec<DotTick> {
    let mut ticks = Vec::new();

    for index in 0..group.len() {
        if !group[index].is_alive() {
            continue;
        }
        // (stat, kind) uniqueness still permits several DOTs under distinct
        // stat keys; each ticks on its own.
        let dots: Vec<(u32, String)> = group[index]
            .statuses
            .dots()
            .filter_map(|e| match e.amount {
                StatusAmount::Flat(n) if n > 0 => Some((n, e.label.clone())),
                _ => None,
            })
            .collect();

        for (raw, label) in dots {
            if !group[index].is_alive() {
                break;
            }
            let damage = apply_formation_reduction(raw, group, index);
            let target = {
                let c = &mut group[index];
                c.hp = c.hp.saturating_sub(damage);
                c.id
            };
            ticks.push(DotTick {
                target,
                label,
                damage,
            });
        }
    }

    ticks
}

/// Ticks every effect in a group down by one round.
///
/// Returns the expired effects per combatant for event emission. A lapsed
/// [`StatusKind::Charged`] effect also clears the owner's charged flag.
pub fn tick_group(group: &mut [Combatant]) -> Vec<(CombatantId, StatusEffect)> {
    let mut expired = Vec::new();
    for combatant in group.iter_mut() {
        for effect in combatant.statuses.tick_round() {
            if effect.kind == StatusKind::Charged {
                combatant.is_charged = false;
            }
            expired.push((combatant.id, effect));
        }
    }
    expired
}
