//! Formation-based damage mitigation.
//!
//! A side's battle line has up to four slots: Front (0), Back-Left (1),
//! Back-Right (2), and Rear (3). Positions behind a living front line take
//! reduced damage; the reduction collapses as the line falls.
//!
//! All functions here are pure and apply uniformly to single-target hits,
//! AoE hits, and DOT ticks.

use crate::state::combatant::Combatant;

/// Damage-reduction percent for the flank slots while the front holds.
const FLANK_REDUCTION: u32 = 25;

/// Computes the damage-reduction percent for a slot in a group.
///
/// # Rules
///
/// ```text
/// slot 0 (Front):       0
/// slots 1-2 (Flanks):   25 while the Front combatant lives, else 0
/// slot 3 (Rear):        by living count among slots 0-2:
///                       3 alive → 90, 2 → 50, 1 → 25, 0 → 0
/// ```
///
/// The returned percent is always one of {0, 25, 50, 90}.
pub fn formation_reduction(group: &[Combatant], index: usize) -> u32 {
    match index {
        0 => 0,
        1 | 2 => {
            if group.first().is_some_and(Combatant::is_alive) {
                FLANK_REDUCTION
            } else {
                0
            }
        }
        3 => {
            let screens = group
                .iter()
                .take(3)
                .filter(|c| c.is_alive())
                .count();
            match screens {
                3 => 90,
                2 => 50,
                1 => 25,
                _ => 0,
            }
        }
        // Groups never exceed four slots; anything past Rear is unscreened.
        _ => 0,
    }
}

/// Applies formation reduction to raw damage.
///
/// Integer percent math keeps the 90% band exact: `1.0 - 0.9` is not a
/// representable f64 and would round 100 raw down to 9 instead of 10.
/// Damage is floored but never reduced below 1: a connecting hit always
/// costs at least one HP.
pub fn apply_formation_reduction(raw_damage: u32, group: &[Combatant], index: usize) -> u32 {
    let keep = 100 - formation_reduction(group, index);
    let reduced = (raw_damage as u64 * keep as u64 / 100) as u32;
    reduced.max(1)
}
