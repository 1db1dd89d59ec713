//! Per-round turn queue construction.

use std::collections::VecDeque;

use crate::state::combatant::Combatant;
use crate::state::common::{CombatantId, Side};
use crate::stats::effective_speed;

/// Builds the round's turn order from every living combatant.
///
/// Sorted by effective speed descending; ties break in favor of the party
/// side, then by id for full determinism. Rebuilt fresh every round and
/// never persisted across rounds — combatants joining mid-battle appear
/// starting with the next build.
pub(crate) fn build_queue(party: &[Combatant], enemies: &[Combatant]) -> VecDeque<CombatantId> {
    let mut entries: Vec<(u32, Side, CombatantId)> = party
        .iter()
        .chain(enemies.iter())
        .filter(|c| c.is_alive())
        .map(|c| (effective_speed(c), c.side, c.id))
        .collect();

    entries.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| side_rank(a.1).cmp(&side_rank(b.1)))
            .then_with(|| a.2.cmp(&b.2))
    });

    entries.into_iter().map(|(_, _, id)| id).collect()
}

const fn side_rank(side: Side) -> u8 {
    match side {
        Side::Party => 0,
        Side::Enemy => 1,
    }
}
