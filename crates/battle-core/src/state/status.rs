//! Status effects attached to a combatant.
//!
//! # Stacking
//!
//! At most one effect is active per `(stat, kind)` pair. Re-applying the same
//! pair refreshes `turns_left` instead of stacking magnitude, so a buff cast
//! twice lasts longer but never grows stronger.
//!
//! # Round-based duration
//!
//! Effects count rounds, not ticks: `turns_left` is decremented once at the
//! end of every round and the effect is dropped when it reaches zero.

use arrayvec::ArrayVec;

use crate::ability::StatusTemplate;
use crate::config::BattleConfig;

use super::common::Stat;

/// Types of status effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusKind {
    /// Raises a stat by a fraction of its base value.
    Buff,
    /// Lowers a stat by a fraction of its base value.
    Debuff,
    /// Damage at the start of each round after the first.
    Dot,
    /// Flat defense bonus while active.
    Shield,
    /// Backs the combatant's charged flag for a limited duration.
    Charged,
}

/// Magnitude of a status effect.
///
/// Percent amounts apply against the combatant's *base* stat, not the
/// equipment-inflated effective stat, so equipment never amplifies buffs.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusAmount {
    /// Fraction of the base stat (0.25 = +25% for buffs, -25% for debuffs).
    Percent(f64),
    /// Flat value: damage per round for DOTs, defense bonus for shields.
    Flat(u32),
}

/// A single timed effect on a combatant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    /// Modified stat. `None` for effects that touch no stat (DOT, Charged).
    pub stat: Option<Stat>,
    pub kind: StatusKind,
    pub amount: StatusAmount,
    /// Remaining rounds. Dropped when this reaches zero.
    pub turns_left: u32,
    /// Display label for the presentation layer ("Poison", "War Cry", ...).
    pub label: String,
}

/// What [`StatusEffects::apply_or_refresh`] did with a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusApplication {
    /// A new effect entered the set.
    Added,
    /// An existing `(stat, kind)` pair had its duration and amount refreshed.
    Refreshed,
    /// The set was full; nothing changed.
    Dropped,
}

impl StatusApplication {
    /// Whether the effect is active after the call.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Dropped)
    }
}

/// Bounded set of active status effects on one combatant.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { BattleConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffects {
    /// Creates an empty effect set.
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    /// Applies a template, refreshing duration if the `(stat, kind)` pair is
    /// already active.
    ///
    /// A new effect against a full set is dropped, and the caller must not
    /// report it as applied; refreshes always land.
    pub fn apply_or_refresh(&mut self, template: &StatusTemplate) -> StatusApplication {
        if let Some(existing) = self
            .effects
            .iter_mut()
            .find(|e| e.stat == template.stat && e.kind == template.kind)
        {
            existing.turns_left = template.turns;
            existing.amount = template.amount;
            return StatusApplication::Refreshed;
        }

        if self.effects.is_full() {
            return StatusApplication::Dropped;
        }
        self.effects.push(StatusEffect {
            stat: template.stat,
            kind: template.kind,
            amount: template.amount,
            turns_left: template.turns,
            label: template.label.clone(),
        });
        StatusApplication::Added
    }

    /// Decrements every effect by one round and removes the expired ones.
    ///
    /// Returns the expired effects so the engine can emit events and clear
    /// dependent flags (a lapsed [`StatusKind::Charged`] clears the
    /// combatant's charged state).
    pub fn tick_round(&mut self) -> Vec<StatusEffect> {
        let mut expired = Vec::new();
        for effect in &mut self.effects {
            effect.turns_left = effect.turns_left.saturating_sub(1);
        }
        let mut i = 0;
        while i < self.effects.len() {
            if self.effects[i].turns_left == 0 {
                expired.push(self.effects.remove(i));
            } else {
                i += 1;
            }
        }
        expired
    }

    /// Removes every effect of the given kind, returning whether any existed.
    pub fn remove_kind(&mut self, kind: StatusKind) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.kind != kind);
        self.effects.len() != before
    }

    /// Whether any effect of the given kind is active.
    pub fn has_kind(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    /// Iterates over all active effects.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    /// Iterates over active DOT effects.
    pub fn dots(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter().filter(|e| e.kind == StatusKind::Dot)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }
}
