//! Immutable ability and item definitions.
//!
//! Abilities are externally supplied data, keyed by [`AbilityId`] and served
//! through [`crate::env::AbilityOracle`]. The engine never hardcodes ability
//! behavior beyond the kind dispatch in the resolver.

use std::fmt;

use crate::state::common::Stat;
use crate::state::status::{StatusAmount, StatusKind};

/// String key into the ability catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AbilityId(pub String);

impl AbilityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AbilityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an ability resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityKind {
    /// Attack scaled by Atk vs Def, subject to accuracy and charge.
    Physical,
    /// Attack with the same formula; never consumes charge.
    Magic,
    /// Restores HP; may revive when flagged.
    Heal,
    /// Applies a positive status, no accuracy roll.
    Buff,
    /// Applies a negative status; rolls accuracy only when it also deals
    /// damage (`power > 0`).
    Debuff,
    /// Doubles the user's effective defense for the next incoming hit.
    Defend,
    /// Primes the user: the next physical or debuff action doubles power.
    Charge,
}

/// Target scope of an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetScope {
    /// The user only.
    SelfOnly,
    /// One living combatant on the opposing side.
    SingleEnemy,
    /// One living combatant on the user's side.
    SingleAlly,
    /// Every living combatant on the opposing side.
    AllEnemies,
    /// Every living combatant on the user's side.
    AllAllies,
    /// The user's entire side including the dead (mass revive/heal).
    PartyAll,
    /// One combatant on the user's own (enemy) side, chosen conditionally by
    /// the AI — reanimation-style support abilities.
    AllyOfEnemy,
}

impl TargetScope {
    /// Whether the scope needs an explicit target selection.
    pub const fn needs_target(self) -> bool {
        matches!(
            self,
            Self::SingleEnemy | Self::SingleAlly | Self::AllyOfEnemy
        )
    }

    /// Whether the scope covers more than one combatant.
    pub const fn is_area(self) -> bool {
        matches!(self, Self::AllEnemies | Self::AllAllies | Self::PartyAll)
    }
}

/// Blueprint for a status effect an ability applies on resolution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusTemplate {
    #[cfg_attr(feature = "serde", serde(default))]
    pub stat: Option<Stat>,
    pub kind: StatusKind,
    pub amount: StatusAmount,
    pub turns: u32,
    pub label: String,
}

/// Immutable ability definition, externally supplied.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub name: String,
    pub kind: AbilityKind,
    pub target: TargetScope,
    /// Damage scaling factor; zero for pure support abilities.
    #[cfg_attr(feature = "serde", serde(default))]
    pub power: u32,
    /// Hit chance 0–100. Support abilities ignore it.
    #[cfg_attr(feature = "serde", serde(default = "default_accuracy"))]
    pub accuracy: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mp_cost: u32,
    /// Status applied to targets on a successful resolution.
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect: Option<StatusTemplate>,
    /// Heal amount; on damaging abilities this is life-drain healing for the
    /// user instead.
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal_amount: Option<u32>,
    /// Heal abilities only: allows targeting the dead, restoring
    /// `min(heal_amount, max_hp)`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub revive: bool,
    /// Requires both hands; rejected while the off-hand is occupied.
    #[cfg_attr(feature = "serde", serde(default))]
    pub two_handed: bool,
}

#[cfg(feature = "serde")]
fn default_accuracy() -> u32 {
    100
}

impl AbilityDefinition {
    /// Whether resolution runs the per-target accuracy-and-damage path.
    pub fn deals_damage(&self) -> bool {
        match self.kind {
            AbilityKind::Physical | AbilityKind::Magic => true,
            AbilityKind::Debuff => self.power > 0,
            _ => false,
        }
    }

    /// Whether a pending charge doubles this ability's power.
    pub fn consumes_charge(&self) -> bool {
        matches!(self.kind, AbilityKind::Physical | AbilityKind::Debuff)
    }
}

/// Effect of a consumable used through the battle turn pipeline.
///
/// Item definitions and inventories are owned by external collaborators; the
/// engine only needs to know what the consumed item does to its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemEffect {
    RestoreHp(u32),
    RestoreMp(u32),
    /// Revives a dead target at the given HP (capped at max).
    Revive(u32),
}
