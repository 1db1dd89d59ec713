use std::fmt;

/// Unique identifier for a combatant within one battle.
///
/// Ids are assigned at battle construction and are stable for the battle's
/// duration; they have no meaning outside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which side of the battlefield a combatant fights on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Party,
    Enemy,
}

impl Side {
    /// The opposing side.
    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Party => Self::Enemy,
            Self::Enemy => Self::Party,
        }
    }
}

/// A combatant's battlefield address: side plus formation slot.
///
/// Slot order is the formation order — 0 Front, 1 Back-Left, 2 Back-Right,
/// 3 Rear — so the index doubles as the damage-mitigation position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetRef {
    pub side: Side,
    pub index: usize,
}

impl TargetRef {
    pub const fn new(side: Side, index: usize) -> Self {
        Self { side, index }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} slot {}", self.side, self.index)
    }
}

/// Core combat stats that status effects and equipment can modify.
///
/// HP and MP are resources, not stats; they are tracked directly on the
/// combatant and never pass through the effective-stat computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stat {
    Atk,
    Def,
    Spd,
}
