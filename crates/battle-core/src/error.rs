//! Engine-level errors.
//!
//! Resolution-time failures (insufficient MP, illegal target) live in
//! [`crate::resolve::ResolveError`] and are wrapped here; everything a
//! submission can reject with funnels through [`BattleError`] so callers
//! re-prompt on a single error type.

use crate::ability::AbilityId;
use crate::resolve::ResolveError;
use crate::state::common::{CombatantId, Side, TargetRef};

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BattleError {
    /// The battle reached Win/Lose/Run; no further actions are accepted.
    #[error("battle is already finished")]
    Finished,

    /// A player submission arrived while no player decision was pending.
    #[error("no player action is pending")]
    NotAwaitingPlayer,

    /// Construction-time data integrity failure: an ability key referenced
    /// by a combatant does not exist in the catalog.
    #[error("unknown ability `{id}` referenced by {combatant}")]
    UnknownAbility { combatant: String, id: AbilityId },

    /// AI weights must align index-for-index with the ability list.
    #[error("AI weights of {combatant} do not match its ability count")]
    MisalignedAiWeights { combatant: String },

    /// The AI fallback ability must always be usable, so it cannot cost MP.
    #[error("default ability `{id}` of {combatant} has an MP cost")]
    DefaultAbilityCostsMp { combatant: String, id: AbilityId },

    #[error("duplicate combatant id {0}")]
    DuplicateCombatantId(CombatantId),

    #[error("{side} side has no combatants")]
    EmptySide { side: Side },

    #[error("{side} side exceeds the {max}-slot battle line")]
    GroupTooLarge { side: Side, max: usize },

    /// The submitted ability is not in the actor's ability list.
    #[error("{actor} does not know ability `{id}`")]
    AbilityNotPossessed { actor: CombatantId, id: AbilityId },

    /// Item used on a missing slot or a target in the wrong state (heal on
    /// the dead, revive on the living).
    #[error("item cannot be used on {target}")]
    InvalidItemTarget { target: TargetRef },

    /// Fleeing is disabled for this encounter.
    #[error("fleeing is not allowed in this encounter")]
    FleeDisabled,

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
