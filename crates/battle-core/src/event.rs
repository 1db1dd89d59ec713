//! Discrete battle events consumed by the presentation layer.
//!
//! The engine performs no rendering and owns no timers; it appends events to
//! an internal queue as state changes, and the caller drains them with
//! [`crate::BattleEngine::drain_events`] after each call. "Waiting for a
//! message box" in a UI becomes "the UI has not drained past this event yet"
//! — presentation pacing never leaks into combat logic.

use crate::ability::{AbilityId, ItemEffect};
use crate::engine::outcome::BattleOutcome;
use crate::state::common::CombatantId;
use crate::state::status::StatusKind;

/// Per-target result of one resolved action.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetOutcome {
    pub target: CombatantId,
    pub kind: TargetOutcomeKind,
}

/// What happened to one target.
#[derive(Clone, Debug, PartialEq)]
pub enum TargetOutcomeKind {
    /// Damage dealt after formation mitigation.
    Hit { damage: u32 },
    /// The accuracy roll failed. Not retried.
    Missed,
    Healed { amount: u32 },
    /// A dead target was restored by a revive-flagged heal.
    Revived { amount: u32 },
    StatusApplied { label: String },
    /// The user braced behind its guard.
    Defended,
    /// The user is primed; its next physical or debuff action doubles power.
    Charged,
}

/// High-level battle occurrences, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum BattleEvent {
    RoundStarted {
        round: u32,
    },

    TurnStarted {
        combatant: CombatantId,
    },

    /// One action fully resolved, with per-target outcomes.
    ///
    /// `total_damage` aggregates the AoE damage figure for reporting.
    ActionResolved {
        actor: CombatantId,
        ability: AbilityId,
        outcomes: Vec<TargetOutcome>,
        total_damage: u32,
    },

    ItemUsed {
        actor: CombatantId,
        target: CombatantId,
        effect: ItemEffect,
    },

    StatusApplied {
        target: CombatantId,
        kind: StatusKind,
        label: String,
    },

    StatusExpired {
        target: CombatantId,
        kind: StatusKind,
        label: String,
    },

    /// A damage-over-time tick at round start.
    DotTick {
        target: CombatantId,
        label: String,
        damage: u32,
    },

    CombatantDied {
        combatant: CombatantId,
    },

    /// A boss crossed half health and unlocked its second phase.
    ///
    /// Emitted before the boss's action for that turn resolves.
    PhaseTransition {
        combatant: CombatantId,
        unlocked: Vec<AbilityId>,
    },

    /// A scripted ally joined mid-battle; they act from the next round.
    PartyMemberJoined {
        combatant: CombatantId,
    },

    FleeAttempted {
        success: bool,
    },

    BattleEnded {
        outcome: BattleOutcome,
    },
}
