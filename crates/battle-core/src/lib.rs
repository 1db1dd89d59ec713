//! Deterministic combat resolution core for a tactical party-based RPG.
//!
//! Given a party and an enemy group, [`BattleEngine`] runs a turn-ordered
//! battle to a win/lose/flee outcome, applying abilities, status effects,
//! formation-based damage mitigation, and boss phase transitions.
//!
//! # Architecture
//!
//! The engine is a standalone value with no rendering, timers, or audio.
//! External collaborators plug in through read-only oracle traits bundled in
//! [`BattleEnv`]: ability definitions, loot tables, a leveling function, and
//! a deterministic RNG. Presentation layers consume the discrete
//! [`BattleEvent`] stream drained from the engine after each call.
//!
//! # Determinism
//!
//! A battle is fully determined by its construction inputs, its seed, and the
//! sequence of player actions. The only suspension point is
//! [`BattleStatus::AwaitingPlayer`]: the engine returns control to the caller
//! and resumes when an action is submitted. Everything else resolves
//! synchronously on a single thread.

pub mod ability;
pub mod ai;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod formation;
pub mod resolve;
pub mod state;
pub mod stats;
pub mod status_engine;

pub use ability::{
    AbilityDefinition, AbilityId, AbilityKind, ItemEffect, StatusTemplate, TargetScope,
};
pub use ai::ChosenAction;
pub use config::BattleConfig;
pub use engine::{BattleEngine, BattleStatus, TargetRef};
pub use engine::outcome::{BattleOutcome, LevelUpReport, Rewards, flee_chance};
pub use env::{AbilityOracle, BattleEnv, LevelUp, LevelingOracle, LootOracle};
pub use env::rng::{PcgRng, RngOracle, compute_seed};
pub use error::BattleError;
pub use event::{BattleEvent, TargetOutcome, TargetOutcomeKind};
pub use resolve::{ResolutionResult, ResolveError};
pub use state::combatant::{BaseStats, Combatant, EnemyAi, EnemyTemplate, RosterCharacter};
pub use state::common::{CombatantId, Side, Stat};
pub use state::status::{StatusAmount, StatusApplication, StatusEffect, StatusEffects, StatusKind};
