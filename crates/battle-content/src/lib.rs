//! Data-driven battle content and its loaders.
//!
//! This crate houses the static content a battle consumes and loads it from
//! RON/TOML data files:
//! - Ability catalog (data-driven via RON)
//! - Enemy templates (data-driven via RON)
//! - Roster characters (data-driven via RON)
//! - Loot tables (data-driven via RON)
//! - Encounter configuration and progression (data-driven via TOML)
//!
//! Loaded content implements the oracle traits of `battle-core` and never
//! appears in battle state.

#[cfg(feature = "loaders")]
pub mod catalog;

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use catalog::{AbilityCatalog, LootEntry, LootTable, StaticLootTable, ThresholdLeveling};

#[cfg(feature = "loaders")]
pub use loaders::{
    AbilityLoader, ConfigLoader, ContentBundle, ContentConfig, ContentFactory, EnemyLoader,
    LootLoader, ProgressionConfig, RosterLoader,
};
