//! Mutable battle state: combatants and the status effects attached to them.
//!
//! State lives for exactly one battle. Combatants are constructed from a
//! persistent roster or from enemy templates, mutated in place while the
//! battle runs, and discarded at battle end. Nothing here survives the
//! battle except what the caller explicitly copies back.

pub mod combatant;
pub mod common;
pub mod status;
