//! Damage and accuracy math.
//!
//! Pure functions shared by the ability resolver and the DOT pass. Formation
//! mitigation lives in [`crate::formation`]; this module is the pre-formation
//! part of the pipeline.

use crate::env::rng::RngOracle;

/// Global damage scale in the raw-damage formula.
pub const DAMAGE_SCALE: f64 = 0.8;

/// Lower bound of the per-hit variance band.
pub const VARIANCE_MIN: f64 = 0.9;

/// Upper bound of the per-hit variance band.
pub const VARIANCE_MAX: f64 = 1.1;

/// Rolls the per-hit damage variance in `[0.9, 1.1]`.
pub fn variance_roll(rng: &(impl RngOracle + ?Sized), seed: u64) -> f64 {
    let span = VARIANCE_MAX - VARIANCE_MIN;
    VARIANCE_MIN + rng.fraction(seed) * span
}

/// Computes raw damage before formation mitigation.
///
/// # Formula
///
/// ```text
/// raw = floor(power × (atk / def) × 0.8 × variance)
/// raw = max(raw, 1)
/// ```
///
/// `def` is the target's effective defense, already doubled if the target is
/// defending; formation reduction is applied afterwards by the caller.
pub fn raw_damage(power: u32, atk: u32, def: u32, variance: f64) -> u32 {
    let def = def.max(1);
    let raw = (power as f64 * (atk as f64 / def as f64) * DAMAGE_SCALE * variance).floor() as u32;
    raw.max(1)
}

/// Rolls accuracy: a d100 at or under `accuracy` hits.
///
/// `accuracy` is a 0–100 percentage; 100 never misses, 0 never hits.
pub fn accuracy_roll(rng: &(impl RngOracle + ?Sized), seed: u64, accuracy: u32) -> bool {
    rng.roll_d100(seed) <= accuracy
}
