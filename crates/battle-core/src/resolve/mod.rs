//! Ability resolution pipeline.
//!
//! [`resolve`] takes an ability definition, the acting combatant, and an
//! optional explicit target, and mutates hp/mp/status in place, returning a
//! per-target [`ResolutionResult`]. Resolution follows a fixed order:
//!
//! 1. Two-handed gate and target legality (pure checks, no state change).
//! 2. MP gate — then the cost is spent **unconditionally**, even if every
//!    subsequent roll misses.
//! 3. Kind dispatch: defend/charge flags, status application, healing, or
//!    the per-target accuracy-and-damage loop.
//!
//! AoE abilities resolve target-by-target in slot order: the formation
//! cover and hit points observed by target *k* reflect every mutation from
//! targets `0..k-1`. Attached status effects are applied to the hit set only
//! after the whole loop completes, and a pending charge is consumed once per
//! *action*, never once per target.

use crate::ability::{AbilityDefinition, AbilityId, AbilityKind};
use crate::combat::{accuracy_roll, raw_damage, variance_roll};
use crate::env::rng::{RngOracle, compute_seed};
use crate::event::{TargetOutcome, TargetOutcomeKind};
use crate::formation::apply_formation_reduction;
use crate::state::combatant::Combatant;
use crate::state::common::{CombatantId, Side, Stat, TargetRef};
use crate::state::status::StatusKind;
use crate::stats::effective_stat;

/// Resolution-time failures.
///
/// All of these reject the action with **no state change**; the player is
/// re-prompted and the AI falls back to its default choice.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("insufficient MP: need {needed}, have {available}")]
    InsufficientMp { needed: u32, available: u32 },

    #[error("ability `{ability}` needs both hands free")]
    TwoHandedBlocked { ability: AbilityId },

    #[error("ability `{ability}` requires an explicit target")]
    MissingTarget { ability: AbilityId },

    #[error("target is not legal for ability `{ability}`")]
    InvalidTarget { ability: AbilityId },
}

/// Outcome of one resolved action.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolutionResult {
    pub actor: CombatantId,
    pub ability: AbilityId,
    pub outcomes: Vec<TargetOutcome>,
    /// Aggregate damage across all targets, for AoE reporting.
    pub total_damage: u32,
}

/// Mutable view of both sides plus the roll-seed inputs for one action.
pub(crate) struct ResolveContext<'a> {
    pub party: &'a mut Vec<Combatant>,
    pub enemies: &'a mut Vec<Combatant>,
    /// Battle base seed.
    pub seed: u64,
    /// Action sequence number.
    pub nonce: u64,
}

impl ResolveContext<'_> {
    fn group(&self, side: Side) -> &[Combatant] {
        match side {
            Side::Party => self.party,
            Side::Enemy => self.enemies,
        }
    }

    fn combatant(&self, at: TargetRef) -> &Combatant {
        &self.group(at.side)[at.index]
    }

    fn combatant_mut(&mut self, at: TargetRef) -> &mut Combatant {
        match at.side {
            Side::Party => &mut self.party[at.index],
            Side::Enemy => &mut self.enemies[at.index],
        }
    }

    fn in_bounds(&self, at: TargetRef) -> bool {
        at.index < self.group(at.side).len()
    }
}

/// Resolves one action. See the module docs for the resolution order.
pub(crate) fn resolve(
    ability: &AbilityDefinition,
    user: TargetRef,
    explicit: Option<TargetRef>,
    ctx: &mut ResolveContext<'_>,
    rng: &dyn RngOracle,
) -> Result<ResolutionResult, ResolveError> {
    let actor_id = ctx.combatant(user).id;

    if ability.two_handed && ctx.combatant(user).off_hand_occupied {
        return Err(ResolveError::TwoHandedBlocked {
            ability: ability.id.clone(),
        });
    }

    let targets = gather_targets(ability, user, explicit, ctx)?;

    // MP gate, then the cost sticks regardless of what the dice do next.
    {
        let u = ctx.combatant_mut(user);
        if u.mp < ability.mp_cost {
            return Err(ResolveError::InsufficientMp {
                needed: ability.mp_cost,
                available: u.mp,
            });
        }
        u.mp -= ability.mp_cost;
    }

    let mut outcomes = Vec::new();
    let mut total_damage = 0u32;

    match ability.kind {
        AbilityKind::Defend => {
            let u = ctx.combatant_mut(user);
            u.is_defending = true;
            outcomes.push(TargetOutcome {
                target: actor_id,
                kind: TargetOutcomeKind::Defended,
            });
        }

        AbilityKind::Charge => {
            let u = ctx.combatant_mut(user);
            u.is_charged = true;
            if let Some(template) = &ability.effect {
                u.statuses.apply_or_refresh(template);
            }
            outcomes.push(TargetOutcome {
                target: actor_id,
                kind: TargetOutcomeKind::Charged,
            });
        }

        AbilityKind::Heal => {
            resolve_heal(ability, &targets, ctx, &mut outcomes)?;
        }

        AbilityKind::Debuff if ability.deals_damage() => {
            total_damage = resolve_damage(ability, user, &targets, ctx, rng, &mut outcomes);
        }

        AbilityKind::Buff | AbilityKind::Debuff => {
            // Pure status application: no accuracy roll.
            for &t in &targets {
                if !ctx.combatant(t).is_alive() {
                    continue;
                }
                if let Some(template) = &ability.effect {
                    let c = ctx.combatant_mut(t);
                    if c.statuses.apply_or_refresh(template).is_active() {
                        outcomes.push(TargetOutcome {
                            target: c.id,
                            kind: TargetOutcomeKind::StatusApplied {
                                label: template.label.clone(),
                            },
                        });
                    }
                }
            }
            // A pending charge is spent by any debuff action, damaging or
            // not. Buffs never consume it.
            if ability.consumes_charge() {
                let u = ctx.combatant_mut(user);
                if u.is_charged {
                    u.is_charged = false;
                    u.statuses.remove_kind(StatusKind::Charged);
                }
            }
        }

        AbilityKind::Physical | AbilityKind::Magic => {
            total_damage = resolve_damage(ability, user, &targets, ctx, rng, &mut outcomes);
        }
    }

    Ok(ResolutionResult {
        actor: actor_id,
        ability: ability.id.clone(),
        outcomes,
        total_damage,
    })
}

/// Expands the ability's target scope into concrete slots.
///
/// Legality is checked here, before any state changes: dead combatants are
/// excluded from targeting except by revive-flagged heals, and explicit
/// targets must sit on the scope's side of the field.
fn gather_targets(
    ability: &AbilityDefinition,
    user: TargetRef,
    explicit: Option<TargetRef>,
    ctx: &ResolveContext<'_>,
) -> Result<Vec<TargetRef>, ResolveError> {
    use crate::ability::TargetScope::*;

    let invalid = || ResolveError::InvalidTarget {
        ability: ability.id.clone(),
    };
    let allows_dead = ability.kind == AbilityKind::Heal && ability.revive;

    let require = |at: TargetRef, side: Side| -> Result<TargetRef, ResolveError> {
        if at.side != side || !ctx.in_bounds(at) {
            return Err(invalid());
        }
        if !ctx.combatant(at).is_alive() && !allows_dead {
            return Err(invalid());
        }
        Ok(at)
    };

    let explicit_or_err = || {
        explicit.ok_or_else(|| ResolveError::MissingTarget {
            ability: ability.id.clone(),
        })
    };

    let living = |side: Side| -> Vec<TargetRef> {
        ctx.group(side)
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(i, _)| TargetRef::new(side, i))
            .collect()
    };

    Ok(match ability.target {
        SelfOnly => vec![user],
        SingleEnemy => vec![require(explicit_or_err()?, user.side.opponent())?],
        SingleAlly | AllyOfEnemy => vec![require(explicit_or_err()?, user.side)?],
        AllEnemies => living(user.side.opponent()),
        AllAllies => living(user.side),
        PartyAll => (0..ctx.group(user.side).len())
            .map(|i| TargetRef::new(user.side, i))
            .collect(),
    })
}

fn resolve_heal(
    ability: &AbilityDefinition,
    targets: &[TargetRef],
    ctx: &mut ResolveContext<'_>,
    outcomes: &mut Vec<TargetOutcome>,
) -> Result<(), ResolveError> {
    let amount = ability.heal_amount.unwrap_or(0);

    for &t in targets {
        let c = ctx.combatant_mut(t);
        if !c.is_alive() {
            // gather_targets only lets dead targets through for revives
            // (explicitly, or swept up by a PartyAll heal).
            if ability.revive {
                c.hp = amount.min(c.max_hp);
                outcomes.push(TargetOutcome {
                    target: c.id,
                    kind: TargetOutcomeKind::Revived { amount: c.hp },
                });
            }
            continue;
        }

        let healed = amount.min(c.max_hp - c.hp);
        c.hp += healed;
        outcomes.push(TargetOutcome {
            target: c.id,
            kind: TargetOutcomeKind::Healed { amount: healed },
        });

        if let Some(template) = &ability.effect {
            let c = ctx.combatant_mut(t);
            if c.statuses.apply_or_refresh(template).is_active() {
                outcomes.push(TargetOutcome {
                    target: c.id,
                    kind: TargetOutcomeKind::StatusApplied {
                        label: template.label.clone(),
                    },
                });
            }
        }
    }
    Ok(())
}

/// The per-target accuracy-and-damage loop shared by physical, magic, and
/// damaging debuff abilities.
fn resolve_damage(
    ability: &AbilityDefinition,
    user: TargetRef,
    targets: &[TargetRef],
    ctx: &mut ResolveContext<'_>,
    rng: &dyn RngOracle,
    outcomes: &mut Vec<TargetOutcome>,
) -> u32 {
    let actor_id = ctx.combatant(user).id;
    let charged = ctx.combatant(user).is_charged && ability.consumes_charge();
    let power = if charged {
        ability.power * 2
    } else {
        ability.power
    };
    let atk = effective_stat(ctx.combatant(user), Stat::Atk);

    let mut total_damage = 0u32;
    let mut hit_targets: Vec<TargetRef> = Vec::new();

    for (k, &t) in targets.iter().enumerate() {
        // An earlier hit in this loop may have emptied the slot.
        if !ctx.combatant(t).is_alive() {
            continue;
        }

        let acc_seed = compute_seed(ctx.seed, ctx.nonce, actor_id.0, (2 * k) as u32);
        if !accuracy_roll(rng, acc_seed, ability.accuracy) {
            outcomes.push(TargetOutcome {
                target: ctx.combatant(t).id,
                kind: TargetOutcomeKind::Missed,
            });
            continue;
        }

        let var_seed = compute_seed(ctx.seed, ctx.nonce, actor_id.0, (2 * k + 1) as u32);
        let variance = variance_roll(rng, var_seed);
        let def = effective_stat(ctx.combatant(t), Stat::Def);
        let raw = raw_damage(power, atk, def, variance);
        let damage = apply_formation_reduction(raw, ctx.group(t.side), t.index);

        let target_id = {
            let c = ctx.combatant_mut(t);
            c.hp = c.hp.saturating_sub(damage);
            c.id
        };
        total_damage += damage;
        outcomes.push(TargetOutcome {
            target: target_id,
            kind: TargetOutcomeKind::Hit { damage },
        });
        hit_targets.push(t);

        // Life drain: a damaging ability's heal_amount feeds the user.
        if let Some(drain) = ability.heal_amount {
            let u = ctx.combatant_mut(user);
            u.hp = (u.hp + drain).min(u.max_hp);
        }
    }

    // Attached statuses land on the hit set only after every member has
    // been resolved.
    if let Some(template) = &ability.effect {
        for &t in &hit_targets {
            if !ctx.combatant(t).is_alive() {
                continue;
            }
            let c = ctx.combatant_mut(t);
            if c.statuses.apply_or_refresh(template).is_active() {
                outcomes.push(TargetOutcome {
                    target: c.id,
                    kind: TargetOutcomeKind::StatusApplied {
                        label: template.label.clone(),
                    },
                });
            }
        }
    }

    // Charge is consumed once per action, not once per target.
    if charged {
        let u = ctx.combatant_mut(user);
        u.is_charged = false;
        u.statuses.remove_kind(StatusKind::Charged);
    }

    total_damage
}
