//! Battle state machine and public driving API.
//!
//! [`BattleEngine`] is the authoritative owner of combat state. One battle
//! is one engine value: construct it with [`BattleEngine::new`], call
//! [`BattleEngine::advance`] to run enemy turns, and answer
//! [`BattleStatus::AwaitingPlayer`] with [`BattleEngine::submit_player_action`],
//! [`BattleEngine::submit_item_use`], or [`BattleEngine::attempt_flee`].
//!
//! # State machine
//!
//! ```text
//! RoundStart → TurnDispatch → (PlayerAwait | AIResolve) → ActionResolve
//!            → DeathCheck → (NextTurn | RoundEnd) → RoundStart | Terminal
//! ```
//!
//! The engine suspends only at PlayerAwait, by returning control to the
//! caller — no timers, no polling, no async runtime. Once terminal, every
//! further submission is rejected with [`BattleError::Finished`].

pub mod outcome;
pub(crate) mod turns;

use std::collections::{HashSet, VecDeque};

use crate::ability::{AbilityId, ItemEffect};
use crate::ai;
use crate::config::BattleConfig;
use crate::env::BattleEnv;
use crate::env::rng::compute_seed;
use crate::error::BattleError;
use crate::event::{BattleEvent, TargetOutcomeKind};
use crate::resolve::{self, ResolutionResult, ResolveContext};
use crate::state::combatant::{Combatant, RosterCharacter};
use crate::state::common::{CombatantId, Side};
use crate::status_engine;

pub use crate::state::common::TargetRef;
pub use outcome::{BattleOutcome, LevelUpReport, Rewards};

/// What the engine is waiting on after a driving call returns.
#[derive(Clone, Debug, PartialEq)]
pub enum BattleStatus {
    /// The scheduler is suspended until the caller submits an action for
    /// this party member.
    AwaitingPlayer { combatant: CombatantId },
    /// The battle reached a terminal state.
    Finished(BattleOutcome),
}

#[derive(Clone, Debug)]
enum Phase {
    Running,
    AwaitingPlayer(CombatantId),
    Finished(BattleOutcome),
}

/// Deterministic, turn-ordered battle between a party and an enemy group.
pub struct BattleEngine {
    party: Vec<Combatant>,
    enemies: Vec<Combatant>,
    /// Recruited roster member keys for shared XP, fighters and benched alike.
    roster: Vec<String>,
    config: BattleConfig,
    round: u32,
    queue: VecDeque<CombatantId>,
    phase: Phase,
    /// Action sequence number, mixed into every roll seed.
    nonce: u64,
    events: Vec<BattleEvent>,
    /// Deaths already announced; a revival re-arms the report.
    reported_dead: HashSet<CombatantId>,
    next_id: u32,
}

impl BattleEngine {
    /// Constructs a battle, failing fast on data-table integrity errors.
    ///
    /// Every ability key carried by any combatant (including boss phase-2
    /// lists and AI defaults) must exist in the ability oracle; AI weights
    /// must align with ability lists; ids must be unique; each side holds
    /// 1 to [`BattleConfig::MAX_GROUP_SIZE`] combatants.
    pub fn new(
        party: Vec<Combatant>,
        enemies: Vec<Combatant>,
        roster: Vec<String>,
        config: BattleConfig,
        env: &BattleEnv<'_>,
    ) -> Result<Self, BattleError> {
        for (side, group) in [(Side::Party, &party), (Side::Enemy, &enemies)] {
            if group.is_empty() {
                return Err(BattleError::EmptySide { side });
            }
            if group.len() > BattleConfig::MAX_GROUP_SIZE {
                return Err(BattleError::GroupTooLarge {
                    side,
                    max: BattleConfig::MAX_GROUP_SIZE,
                });
            }
        }

        let mut seen = HashSet::new();
        for combatant in party.iter().chain(enemies.iter()) {
            if !seen.insert(combatant.id) {
                return Err(BattleError::DuplicateCombatantId(combatant.id));
            }
            validate_combatant(combatant, env)?;
        }
        let next_id = party
            .iter()
            .chain(enemies.iter())
            .map(|c| c.id.0)
            .max()
            .unwrap_or(0)
            + 1;
        // Combatants entering the battle already down are not battle deaths.
        let reported_dead = party
            .iter()
            .chain(enemies.iter())
            .filter(|c| !c.is_alive())
            .map(|c| c.id)
            .collect();

        Ok(Self {
            party,
            enemies,
            roster,
            config,
            round: 0,
            queue: VecDeque::new(),
            phase: Phase::Running,
            nonce: 0,
            events: Vec::new(),
            reported_dead,
            next_id,
        })
    }

    // ========================================================================
    // Driving API
    // ========================================================================

    /// Runs the battle forward until it needs a player decision or ends.
    pub fn advance(&mut self, env: &BattleEnv<'_>) -> Result<BattleStatus, BattleError> {
        match &self.phase {
            Phase::Finished(outcome) => Ok(BattleStatus::Finished(outcome.clone())),
            Phase::AwaitingPlayer(id) => Ok(BattleStatus::AwaitingPlayer { combatant: *id }),
            Phase::Running => self.run(env),
        }
    }

    /// Answers a pending [`BattleStatus::AwaitingPlayer`] with an ability.
    ///
    /// Invalid submissions (unknown/unpossessed ability, illegal target,
    /// insufficient MP, blocked two-hander) are rejected with no state
    /// change and the same player decision stays pending.
    pub fn submit_player_action(
        &mut self,
        ability_id: &AbilityId,
        target: Option<TargetRef>,
        env: &BattleEnv<'_>,
    ) -> Result<BattleStatus, BattleError> {
        let actor = self.pending_player()?;
        let user = self
            .position_of(actor)
            .ok_or(BattleError::NotAwaitingPlayer)?;

        if !self.party[user.index].abilities.contains(ability_id) {
            return Err(BattleError::AbilityNotPossessed {
                actor,
                id: ability_id.clone(),
            });
        }
        let ability = env
            .abilities()
            .ability(ability_id)
            .ok_or_else(|| BattleError::UnknownAbility {
                combatant: self.party[user.index].name.clone(),
                id: ability_id.clone(),
            })?;

        let result = {
            let mut ctx = ResolveContext {
                party: &mut self.party,
                enemies: &mut self.enemies,
                seed: self.config.seed,
                nonce: self.nonce,
            };
            resolve::resolve(ability, user, target, &mut ctx, env.rng())?
        };
        self.finish_action(result, env)
    }

    /// Uses a consumable through the turn pipeline. Costs the turn.
    pub fn submit_item_use(
        &mut self,
        effect: ItemEffect,
        target: TargetRef,
        env: &BattleEnv<'_>,
    ) -> Result<BattleStatus, BattleError> {
        let actor = self.pending_player()?;
        // Consumables are party supplies; they never target the enemy line.
        if target.side != Side::Party || target.index >= self.party.len() {
            return Err(BattleError::InvalidItemTarget { target });
        }

        let target_id = {
            let c = &mut self.party[target.index];
            let legal = match effect {
                ItemEffect::RestoreHp(amount) => {
                    if c.is_alive() {
                        c.hp = (c.hp + amount).min(c.max_hp);
                        true
                    } else {
                        false
                    }
                }
                ItemEffect::RestoreMp(amount) => {
                    if c.is_alive() {
                        c.mp = (c.mp + amount).min(c.max_mp);
                        true
                    } else {
                        false
                    }
                }
                ItemEffect::Revive(amount) => {
                    if c.is_alive() {
                        false
                    } else {
                        c.hp = amount.min(c.max_hp);
                        true
                    }
                }
            };
            if !legal {
                return Err(BattleError::InvalidItemTarget { target });
            }
            c.id
        };

        self.nonce += 1;
        self.events.push(BattleEvent::ItemUsed {
            actor,
            target: target_id,
            effect,
        });
        self.after_action(env)
    }

    /// Attempts to flee. Success ends the battle with enemies unharmed;
    /// failure costs the turn.
    pub fn attempt_flee(&mut self, env: &BattleEnv<'_>) -> Result<BattleStatus, BattleError> {
        let actor = self.pending_player()?;
        if !self.config.flee_allowed {
            return Err(BattleError::FleeDisabled);
        }

        let chance = outcome::flee_chance(&self.party, &self.enemies);
        let seed = compute_seed(self.config.seed, self.nonce, actor.0, 0);
        self.nonce += 1;
        let success = env.rng().fraction(seed) < chance;

        self.events.push(BattleEvent::FleeAttempted { success });
        tracing::debug!(chance, success, "flee attempt");

        if success {
            self.finish(BattleOutcome::Fled);
            return Ok(BattleStatus::Finished(BattleOutcome::Fled));
        }
        self.after_action(env)
    }

    /// Appends a party member mid-battle (a scripted ally joining).
    ///
    /// They are part of the party immediately — targetable, sharing the
    /// formation line — but only act starting with the next rebuilt queue.
    pub fn add_party_member(
        &mut self,
        character: &RosterCharacter,
        env: &BattleEnv<'_>,
    ) -> Result<CombatantId, BattleError> {
        if matches!(self.phase, Phase::Finished(_)) {
            return Err(BattleError::Finished);
        }
        if self.party.len() >= BattleConfig::MAX_GROUP_SIZE {
            return Err(BattleError::GroupTooLarge {
                side: Side::Party,
                max: BattleConfig::MAX_GROUP_SIZE,
            });
        }

        let id = CombatantId(self.next_id);
        self.next_id += 1;
        let combatant = Combatant::from_roster(id, character);
        validate_combatant(&combatant, env)?;
        self.party.push(combatant);
        self.events.push(BattleEvent::PartyMemberJoined { combatant: id });
        Ok(id)
    }

    /// Drains all events emitted since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn party(&self) -> &[Combatant] {
        &self.party
    }

    pub fn enemies(&self) -> &[Combatant] {
        &self.enemies
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    // ========================================================================
    // State machine internals
    // ========================================================================

    fn pending_player(&self) -> Result<CombatantId, BattleError> {
        match &self.phase {
            Phase::AwaitingPlayer(id) => Ok(*id),
            Phase::Finished(_) => Err(BattleError::Finished),
            Phase::Running => Err(BattleError::NotAwaitingPlayer),
        }
    }

    /// Shared tail of every completed player action: events, deaths,
    /// terminal check, then back into the scheduler loop.
    fn finish_action(
        &mut self,
        result: ResolutionResult,
        env: &BattleEnv<'_>,
    ) -> Result<BattleStatus, BattleError> {
        self.nonce += 1;
        self.emit_resolution(result);
        self.after_action(env)
    }

    fn after_action(&mut self, env: &BattleEnv<'_>) -> Result<BattleStatus, BattleError> {
        self.emit_deaths();
        if let Some(status) = self.check_terminal(env) {
            return Ok(status);
        }
        self.phase = Phase::Running;
        self.run(env)
    }

    /// TurnDispatch loop: pops the queue, suspends on party turns, and
    /// resolves enemy turns synchronously.
    fn run(&mut self, env: &BattleEnv<'_>) -> Result<BattleStatus, BattleError> {
        loop {
            if let Phase::Finished(outcome) = &self.phase {
                return Ok(BattleStatus::Finished(outcome.clone()));
            }

            let Some(id) = self.queue.pop_front() else {
                if let Some(status) = self.close_round(env) {
                    return Ok(status);
                }
                continue;
            };

            // Skip entries that died after the queue was built.
            let Some(at) = self.position_of(id) else {
                continue;
            };
            if !self.group(at.side)[at.index].is_alive() {
                continue;
            }

            // Defend protection lasts exactly until the unit acts again.
            match at.side {
                Side::Party => self.party[at.index].is_defending = false,
                Side::Enemy => self.enemies[at.index].is_defending = false,
            }
            self.events.push(BattleEvent::TurnStarted { combatant: id });

            match at.side {
                Side::Party => {
                    self.phase = Phase::AwaitingPlayer(id);
                    return Ok(BattleStatus::AwaitingPlayer { combatant: id });
                }
                Side::Enemy => {
                    if let Some(status) = self.enemy_turn(at, env) {
                        return Ok(status);
                    }
                }
            }
        }
    }

    /// RoundEnd (status tick) followed by RoundStart (queue rebuild, DOTs).
    ///
    /// Returns a status when the DOT pass ends the battle.
    fn close_round(&mut self, env: &BattleEnv<'_>) -> Option<BattleStatus> {
        if self.round > 0 {
            for group in [&mut self.party, &mut self.enemies] {
                for (id, effect) in status_engine::tick_group(group) {
                    self.events.push(BattleEvent::StatusExpired {
                        target: id,
                        kind: effect.kind,
                        label: effect.label,
                    });
                }
            }
        }

        self.round += 1;
        self.events.push(BattleEvent::RoundStarted { round: self.round });
        self.queue = turns::build_queue(&self.party, &self.enemies);

        if self.round > 1 {
            for group in [&mut self.party, &mut self.enemies] {
                for tick in status_engine::resolve_dots(group) {
                    self.events.push(BattleEvent::DotTick {
                        target: tick.target,
                        label: tick.label,
                        damage: tick.damage,
                    });
                }
            }
            self.emit_deaths();
            return self.check_terminal(env);
        }
        None
    }

    /// AIResolve: phase check, weighted choice, synchronous resolution.
    fn enemy_turn(&mut self, at: TargetRef, env: &BattleEnv<'_>) -> Option<BattleStatus> {
        if let Some(unlocked) = ai::check_phase_transition(&mut self.enemies[at.index]) {
            self.events.push(BattleEvent::PhaseTransition {
                combatant: self.enemies[at.index].id,
                unlocked,
            });
        }

        let chosen = ai::choose_action(
            at.index,
            &self.enemies,
            &self.party,
            env,
            self.config.seed,
            self.nonce,
        );

        let result = self.resolve_enemy_choice(&chosen, at, env);
        self.nonce += 1;
        if let Some(result) = result {
            self.emit_resolution(result);
        }
        self.emit_deaths();
        self.check_terminal(env)
    }

    /// Resolves the AI's choice, falling back to the default attack when the
    /// primary pick fails to resolve (taxonomy: invalid actions recover
    /// locally, never fatally).
    fn resolve_enemy_choice(
        &mut self,
        chosen: &ai::ChosenAction,
        at: TargetRef,
        env: &BattleEnv<'_>,
    ) -> Option<ResolutionResult> {
        let primary = self.resolve_for(&chosen.ability, at, chosen.target, env);
        match primary {
            Ok(result) => Some(result),
            Err(error) => {
                tracing::warn!(%error, ability = %chosen.ability, "AI choice failed, using default");
                let fallback = ai::choose_action(
                    at.index,
                    &self.enemies,
                    &self.party,
                    env,
                    self.config.seed,
                    // Offset the nonce so the fallback rolls fresh dice.
                    self.nonce.wrapping_add(1 << 32),
                );
                self.resolve_for(&fallback.ability, at, fallback.target, env)
                    .ok()
            }
        }
    }

    fn resolve_for(
        &mut self,
        ability_id: &AbilityId,
        user: TargetRef,
        target: Option<TargetRef>,
        env: &BattleEnv<'_>,
    ) -> Result<ResolutionResult, BattleError> {
        let ability = env
            .abilities()
            .ability(ability_id)
            .ok_or_else(|| BattleError::UnknownAbility {
                combatant: self.group(user.side)[user.index].name.clone(),
                id: ability_id.clone(),
            })?;
        let mut ctx = ResolveContext {
            party: &mut self.party,
            enemies: &mut self.enemies,
            seed: self.config.seed,
            nonce: self.nonce,
        };
        Ok(resolve::resolve(ability, user, target, &mut ctx, env.rng())?)
    }

    /// DeathCheck: runs after every resolution, not just at round end.
    fn emit_deaths(&mut self) {
        let mut alive = Vec::new();
        let mut newly_dead = Vec::new();
        for c in self.party.iter().chain(self.enemies.iter()) {
            if c.is_alive() {
                alive.push(c.id);
            } else if !self.reported_dead.contains(&c.id) {
                newly_dead.push(c.id);
            }
        }
        for id in alive {
            self.reported_dead.remove(&id);
        }
        for combatant in newly_dead {
            self.reported_dead.insert(combatant);
            self.events.push(BattleEvent::CombatantDied { combatant });
        }
    }

    fn check_terminal(&mut self, env: &BattleEnv<'_>) -> Option<BattleStatus> {
        match outcome::check_terminal(&self.party, &self.enemies)? {
            outcome::TerminalKind::Win => {
                let rewards = outcome::victory_rewards(
                    &self.enemies,
                    &self.roster,
                    env,
                    self.config.seed,
                    self.nonce,
                );
                let outcome = BattleOutcome::Victory(rewards);
                self.finish(outcome.clone());
                Some(BattleStatus::Finished(outcome))
            }
            outcome::TerminalKind::Lose => {
                self.finish(BattleOutcome::Defeat);
                Some(BattleStatus::Finished(BattleOutcome::Defeat))
            }
        }
    }

    fn finish(&mut self, outcome: BattleOutcome) {
        self.events.push(BattleEvent::BattleEnded {
            outcome: outcome.clone(),
        });
        self.phase = Phase::Finished(outcome);
    }

    fn emit_resolution(&mut self, result: ResolutionResult) {
        for outcome in &result.outcomes {
            if let TargetOutcomeKind::StatusApplied { label } = &outcome.kind {
                if let Some(kind) = self.status_kind_of(outcome.target, label) {
                    self.events.push(BattleEvent::StatusApplied {
                        target: outcome.target,
                        kind,
                        label: label.clone(),
                    });
                }
            }
        }
        self.events.push(BattleEvent::ActionResolved {
            actor: result.actor,
            ability: result.ability,
            outcomes: result.outcomes,
            total_damage: result.total_damage,
        });
    }

    fn status_kind_of(
        &self,
        id: CombatantId,
        label: &str,
    ) -> Option<crate::state::status::StatusKind> {
        let at = self.position_of(id)?;
        self.group(at.side)[at.index]
            .statuses
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.kind)
    }

    fn group(&self, side: Side) -> &[Combatant] {
        match side {
            Side::Party => &self.party,
            Side::Enemy => &self.enemies,
        }
    }

    fn position_of(&self, id: CombatantId) -> Option<TargetRef> {
        if let Some(index) = self.party.iter().position(|c| c.id == id) {
            return Some(TargetRef::new(Side::Party, index));
        }
        self.enemies
            .iter()
            .position(|c| c.id == id)
            .map(|index| TargetRef::new(Side::Enemy, index))
    }
}

/// Fail-fast validation of one combatant's data-table references.
fn validate_combatant(combatant: &Combatant, env: &BattleEnv<'_>) -> Result<(), BattleError> {
    let mut keys: Vec<&AbilityId> = combatant.abilities.iter().collect();
    if let Some(ai) = &combatant.ai {
        keys.extend(ai.phase2_abilities.iter());
        keys.push(&ai.default_ability);
    }
    for key in keys {
        if env.abilities().ability(key).is_none() {
            return Err(BattleError::UnknownAbility {
                combatant: combatant.name.clone(),
                id: key.clone(),
            });
        }
    }

    if let Some(ai) = &combatant.ai {
        if !ai.weights.is_empty() && ai.weights.len() != combatant.abilities.len() {
            return Err(BattleError::MisalignedAiWeights {
                combatant: combatant.name.clone(),
            });
        }
        if let Some(default) = env.abilities().ability(&ai.default_ability) {
            if default.mp_cost > 0 {
                return Err(BattleError::DefaultAbilityCostsMp {
                    combatant: combatant.name.clone(),
                    id: ai.default_ability.clone(),
                });
            }
        }
    }
    Ok(())
}
