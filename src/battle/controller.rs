//! Battle controller - the phase state machine
//!
//! Each `update(dt)`:
//! pending delay -> gauge tick -> phase update -> drain intents
//!
//! Phase entry procedures return a `Step`. `Step::Go` chains the next entry
//! immediately, `Step::After` parks the controller for a fixed duration, and
//! `Step::Stay` waits for the next tick or intent.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::ai::{OpponentPolicy, WeightedPolicy};
use crate::battle::context::BattleContext;
use crate::battle::events::{BattleEventLog, BattleEventType};
use crate::battle::gauge::GaugeScheduler;
use crate::battle::intent::{Intent, IntentQueue};
use crate::battle::outcome::{check_battle_end, BattleResult};
use crate::battle::phase::{BattlePhase, DelayedTransition, Step};
use crate::battle::plan::{PredictedResponse, TurnPlan};
use crate::battle::sequencer::{PlaybackEnv, Sequencer};
use crate::combat::buffs::{BuffKind, Expiry};
use crate::combat::combatant::Combatant;
use crate::combat::judge::OutcomeJudge;
use crate::combat::reveal::{choose_visible_slots, reveal_against};
use crate::combat::roster::Roster;
use crate::combat::skills::{SkillProfile, SkillRepository};
use crate::core::config::BattleConfig;
use crate::core::error::{BattleError, Result};
use crate::core::types::{ActorId, AttackKind, ResponseKind, Side};
use crate::stage::{ScriptTrigger, Stage};

/// Items usable outside the intent flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consumable {
    /// Conceal the user's reservations until end of turn
    SmokeBomb,
    /// Heal residual damage
    Tonic { amount: u32 },
}

impl Consumable {
    pub fn animation(self) -> &'static str {
        match self {
            Consumable::SmokeBomb => "smoke_bomb",
            Consumable::Tonic { .. } => "tonic",
        }
    }
}

pub struct BattleController<S: Stage> {
    config: BattleConfig,
    roster: Roster,
    gauge: Option<GaugeScheduler>,
    plan: TurnPlan,
    context: BattleContext,
    intents: IntentQueue,
    log: BattleEventLog,
    rng: ChaCha8Rng,
    skills: Box<dyn SkillRepository>,
    policy: Box<dyn OpponentPolicy>,
    stage: S,
    phase: BattlePhase,
    started: bool,
    delayed: Option<DelayedTransition>,
    sequencer: Option<Sequencer>,
    result: Option<BattleResult>,
    /// Seconds left on the consumable animation currently playing
    consumable_in_progress: Option<f32>,
    ticks: u64,
}

impl<S: Stage> BattleController<S> {
    pub fn new(
        config: BattleConfig,
        roster: Roster,
        skills: Box<dyn SkillRepository>,
        stage: S,
    ) -> Result<Self> {
        config.validate()?;

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let policy = Box::new(WeightedPolicy::new(config.policy.clone()));
        let plan = TurnPlan::new(config.reservation_slots());

        Ok(Self {
            config,
            roster,
            gauge: None,
            plan,
            context: BattleContext::new(),
            intents: IntentQueue::new(),
            log: BattleEventLog::new(),
            rng,
            skills,
            policy,
            stage,
            phase: BattlePhase::StartOfBattle,
            started: false,
            delayed: None,
            sequencer: None,
            result: None,
            consumable_in_progress: None,
            ticks: 0,
        })
    }

    /// Replace the default weighted-random opponent policy
    pub fn with_policy(mut self, policy: Box<dyn OpponentPolicy>) -> Self {
        self.policy = policy;
        self
    }

    // === QUERIES ===

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn combatant_mut(&mut self, id: ActorId) -> Option<&mut Combatant> {
        self.roster.get_mut(id)
    }

    pub fn context(&self) -> &BattleContext {
        &self.context
    }

    pub fn plan(&self) -> &TurnPlan {
        &self.plan
    }

    pub fn log(&self) -> &BattleEventLog {
        &self.log
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.result
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Controller is parked on a delayed transition
    pub fn is_parked(&self) -> bool {
        self.delayed.is_some()
    }

    /// Current phase is waiting on submitted intents
    pub fn awaiting_input(&self) -> bool {
        !self.is_parked() && self.phase.awaits_intent()
    }

    /// Gauge fill in [0, 1] for UI binding
    pub fn fill_ratio(&self, id: ActorId) -> f32 {
        self.gauge
            .as_ref()
            .map(|g| g.fill_ratio(id, &self.roster))
            .unwrap_or(0.0)
    }

    pub fn set_playback_speed(&mut self, speed: f32) {
        if speed > 0.0 {
            self.config.playback_speed = speed;
        }
    }

    // === INPUT ===

    /// Queue an intent; it is observed no later than the next tick
    pub fn submit(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Use an item outside the intent flow. Returns false while another
    /// consumable is still playing, or when the user cannot act.
    pub fn use_consumable(&mut self, actor: ActorId, item: Consumable) -> bool {
        if self.consumable_in_progress.is_some() || self.is_finished() {
            tracing::debug!("consumable from {} rejected: busy", actor);
            return false;
        }
        let Some(combatant) = self.roster.get_mut(actor) else {
            return false;
        };
        if combatant.is_dead() {
            return false;
        }

        match item {
            Consumable::SmokeBomb => {
                combatant
                    .buffs
                    .apply(BuffKind::Concealment, 1.0, Expiry::EndOfTurn);
            }
            Consumable::Tonic { amount } => {
                let healed = combatant.health.recover_residual(amount);
                tracing::debug!("{} recovers {} residual", actor, healed);
            }
        }

        let duration = self.stage.play_animation(actor, item.animation());
        self.consumable_in_progress = Some(duration.max(0.0));
        self.log
            .push(self.context.turn, BattleEventType::ConsumableUsed { actor });
        tracing::info!("{} uses {:?}", actor, item);
        true
    }

    // === TICK ===

    /// Advance the battle by `delta_time` seconds. Faults inside a tick are
    /// logged and the loop carries on next tick.
    pub fn update(&mut self, delta_time: f32) {
        if let Err(err) = self.tick(delta_time) {
            tracing::error!("battle tick failed in {:?}: {}", self.phase, err);
        }
    }

    fn tick(&mut self, delta_time: f32) -> Result<()> {
        self.ticks += 1;

        if let Some(remaining) = self.consumable_in_progress.as_mut() {
            *remaining -= delta_time;
            if *remaining <= 0.0 {
                self.consumable_in_progress = None;
            }
        }

        if let Some(delay) = self.delayed.as_mut() {
            match delay.advance(delta_time) {
                Some(next) => {
                    self.delayed = None;
                    self.apply(Step::Go(next))?;
                }
                None => {
                    let dropped = self.intents.clear();
                    if dropped > 0 {
                        tracing::debug!("dropped {} intents while parked", dropped);
                    }
                }
            }
            return Ok(());
        }

        if self.is_finished() {
            self.intents.clear();
            return Ok(());
        }

        if !self.started {
            self.started = true;
            self.apply(Step::Go(BattlePhase::StartOfBattle))?;
            if self.delayed.is_some() {
                return Ok(());
            }
        }

        if let Some(gauge) = self.gauge.as_mut() {
            gauge.tick(delta_time, &self.roster);
        }

        let step = self.phase_update(delta_time)?;
        self.apply(step)?;

        for intent in self.intents.drain() {
            if self.delayed.is_some() || self.is_finished() {
                tracing::debug!("ignoring {:?}: controller parked", intent);
                continue;
            }
            let step = self.handle_intent(intent)?;
            self.apply(step)?;
        }

        Ok(())
    }

    /// Follow a chain of steps without recursion
    fn apply(&mut self, step: Step) -> Result<()> {
        let mut step = step;
        loop {
            match step {
                Step::Stay => return Ok(()),
                Step::After { seconds, phase } => {
                    self.delayed = Some(DelayedTransition::new(seconds, phase));
                    return Ok(());
                }
                Step::Go(next) => {
                    self.phase = next;
                    self.log
                        .push(self.context.turn, BattleEventType::PhaseEntered { phase: next });
                    tracing::debug!("turn {} -> {:?}", self.context.turn, next);
                    step = self.enter_procedure(next)?;
                }
            }
        }
    }

    // === PHASE ENTRY ===

    fn enter_procedure(&mut self, phase: BattlePhase) -> Result<Step> {
        match phase {
            BattlePhase::StartOfBattle => {
                self.gauge = Some(GaugeScheduler::new(
                    &self.roster,
                    self.config.gauge_threshold,
                    self.config.gauge_target_seconds,
                ));
                tracing::info!("battle starts with {} combatants", self.roster.len());
                let seconds = self.play_script(ScriptTrigger::Title);
                Ok(Step::After {
                    seconds,
                    phase: BattlePhase::PrologueScript,
                })
            }

            BattlePhase::PrologueScript => {
                let seconds = self.play_script(ScriptTrigger::Prologue);
                Ok(Step::After {
                    seconds,
                    phase: BattlePhase::StartOfTurn,
                })
            }

            BattlePhase::StartOfTurn => {
                self.context.turn += 1;
                self.plan.reset(self.config.reservation_slots());
                self.sequencer = None;
                for combatant in self.roster.iter_mut() {
                    combatant.reset_turn();
                }
                Ok(Step::Go(BattlePhase::ChooseActor))
            }

            BattlePhase::ChooseActor => {
                self.context.reset();
                self.choose_actor()
            }

            BattlePhase::Reservation => self.enter_reservation(),

            BattlePhase::Prediction => self.enter_prediction(),

            BattlePhase::PredictionConfirm => {
                let defense_human = self.context.defense_side().is_some_and(|s| self.is_human(s));
                if self.context.actor_is_human || defense_human {
                    Ok(Step::Stay)
                } else {
                    Ok(Step::Go(BattlePhase::Resolution))
                }
            }

            BattlePhase::Resolution => {
                self.sequencer = Some(Sequencer::new());
                Ok(Step::Stay)
            }

            BattlePhase::Results => self.enter_results(),

            BattlePhase::EndTurn => {
                let recovery = self.config.residual_recovery_per_turn;
                for combatant in self.roster.iter_mut() {
                    combatant.buffs.clear_expired();
                    if recovery > 0 && combatant.is_alive() {
                        combatant.health.recover_residual(recovery);
                    }
                }
                if let (Some(gauge), Some(actor)) = (self.gauge.as_mut(), self.context.actor) {
                    gauge.release(actor);
                }
                Ok(Step::Go(BattlePhase::StartOfTurn))
            }

            BattlePhase::EndBattle => {
                if let Some(result) = self.result {
                    self.stage.on_battle_end(result);
                }
                Ok(Step::Stay)
            }

            BattlePhase::ReservationSelectTarget
            | BattlePhase::ReservationSelectAttack
            | BattlePhase::PredictionSelectAttack
            | BattlePhase::Test => Ok(Step::Stay),
        }
    }

    fn play_script(&mut self, trigger: ScriptTrigger) -> f32 {
        let seconds = self.stage.play_event_script(trigger);
        tracing::info!("playing {} script ({:.1}s)", trigger.as_str(), seconds);
        seconds
    }

    fn is_human(&self, side: Side) -> bool {
        self.config.human_side == Some(side)
    }

    fn actor(&self) -> Result<ActorId> {
        self.context.actor.ok_or(BattleError::NoActor)
    }

    /// Pop ready ids until a living one turns up
    fn choose_actor(&mut self) -> Result<Step> {
        let Some(gauge) = self.gauge.as_mut() else {
            return Ok(Step::Stay);
        };

        while gauge.has_ready() {
            let id = gauge.pop()?;
            let Some(combatant) = self.roster.get(id).filter(|c| c.is_alive()) else {
                gauge.release(id);
                continue;
            };

            let side = combatant.side;
            self.context.actor = Some(id);
            self.context.offense_side = Some(side);
            self.context.actor_is_human = self.config.human_side == Some(side);
            self.log
                .push(self.context.turn, BattleEventType::TurnStarted { actor: id });
            tracing::info!("turn {}: {} ({}) acts", self.context.turn, combatant.name, id);
            return Ok(Step::Go(BattlePhase::Reservation));
        }

        Ok(Step::Stay)
    }

    fn enter_reservation(&mut self) -> Result<Step> {
        let actor = self.actor()?;
        let slots = self.config.reservation_slots();
        let attacker = self.roster.require(actor)?;

        self.context.pre_turn_hand = attacker.hand.snapshot();
        if attacker.hand.is_empty() {
            tracing::debug!("{} has no uses left, skipping to results", actor);
            return Ok(Step::Go(BattlePhase::Results));
        }

        // Sharpest eye on the defending side reads the reservations
        let insight = self
            .roster
            .living(attacker.side.opposite())
            .map(|c| c.stats.insight)
            .max()
            .unwrap_or(0);
        let reveal_count = reveal_against(
            &mut self.rng,
            insight,
            attacker.stats.confuse,
            slots,
            attacker.is_concealed(),
        );
        let visible = choose_visible_slots(&mut self.rng, reveal_count, slots);
        self.context.reveal_count = reveal_count;
        self.plan.set_visible_slots(visible);

        if self.context.actor_is_human {
            return Ok(Step::Go(BattlePhase::ReservationSelectTarget));
        }

        let targets = self.roster.living_ids(attacker.side.opposite());
        let attacker = self.roster.require_mut(actor)?;
        let offense = self
            .policy
            .plan_offense(attacker, &targets, slots, &mut self.rng);

        if let Some(target) = offense.target {
            self.context.target = Some(target);
            for kind in offense.kinds {
                self.reserve(actor, target, kind);
            }
        }
        self.finish_reservation();
        Ok(Step::Go(BattlePhase::Prediction))
    }

    /// Push one already-paid-for action into the plan
    fn reserve(&mut self, attacker: ActorId, target: ActorId, kind: AttackKind) -> bool {
        let Some(slot) = self.plan.push_action(attacker, target, kind) else {
            return false;
        };
        self.context.acted = true;
        let visible = self.plan.action(slot).is_some_and(|a| a.visible);
        self.log.push(
            self.context.turn,
            BattleEventType::AttackReserved {
                attacker,
                target,
                kind,
                slot,
                visible,
            },
        );
        true
    }

    fn finish_reservation(&mut self) {
        self.plan
            .promote_visibility(&mut self.rng, self.context.reveal_count);
    }

    fn enter_prediction(&mut self) -> Result<Step> {
        if self.plan.is_empty() {
            return Ok(Step::Go(BattlePhase::Resolution));
        }

        let defense_side = self.context.defense_side().ok_or(BattleError::NoActor)?;
        if self.is_human(defense_side) {
            return Ok(Step::Go(BattlePhase::PredictionSelectAttack));
        }

        let actor = self.actor()?;
        let target = self.context.target.ok_or(BattleError::NoActor)?;
        let (defender, attacker) = self
            .roster
            .pair_mut(target, actor)
            .ok_or(BattleError::UnknownActor(target))?;

        let judge = OutcomeJudge::new(self.skills.as_ref(), self.config.evade_fatigue_step);
        let answers = self.policy.plan_defense(
            &judge,
            defender,
            attacker,
            self.plan.actions(),
            self.context.pre_turn_hand,
            &mut self.rng,
        );

        for (slot, response) in answers {
            let Some(action) = self.plan.action(slot).copied() else {
                continue;
            };
            let outcome = judge.judge(action.kind, response, attacker, defender);
            let accepted = self.plan.push_response(PredictedResponse {
                responder: defender.id,
                kind: response,
                slot,
                outcome,
            });
            if accepted {
                self.log.push(
                    self.context.turn,
                    BattleEventType::ResponseChosen {
                        responder: defender.id,
                        kind: response,
                        slot,
                        advantage: outcome.advantage,
                    },
                );
            }
        }

        Ok(Step::Go(BattlePhase::PredictionConfirm))
    }

    fn enter_results(&mut self) -> Result<Step> {
        if let Some(result) = check_battle_end(&self.roster) {
            self.result = Some(result);
            self.log
                .push(self.context.turn, BattleEventType::BattleEnded { result });
            tracing::info!("battle ends on turn {}: {:?}", self.context.turn, result);

            let trigger = match result {
                BattleResult::Victory => ScriptTrigger::Victory,
                BattleResult::Defeat => ScriptTrigger::Defeat,
            };
            let seconds = self.play_script(trigger);
            return Ok(Step::After {
                seconds,
                phase: BattlePhase::EndBattle,
            });
        }

        let turn = self.context.turn;
        for combatant in self.roster.iter_mut() {
            if combatant.is_dead() {
                continue;
            }
            let acted = self.context.acted && self.context.actor == Some(combatant.id);
            let amount = if acted {
                0
            } else {
                1u8.saturating_add(SkillProfile::of(combatant, self.skills.as_ref()).recovery_bonus)
            };
            combatant.hand.refill(amount);
            self.log.push(
                turn,
                BattleEventType::HandRecovered {
                    actor: combatant.id,
                    amount,
                },
            );
        }

        Ok(Step::Go(BattlePhase::EndTurn))
    }

    // === PER-TICK UPDATE ===

    fn phase_update(&mut self, delta_time: f32) -> Result<Step> {
        match self.phase {
            BattlePhase::ChooseActor => self.choose_actor(),
            BattlePhase::Resolution => {
                let Some(sequencer) = self.sequencer.as_mut() else {
                    return Ok(Step::Stay);
                };
                if sequencer.is_done() {
                    return Ok(Step::Stay);
                }

                let mut env = PlaybackEnv {
                    plan: &self.plan,
                    roster: &mut self.roster,
                    skills: self.skills.as_ref(),
                    fatigue_step: self.config.evade_fatigue_step,
                    beat_seconds: self.config.resolution_beat_seconds,
                    rng: &mut self.rng,
                    animator: &mut self.stage,
                    events: &mut self.log,
                    turn: self.context.turn,
                };
                if sequencer.step(delta_time * self.config.playback_speed, &mut env)? {
                    self.intents.push(Intent::ResolutionComplete);
                }
                Ok(Step::Stay)
            }
            _ => Ok(Step::Stay),
        }
    }

    // === INTENTS ===

    fn handle_intent(&mut self, intent: Intent) -> Result<Step> {
        match (self.phase, intent) {
            (_, Intent::Bypass(phase)) => {
                if self.config.allow_bypass {
                    tracing::warn!("bypass from {:?} to {:?}", self.phase, phase);
                    Ok(Step::Go(phase))
                } else {
                    tracing::debug!("bypass intent ignored");
                    Ok(Step::Stay)
                }
            }

            (
                BattlePhase::ReservationSelectTarget | BattlePhase::ReservationSelectAttack,
                Intent::TapTarget(target),
            ) => {
                let actor = self.actor()?;
                if !self.roster.is_valid_target(actor, target) {
                    tracing::debug!("{} is not a valid target for {}", target, actor);
                    return Ok(Step::Stay);
                }
                self.context.target = Some(target);
                self.plan.retarget(target);
                Ok(if self.phase == BattlePhase::ReservationSelectTarget {
                    Step::Go(BattlePhase::ReservationSelectAttack)
                } else {
                    Step::Stay
                })
            }

            (BattlePhase::ReservationSelectAttack, Intent::ReserveAttack(kind)) => {
                let actor = self.actor()?;
                let Some(target) = self.context.target else {
                    return Ok(Step::Stay);
                };
                if self.plan.is_full() {
                    return Ok(Step::Stay);
                }

                let attacker = self.roster.require_mut(actor)?;
                if !attacker.hand.consume(kind) {
                    tracing::debug!("{} has no {} left", actor, kind.as_str());
                    return Ok(Step::Stay);
                }
                let exhausted = attacker.hand.is_empty();
                self.reserve(actor, target, kind);

                if self.plan.is_full() || exhausted {
                    self.finish_reservation();
                    return Ok(Step::Go(BattlePhase::Prediction));
                }
                Ok(Step::Stay)
            }

            (BattlePhase::ReservationSelectAttack, Intent::Confirm) => {
                self.finish_reservation();
                Ok(Step::Go(BattlePhase::Prediction))
            }

            (BattlePhase::PredictionSelectAttack, Intent::ChooseResponse { slot, response }) => {
                self.choose_response(slot, response)
            }

            (BattlePhase::PredictionConfirm, Intent::Confirm) => Ok(Step::Go(BattlePhase::Resolution)),

            (BattlePhase::Resolution, Intent::ResolutionComplete) => {
                if self.sequencer.as_ref().is_some_and(Sequencer::is_done) {
                    Ok(Step::Go(BattlePhase::Results))
                } else {
                    Ok(Step::Stay)
                }
            }

            (phase, intent) => {
                tracing::debug!(
                    "ignoring {:?} in {:?} (awaits intents: {})",
                    intent,
                    phase,
                    phase.awaits_intent()
                );
                Ok(Step::Stay)
            }
        }
    }

    fn choose_response(&mut self, slot: usize, response: ResponseKind) -> Result<Step> {
        let Some(action) = self.plan.action(slot).copied() else {
            return Ok(Step::Stay);
        };
        if self.plan.response_for(slot).is_some() {
            return Ok(Step::Stay);
        }

        let (defender, attacker) = self
            .roster
            .pair_mut(action.target, action.attacker)
            .ok_or(BattleError::UnknownActor(action.target))?;

        if let Some(cost) = response.cost() {
            if !defender.hand.consume(cost) {
                tracing::debug!("{} cannot {}", defender.id, response.as_str());
                return Ok(Step::Stay);
            }
        }

        let judge = OutcomeJudge::new(self.skills.as_ref(), self.config.evade_fatigue_step);
        let outcome = judge.judge(action.kind, response, attacker, defender);
        let responder = defender.id;
        self.plan.push_response(PredictedResponse {
            responder,
            kind: response,
            slot,
            outcome,
        });
        self.log.push(
            self.context.turn,
            BattleEventType::ResponseChosen {
                responder,
                kind: response,
                slot,
                advantage: outcome.advantage,
            },
        );

        if self.plan.all_responded() {
            Ok(Step::Go(BattlePhase::PredictionConfirm))
        } else {
            Ok(Step::Stay)
        }
    }
}
