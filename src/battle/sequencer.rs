//! Resolution sequencer
//!
//! `resolve_slot` is the deterministic part: given the rng it judges a slot,
//! rolls evade and computes both damage packets. `Sequencer` is the thin
//! playback driver that paces those results against animation durations and
//! applies them to the roster.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::events::{BattleEventLog, BattleEventType};
use crate::battle::plan::{PlannedAction, PredictedResponse, TurnPlan};
use crate::combat::damage::{compute_damage, Damage};
use crate::combat::judge::{Outcome, OutcomeJudge};
use crate::combat::roster::Roster;
use crate::combat::skills::{SkillProfile, SkillRepository};
use crate::core::error::Result;
use crate::core::types::{ActorId, Advantage, AttackKind, ResponseKind, Turn};
use crate::stage::Animator;

/// Fully computed result of one slot, ready to animate and apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotResolution {
    pub slot: usize,
    pub attacker: ActorId,
    pub defender: ActorId,
    pub attack: AttackKind,
    pub response: ResponseKind,
    pub outcome: Outcome,
    pub evaded: bool,
    pub defender_damage: Damage,
    pub attacker_damage: Damage,
    /// Who plays the leading role in the exchange animation
    pub lead: ActorId,
    pub animation: String,
}

impl SlotResolution {
    pub fn advantage(&self) -> Advantage {
        if self.outcome.can_evade() || self.response == ResponseKind::Evade {
            if self.evaded {
                Advantage::DefenderAdvantage
            } else {
                Advantage::AttackerAdvantage
            }
        } else {
            self.outcome.advantage
        }
    }
}

/// Judge and roll one slot against the current roster state
pub fn resolve_slot(
    action: &PlannedAction,
    response: &PredictedResponse,
    roster: &Roster,
    judge: &OutcomeJudge,
    skills: &dyn SkillRepository,
    rng: &mut impl Rng,
) -> Result<SlotResolution> {
    let attacker = roster.require(action.attacker)?;
    let defender = roster.require(response.responder)?;

    // Re-judged so evade fatigue from earlier slots in this pass applies
    let outcome = judge.judge(action.kind, response.kind, attacker, defender);

    let evaded = response.kind == ResponseKind::Evade
        && outcome.can_evade()
        && rng.gen_bool(outcome.evade_rate.clamp(0.0, 1.0) as f64);

    let (defender_damage, attacker_damage) = if evaded {
        (Damage::NONE, Damage::NONE)
    } else {
        let attacker_skills = SkillProfile::of(attacker, skills);
        let defender_skills = SkillProfile::of(defender, skills);
        (
            compute_damage(
                attacker,
                defender,
                &attacker_skills,
                outcome.residual_ratio,
                outcome.fatal_ratio,
            ),
            compute_damage(
                defender,
                attacker,
                &defender_skills,
                outcome.counter_residual_ratio,
                outcome.counter_fatal_ratio,
            ),
        )
    };

    let mut resolution = SlotResolution {
        slot: action.slot,
        attacker: attacker.id,
        defender: defender.id,
        attack: action.kind,
        response: response.kind,
        outcome,
        evaded,
        defender_damage,
        attacker_damage,
        lead: attacker.id,
        animation: String::new(),
    };

    let suffix = match resolution.advantage() {
        Advantage::DefenderAdvantage => {
            resolution.lead = defender.id;
            "defender"
        }
        Advantage::AttackerAdvantage => "attacker",
        Advantage::Draw => "draw",
    };
    resolution.animation = format!("{}_{}_{}", action.kind.as_str(), response.kind.as_str(), suffix);

    Ok(resolution)
}

/// Apply a computed resolution; returns the ids that died from it
pub fn apply_resolution(roster: &mut Roster, resolution: &SlotResolution) -> Vec<ActorId> {
    let mut fallen = Vec::new();

    if let Some(defender) = roster.get_mut(resolution.defender) {
        if resolution.evaded {
            defender.evade_successes += 1;
        }
        let was_alive = defender.is_alive();
        defender
            .health
            .take(resolution.defender_damage.residual, resolution.defender_damage.fatal);
        if was_alive && defender.is_dead() {
            fallen.push(defender.id);
        }
    }

    if let Some(attacker) = roster.get_mut(resolution.attacker) {
        let was_alive = attacker.is_alive();
        attacker
            .health
            .take(resolution.attacker_damage.residual, resolution.attacker_damage.fatal);
        if was_alive && attacker.is_dead() {
            fallen.push(attacker.id);
        }
    }

    fallen
}

/// Everything playback borrows from the controller for one step
pub struct PlaybackEnv<'a, A: Animator + ?Sized> {
    pub plan: &'a TurnPlan,
    pub roster: &'a mut Roster,
    pub skills: &'a dyn SkillRepository,
    pub fatigue_step: f32,
    pub beat_seconds: f32,
    pub rng: &'a mut ChaCha8Rng,
    pub animator: &'a mut A,
    pub events: &'a mut BattleEventLog,
    pub turn: Turn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Playback {
    Next,
    Animating { remaining: f32 },
    Beat { remaining: f32, abort: bool },
    Done,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    cursor: usize,
    state: Playback,
    current: Option<SlotResolution>,
    resolved: Vec<SlotResolution>,
    aborted: bool,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            state: Playback::Next,
            current: None,
            resolved: Vec::new(),
            aborted: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == Playback::Done
    }

    /// Playback stopped early because a participant died
    pub fn was_aborted(&self) -> bool {
        self.aborted
    }

    pub fn resolved(&self) -> &[SlotResolution] {
        &self.resolved
    }

    /// Next slot (index order) that has a matching response
    fn next_pair<'p>(&mut self, plan: &'p TurnPlan) -> Option<(&'p PlannedAction, &'p PredictedResponse)> {
        while let Some(action) = plan.action(self.cursor) {
            self.cursor += 1;
            if let Some(response) = plan.response_for(action.slot) {
                return Some((action, response));
            }
        }
        None
    }

    /// Advance playback by `delta_time` (already scaled by playback speed).
    /// Returns true once playback is complete.
    pub fn step<A: Animator + ?Sized>(&mut self, delta_time: f32, env: &mut PlaybackEnv<'_, A>) -> Result<bool> {
        let mut budget = delta_time.max(0.0);

        loop {
            match self.state {
                Playback::Done => return Ok(true),

                Playback::Next => {
                    let Some((action, response)) = self.next_pair(env.plan) else {
                        self.state = Playback::Done;
                        return Ok(true);
                    };

                    if !env.roster.is_alive(action.attacker) || !env.roster.is_alive(response.responder) {
                        continue;
                    }

                    let judge = OutcomeJudge::new(env.skills, env.fatigue_step);
                    let resolution =
                        resolve_slot(action, response, env.roster, &judge, env.skills, env.rng)?;

                    let other = if resolution.lead == resolution.attacker {
                        resolution.defender
                    } else {
                        resolution.attacker
                    };
                    let duration =
                        env.animator
                            .play_attack_animation(resolution.lead, other, &resolution.animation);

                    self.current = Some(resolution);
                    self.state = Playback::Animating {
                        remaining: duration.max(0.0),
                    };
                }

                Playback::Animating { remaining } => {
                    if remaining > budget {
                        self.state = Playback::Animating {
                            remaining: remaining - budget,
                        };
                        return Ok(false);
                    }
                    budget -= remaining;

                    let mut beat = env.beat_seconds;
                    let mut abort = false;
                    if let Some(resolution) = self.current.take() {
                        let fallen = apply_resolution(env.roster, &resolution);
                        env.events.push(
                            env.turn,
                            BattleEventType::SlotResolved {
                                slot: resolution.slot,
                                evaded: resolution.evaded,
                                advantage: resolution.advantage(),
                                defender_damage: resolution.defender_damage,
                                attacker_damage: resolution.attacker_damage,
                            },
                        );
                        tracing::debug!(
                            "slot {} {} vs {}: evaded={} dmg={:?} counter={:?}",
                            resolution.slot,
                            resolution.attack.as_str(),
                            resolution.response.as_str(),
                            resolution.evaded,
                            resolution.defender_damage,
                            resolution.attacker_damage
                        );

                        for id in &fallen {
                            beat += env.animator.play_animation(*id, "fall").max(0.0);
                            env.events.push(env.turn, BattleEventType::CombatantFell { actor: *id });
                            tracing::info!("{} has fallen", id);
                        }
                        abort = !fallen.is_empty();
                        self.resolved.push(resolution);
                    }

                    self.state = Playback::Beat {
                        remaining: beat,
                        abort,
                    };
                }

                Playback::Beat { remaining, abort } => {
                    if remaining > budget {
                        self.state = Playback::Beat {
                            remaining: remaining - budget,
                            abort,
                        };
                        return Ok(false);
                    }
                    budget -= remaining;

                    if abort {
                        let remaining_slots = env.plan.actions().len().saturating_sub(self.cursor);
                        env.events
                            .push(env.turn, BattleEventType::ResolutionAborted { remaining_slots });
                        self.aborted = true;
                        self.state = Playback::Done;
                        return Ok(true);
                    }
                    self.state = Playback::Next;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::combatant::{Combatant, Health};
    use crate::combat::skills::SkillBook;
    use crate::core::types::Side;
    use crate::stage::NullStage;
    use rand::SeedableRng;

    fn roster() -> Roster {
        Roster::from_combatants([
            Combatant::test_fighter(ActorId(1), Side::Ally),
            Combatant::test_fighter(ActorId(2), Side::Enemy),
        ])
    }

    fn plan_with(kinds: &[(AttackKind, ResponseKind)], book: &SkillBook, roster: &Roster) -> TurnPlan {
        let judge = OutcomeJudge::new(book, 0.1);
        let mut plan = TurnPlan::new(4);
        for &(attack, response) in kinds {
            let slot = plan.push_action(ActorId(1), ActorId(2), attack).unwrap();
            let outcome = judge.judge(
                attack,
                response,
                roster.get(ActorId(1)).unwrap(),
                roster.get(ActorId(2)).unwrap(),
            );
            plan.push_response(PredictedResponse {
                responder: ActorId(2),
                kind: response,
                slot,
                outcome,
            });
        }
        plan
    }

    fn run_to_end(plan: &TurnPlan, roster: &mut Roster, book: &SkillBook, stage: &mut NullStage) -> (Sequencer, BattleEventLog) {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut events = BattleEventLog::new();
        let mut sequencer = Sequencer::new();
        let mut env = PlaybackEnv {
            plan,
            roster,
            skills: book,
            fatigue_step: 0.1,
            beat_seconds: 0.5,
            rng: &mut rng,
            animator: stage,
            events: &mut events,
            turn: 1,
        };
        for _ in 0..1000 {
            if sequencer.step(0.1, &mut env).unwrap() {
                break;
            }
        }
        (sequencer, events)
    }

    #[test]
    fn test_exchange_applies_both_packets() {
        let book = SkillBook::new();
        let mut roster = roster();
        let plan = plan_with(&[(AttackKind::Smash, ResponseKind::Block)], &book, &roster);
        let mut stage = NullStage::new(0.3, 0.0);

        let (sequencer, events) = run_to_end(&plan, &mut roster, &book, &mut stage);
        assert!(sequencer.is_done());
        assert_eq!(sequencer.resolved().len(), 1);

        // attack 10 vs defense 10: base residual 5, base fatal 10
        let defender = roster.get(ActorId(2)).unwrap();
        assert_eq!(defender.health.residual(), 3);
        assert_eq!(defender.health.fatal(), 3);
        let attacker = roster.get(ActorId(1)).unwrap();
        assert_eq!(attacker.health.residual(), 3);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_waits_for_animation_duration() {
        let book = SkillBook::new();
        let mut roster = roster();
        let plan = plan_with(&[(AttackKind::Smash, ResponseKind::Parry)], &book, &roster);
        let mut stage = NullStage::new(1.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = BattleEventLog::new();
        let mut sequencer = Sequencer::new();
        let mut env = PlaybackEnv {
            plan: &plan,
            roster: &mut roster,
            skills: &book,
            fatigue_step: 0.1,
            beat_seconds: 0.5,
            rng: &mut rng,
            animator: &mut stage,
            events: &mut events,
            turn: 1,
        };

        assert!(!sequencer.step(0.5, &mut env).unwrap());
        assert_eq!(env.roster.get(ActorId(2)).unwrap().health.residual(), 0);
        assert!(!sequencer.step(0.6, &mut env).unwrap());
        assert!(env.roster.get(ActorId(2)).unwrap().health.residual() > 0);
        assert!(sequencer.step(0.5, &mut env).unwrap());
    }

    #[test]
    fn test_death_aborts_remaining_slots() {
        let book = SkillBook::new();
        let mut roster = roster();
        roster.get_mut(ActorId(2)).unwrap().health = Health::with_damage(100, 0, 99);
        let plan = plan_with(
            &[
                (AttackKind::Smash, ResponseKind::Parry),
                (AttackKind::Slash, ResponseKind::Parry),
                (AttackKind::Slash, ResponseKind::Parry),
            ],
            &book,
            &roster,
        );
        let mut stage = NullStage::instant();

        let (sequencer, events) = run_to_end(&plan, &mut roster, &book, &mut stage);
        assert!(sequencer.was_aborted());
        assert_eq!(sequencer.resolved().len(), 1);
        assert!(roster.get(ActorId(2)).unwrap().is_dead());
        assert!(events
            .iter()
            .any(|e| matches!(e, BattleEventType::ResolutionAborted { remaining_slots: 2 })));
    }

    #[test]
    fn test_unanswered_slots_skipped() {
        let book = SkillBook::new();
        let mut roster = roster();
        let mut plan = TurnPlan::new(4);
        plan.push_action(ActorId(1), ActorId(2), AttackKind::Slash);

        let mut stage = NullStage::instant();
        let (sequencer, _) = run_to_end(&plan, &mut roster, &book, &mut stage);
        assert!(sequencer.resolved().is_empty());
        assert_eq!(roster.get(ActorId(2)).unwrap().health.residual(), 0);
    }

    #[test]
    fn test_resolve_slot_deterministic_for_seed() {
        let book = SkillBook::new();
        let roster = roster();
        let plan = plan_with(&[(AttackKind::Slash, ResponseKind::Evade)], &book, &roster);
        let judge = OutcomeJudge::new(&book, 0.1);

        let first = resolve_slot(
            &plan.actions()[0],
            &plan.responses()[0],
            &roster,
            &judge,
            &book,
            &mut ChaCha8Rng::seed_from_u64(3),
        )
        .unwrap();
        let second = resolve_slot(
            &plan.actions()[0],
            &plan.responses()[0],
            &roster,
            &judge,
            &book,
            &mut ChaCha8Rng::seed_from_u64(3),
        )
        .unwrap();
        assert_eq!(first, second);
        if first.evaded {
            assert!(first.defender_damage.is_none());
            assert_eq!(first.lead, ActorId(2));
        }
    }
}
