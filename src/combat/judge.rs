//! Outcome judge
//!
//! Maps (attack kind, response kind, attacker, defender) to an `Outcome`.
//! Pure: the same inputs always produce the same outcome.
//!
//! | attack \ response | Parry          | Block          | Evade        |
//! |-------------------|----------------|----------------|--------------|
//! | Slash             | Draw           | Defender adv.  | base 0.6     |
//! | Smash             | Attacker adv.  | Draw           | base 0.8     |
//! | Thrust            | Defender adv.  | Attacker adv.  | base 1.0     |

use serde::{Deserialize, Serialize};

use crate::combat::buffs::BuffKind;
use crate::combat::combatant::Combatant;
use crate::combat::skills::{SkillProfile, SkillRepository};
use crate::core::types::{Advantage, AttackKind, ResponseKind};

/// Result descriptor for a single attack/response pairing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Probability that the defender avoids the hit (evade cells only)
    pub evade_rate: f32,
    /// Share of base residual damage dealt to the defender
    pub residual_ratio: f32,
    /// Share of base fatal damage dealt to the defender
    pub fatal_ratio: f32,
    /// Share of the defender's base residual damage dealt back to the attacker
    pub counter_residual_ratio: f32,
    /// Share of the defender's base fatal damage dealt back to the attacker
    pub counter_fatal_ratio: f32,
    pub advantage: Advantage,
}

impl Outcome {
    pub fn can_evade(&self) -> bool {
        self.evade_rate > 0.0
    }
}

/// Fixed table cell before modifiers
struct Cell {
    residual: f32,
    fatal: f32,
    counter_residual: f32,
    counter_fatal: f32,
    /// `None` for evade cells, whose label depends on the computed rate
    advantage: Option<Advantage>,
    evade_base: f32,
}

const fn exchange(
    residual: f32,
    fatal: f32,
    counter_residual: f32,
    counter_fatal: f32,
    advantage: Advantage,
) -> Cell {
    Cell {
        residual,
        fatal,
        counter_residual,
        counter_fatal,
        advantage: Some(advantage),
        evade_base: 0.0,
    }
}

const fn evade(evade_base: f32, residual: f32, fatal: f32) -> Cell {
    Cell {
        residual,
        fatal,
        counter_residual: 0.0,
        counter_fatal: 0.0,
        advantage: None,
        evade_base,
    }
}

fn base_cell(attack: AttackKind, response: ResponseKind) -> Cell {
    use Advantage::*;
    use AttackKind::*;
    use ResponseKind::*;

    match (attack, response) {
        (Slash, Parry) => exchange(0.5, 0.0, 0.5, 0.0, Draw),
        (Slash, Block) => exchange(0.25, 0.0, 0.75, 0.25, DefenderAdvantage),
        (Slash, Evade) => evade(0.6, 1.0, 0.0),
        (Smash, Parry) => exchange(1.0, 0.5, 0.0, 0.0, AttackerAdvantage),
        (Smash, Block) => exchange(0.5, 0.25, 0.5, 0.25, Draw),
        (Smash, Evade) => evade(0.8, 1.0, 0.5),
        (Thrust, Parry) => exchange(0.0, 0.0, 1.0, 0.5, DefenderAdvantage),
        (Thrust, Block) => exchange(1.0, 0.25, 0.0, 0.0, AttackerAdvantage),
        (Thrust, Evade) => evade(1.0, 0.5, 1.0),
    }
}

/// Label an evade cell from its computed rate
pub fn evade_advantage(evade_rate: f32) -> Advantage {
    if evade_rate > 0.6 {
        Advantage::DefenderAdvantage
    } else if evade_rate > 0.3 {
        Advantage::Draw
    } else {
        Advantage::AttackerAdvantage
    }
}

pub struct OutcomeJudge<'a> {
    skills: &'a dyn SkillRepository,
    fatigue_step: f32,
}

impl<'a> OutcomeJudge<'a> {
    pub fn new(skills: &'a dyn SkillRepository, fatigue_step: f32) -> Self {
        Self {
            skills,
            fatigue_step,
        }
    }

    pub fn judge(
        &self,
        attack: AttackKind,
        response: ResponseKind,
        attacker: &Combatant,
        defender: &Combatant,
    ) -> Outcome {
        let cell = base_cell(attack, response);

        let (evade_rate, advantage) = match cell.advantage {
            Some(advantage) => (0.0, advantage),
            None => {
                let rate = self.evade_rate(cell.evade_base, attack, attacker, defender);
                (rate, evade_advantage(rate))
            }
        };

        Outcome {
            evade_rate,
            residual_ratio: cell.residual,
            fatal_ratio: cell.fatal,
            counter_residual_ratio: cell.counter_residual,
            counter_fatal_ratio: cell.counter_fatal,
            advantage,
        }
    }

    fn evade_rate(
        &self,
        base: f32,
        attack: AttackKind,
        attacker: &Combatant,
        defender: &Combatant,
    ) -> f32 {
        let mut rate = base;

        // Fatigue only bites once the defender has no Thrust left
        if defender.hand.remaining(AttackKind::Thrust) == 0 {
            let penalty = self.fatigue_step * (defender.evade_successes + 1) as f32;
            rate = (rate - penalty).max(0.0);
        }

        if SkillProfile::of(attacker, self.skills).unavoidable {
            rate = if attack == AttackKind::Thrust {
                rate * 0.5
            } else {
                0.0
            };
        }

        if let Some(buff) = defender.buffs.get(BuffKind::EvasionSuccessRate) {
            rate *= buff;
        }

        // Shrinks the miss probability rather than scaling success
        if let Some(buff) = defender.buffs.get(BuffKind::EvasionFailRate) {
            rate = 1.0 - (1.0 - rate) * buff;
        }

        rate.clamp(0.0, 1.0)
    }
}
