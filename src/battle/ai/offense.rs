//! Offense planning: fill reservation slots as the attacker

use rand::seq::SliceRandom;
use rand::Rng;

use crate::battle::ai::roulette::spin;
use crate::combat::combatant::Combatant;
use crate::core::config::PolicyConfig;
use crate::core::types::{ActorId, AttackKind};

/// Target and attack kinds chosen for this turn, in slot order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffensePlan {
    pub target: Option<ActorId>,
    pub kinds: Vec<AttackKind>,
}

/// Would picking `kind` make the last `window` picks plus this one identical?
fn extends_streak(picked: &[AttackKind], kind: AttackKind, window: usize) -> bool {
    window > 0 && picked.len() >= window && picked[picked.len() - window..].iter().all(|&k| k == kind)
}

/// Roulette weights for every usable kind
pub fn attack_weights(
    config: &PolicyConfig,
    attacker: &Combatant,
    picked: &[AttackKind],
) -> Vec<(AttackKind, f32)> {
    let most = attacker.hand.most_abundant();

    attacker
        .hand
        .usable_kinds()
        .into_iter()
        .map(|kind| {
            let remaining = attacker.hand.remaining(kind);
            let mut weight = remaining as f32;
            if remaining == most {
                weight *= config.abundance_boost;
            }
            if extends_streak(picked, kind, config.streak_window) {
                weight *= config.repeat_penalty;
            }
            (kind, weight)
        })
        .collect()
}

/// Pick a random living target, then spin for attack kinds until the slots
/// are full, the hand runs out, or one more pick would dip below the reserve
/// floor. Chosen kinds are consumed from the attacker's hand.
pub fn plan_offense<R: Rng + ?Sized>(
    config: &PolicyConfig,
    attacker: &mut Combatant,
    targets: &[ActorId],
    slots: usize,
    rng: &mut R,
) -> OffensePlan {
    let Some(&target) = targets.choose(rng) else {
        return OffensePlan::default();
    };

    let mut kinds = Vec::with_capacity(slots);
    while kinds.len() < slots {
        if attacker.hand.is_empty() {
            break;
        }
        if attacker.hand.total().saturating_sub(1) < config.reserve_floor {
            tracing::debug!(
                "{} holds back with {} uses left",
                attacker.id,
                attacker.hand.total()
            );
            break;
        }

        let weights = attack_weights(config, attacker, &kinds);
        let Some(kind) = spin(rng, &weights) else {
            break;
        };
        if !attacker.hand.consume(kind) {
            break;
        }
        kinds.push(kind);
    }

    tracing::debug!("{} plans {:?} against {}", attacker.id, kinds, target);

    OffensePlan {
        target: Some(target),
        kinds,
    }
}
