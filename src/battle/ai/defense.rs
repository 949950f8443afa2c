//! Defense planning: answer every queued slot as the defender
//!
//! Visible slots are read with an intelligence roll. Concealed slots get no
//! read at all, and each counter is capped by how many uses of its attack kind
//! the attacker held before this turn's planning began.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::battle::plan::PlannedAction;
use crate::combat::combatant::Combatant;
use crate::combat::judge::OutcomeJudge;
use crate::core::types::{AttackKind, ResponseKind};

/// Responses the defender may pick for a visible slot
pub fn legal_responses(defender: &Combatant) -> Vec<ResponseKind> {
    ResponseKind::ALL
        .into_iter()
        .filter(|r| match r.cost() {
            Some(kind) => defender.hand.remaining(kind) > 0,
            None => true,
        })
        .collect()
}

/// Responses for a concealed slot, capped by the attacker's pre-turn hand
pub fn concealed_responses(
    defender: &Combatant,
    used_this_pass: &[u8; 3],
    attacker_pre_turn: &[u8; 3],
) -> Vec<ResponseKind> {
    ResponseKind::ALL
        .into_iter()
        .filter(|r| match r.cost() {
            Some(kind) => {
                defender.hand.remaining(kind) > 0
                    && used_this_pass[r.index()] < attacker_pre_turn[kind.index()]
            }
            None => true,
        })
        .collect()
}

/// Legal responses the judge ranks best for the defender
pub fn best_responses(
    judge: &OutcomeJudge,
    attack: AttackKind,
    attacker: &Combatant,
    defender: &Combatant,
    legal: &[ResponseKind],
) -> Vec<ResponseKind> {
    let ranked: Vec<(ResponseKind, u8)> = legal
        .iter()
        .map(|&r| (r, judge.judge(attack, r, attacker, defender).advantage.defender_rank()))
        .collect();

    let Some(best) = ranked.iter().map(|(_, rank)| *rank).min() else {
        return Vec::new();
    };

    ranked
        .into_iter()
        .filter(|(_, rank)| *rank == best)
        .map(|(r, _)| r)
        .collect()
}

/// Choose one response per action, in slot order. Counters are consumed from
/// the defender's hand as they are chosen.
pub fn plan_defense<R: Rng + ?Sized>(
    judge: &OutcomeJudge,
    defender: &mut Combatant,
    attacker: &Combatant,
    actions: &[PlannedAction],
    attacker_pre_turn: [u8; 3],
    rng: &mut R,
) -> Vec<(usize, ResponseKind)> {
    let mut used_this_pass = [0u8; 3];
    let mut chosen = Vec::with_capacity(actions.len());

    for action in actions {
        let picked = if action.visible {
            let legal = legal_responses(defender);
            let reads_it = rng.gen_range(0..100) < defender.stats.intelligence;
            let pool = if reads_it {
                best_responses(judge, action.kind, attacker, defender, &legal)
            } else {
                legal
            };
            pool.choose(rng).copied()
        } else {
            concealed_responses(defender, &used_this_pass, &attacker_pre_turn)
                .choose(rng)
                .copied()
        };
        let response = picked.unwrap_or(ResponseKind::Evade);

        if let Some(kind) = response.cost() {
            if defender.hand.consume(kind) {
                used_this_pass[response.index()] += 1;
            }
        }

        chosen.push((action.slot, response));
    }

    tracing::debug!("{} answers {:?}", defender.id, chosen);
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::combatant::Hand;
    use crate::combat::skills::SkillBook;
    use crate::core::types::{ActorId, Side};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn action(slot: usize, kind: AttackKind, visible: bool) -> PlannedAction {
        PlannedAction {
            attacker: ActorId(1),
            target: ActorId(2),
            kind,
            slot,
            visible,
        }
    }

    #[test]
    fn test_evade_always_legal() {
        let mut defender = Combatant::test_fighter(ActorId(2), Side::Ally);
        defender.hand = Hand::new([0, 0, 0], [3, 3, 3]);
        assert_eq!(legal_responses(&defender), vec![ResponseKind::Evade]);
        assert_eq!(
            concealed_responses(&defender, &[0; 3], &[3; 3]),
            vec![ResponseKind::Evade]
        );
    }

    #[test]
    fn test_concealed_counters_capped_by_attacker_hand() {
        let defender = Combatant::test_fighter(ActorId(2), Side::Ally);

        // Attacker had no Slash before planning: Parry is off the table
        let legal = concealed_responses(&defender, &[0, 0, 0], &[0, 2, 1]);
        assert_eq!(legal, vec![ResponseKind::Block, ResponseKind::Evade]);

        // Block already used twice against an attacker who held two Smash
        let legal = concealed_responses(&defender, &[0, 2, 0], &[0, 2, 1]);
        assert_eq!(legal, vec![ResponseKind::Evade]);
    }

    #[test]
    fn test_smart_defender_picks_defender_advantage() {
        let book = SkillBook::new();
        let judge = OutcomeJudge::new(&book, 0.1);
        let attacker = Combatant::test_fighter(ActorId(1), Side::Enemy);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..20 {
            let mut defender = Combatant::test_fighter(ActorId(2), Side::Ally);
            defender.stats.intelligence = 100;
            let chosen = plan_defense(
                &judge,
                &mut defender,
                &attacker,
                &[action(0, AttackKind::Slash, true)],
                [3, 3, 3],
                &mut rng,
            );
            // Slash vs Block is the only defender-advantage cell for Slash
            assert_eq!(chosen, vec![(0, ResponseKind::Block)]);
            assert_eq!(defender.hand.remaining(AttackKind::Smash), 2);
        }
    }

    #[test]
    fn test_counters_consume_once_each() {
        let book = SkillBook::new();
        let judge = OutcomeJudge::new(&book, 0.1);
        let attacker = Combatant::test_fighter(ActorId(1), Side::Enemy);
        let mut defender = Combatant::test_fighter(ActorId(2), Side::Ally);
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        let actions: Vec<PlannedAction> = (0..4).map(|i| action(i, AttackKind::Thrust, false)).collect();
        let before = defender.hand.total();
        let chosen = plan_defense(&judge, &mut defender, &attacker, &actions, [3, 3, 3], &mut rng);

        assert_eq!(chosen.len(), 4);
        let counters = chosen.iter().filter(|(_, r)| r.is_counter()).count() as u32;
        assert_eq!(before - defender.hand.total(), counters);
    }

    #[test]
    fn test_empty_hand_defender_evades_everything() {
        let book = SkillBook::new();
        let judge = OutcomeJudge::new(&book, 0.1);
        let attacker = Combatant::test_fighter(ActorId(1), Side::Enemy);
        let mut defender = Combatant::test_fighter(ActorId(2), Side::Ally);
        defender.hand = Hand::new([0, 0, 0], [3, 3, 3]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let actions = [action(0, AttackKind::Smash, true), action(1, AttackKind::Slash, false)];
        let chosen = plan_defense(&judge, &mut defender, &attacker, &actions, [3, 3, 3], &mut rng);
        assert!(chosen.iter().all(|(_, r)| *r == ResponseKind::Evade));
    }
}
