//! Opponent AI for reservation duels
//!
//! Architecture: Trait + Data hybrid
//! - OpponentPolicy trait defines the interface the controller drives
//! - PolicyConfig holds the TOML-loadable weights
//! - WeightedPolicy is the default weighted-random implementation

mod defense;
mod offense;
mod roulette;

pub use defense::{best_responses, concealed_responses, legal_responses, plan_defense};
pub use offense::{attack_weights, plan_offense, OffensePlan};
pub use roulette::spin;

use rand_chacha::ChaCha8Rng;

use crate::battle::plan::PlannedAction;
use crate::combat::combatant::Combatant;
use crate::combat::judge::OutcomeJudge;
use crate::core::config::PolicyConfig;
use crate::core::types::{ActorId, ResponseKind};

/// Trait for opponent policies
pub trait OpponentPolicy {
    /// Choose a target among `targets` and up to `slots` attack kinds,
    /// consuming them from the attacker's hand
    fn plan_offense(
        &mut self,
        attacker: &mut Combatant,
        targets: &[ActorId],
        slots: usize,
        rng: &mut ChaCha8Rng,
    ) -> OffensePlan;

    /// Answer every queued action, consuming counters from the defender's hand
    fn plan_defense(
        &mut self,
        judge: &OutcomeJudge,
        defender: &mut Combatant,
        attacker: &Combatant,
        actions: &[PlannedAction],
        attacker_pre_turn: [u8; 3],
        rng: &mut ChaCha8Rng,
    ) -> Vec<(usize, ResponseKind)>;
}

/// Weighted-random policy
#[derive(Debug, Clone, Default)]
pub struct WeightedPolicy {
    config: PolicyConfig,
}

impl WeightedPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }
}

impl OpponentPolicy for WeightedPolicy {
    fn plan_offense(
        &mut self,
        attacker: &mut Combatant,
        targets: &[ActorId],
        slots: usize,
        rng: &mut ChaCha8Rng,
    ) -> OffensePlan {
        plan_offense(&self.config, attacker, targets, slots, rng)
    }

    fn plan_defense(
        &mut self,
        judge: &OutcomeJudge,
        defender: &mut Combatant,
        attacker: &Combatant,
        actions: &[PlannedAction],
        attacker_pre_turn: [u8; 3],
        rng: &mut ChaCha8Rng,
    ) -> Vec<(usize, ResponseKind)> {
        plan_defense(judge, defender, attacker, actions, attacker_pre_turn, rng)
    }
}
