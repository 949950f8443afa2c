//! Two-tier damage formula
//!
//! base residual = max(1, attack^2 / (attack + defense))
//! base fatal    = attack
//!
//! Both are scaled by the outcome ratio and the dealer's skill bonus.

use serde::{Deserialize, Serialize};

use crate::combat::combatant::Combatant;
use crate::combat::skills::SkillProfile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Damage {
    pub residual: u32,
    pub fatal: u32,
}

impl Damage {
    pub const NONE: Damage = Damage {
        residual: 0,
        fatal: 0,
    };

    pub fn is_none(&self) -> bool {
        self.residual == 0 && self.fatal == 0
    }
}

pub fn base_residual(attack: f32, defense: f32) -> f32 {
    let total = attack + defense;
    if total <= 0.0 {
        return 1.0;
    }
    (attack * attack / total).max(1.0)
}

/// Damage dealt by `dealer` to `receiver` at the given ratios
pub fn compute_damage(
    dealer: &Combatant,
    receiver: &Combatant,
    dealer_skills: &SkillProfile,
    residual_ratio: f32,
    fatal_ratio: f32,
) -> Damage {
    let attack = dealer.attack();
    let multiplier = dealer_skills.damage_multiplier();

    let residual = base_residual(attack, receiver.defense()) * residual_ratio * multiplier;
    let mut fatal = attack * fatal_ratio * multiplier;

    if dealer_skills.critical_conversion {
        fatal = fatal.max(residual);
    }

    Damage {
        residual: residual.max(0.0).round() as u32,
        fatal: fatal.max(0.0).round() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::combatant::Stats;
    use crate::core::types::{ActorId, Side};

    fn with_stats(attack: u32, defense: u32) -> Combatant {
        Combatant::new(
            ActorId(attack),
            "dummy",
            Side::Ally,
            100,
            Stats {
                attack,
                defense,
                ..Stats::default()
            },
        )
    }

    #[test]
    fn test_base_residual_formula() {
        assert_eq!(base_residual(20.0, 20.0), 10.0);
        assert_eq!(base_residual(1.0, 100.0), 1.0);
        assert_eq!(base_residual(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_ratios_scale_both_tiers() {
        let dealer = with_stats(20, 10);
        let receiver = with_stats(5, 20);
        let damage = compute_damage(&dealer, &receiver, &SkillProfile::default(), 1.0, 0.5);
        assert_eq!(damage.residual, 10);
        assert_eq!(damage.fatal, 10);
    }

    #[test]
    fn test_skill_bonus_percent() {
        let dealer = with_stats(20, 10);
        let receiver = with_stats(5, 20);
        let skills = SkillProfile {
            damage_bonus_percent: 50.0,
            ..Default::default()
        };
        let damage = compute_damage(&dealer, &receiver, &skills, 1.0, 0.0);
        assert_eq!(damage.residual, 15);
        assert_eq!(damage.fatal, 0);
    }

    #[test]
    fn test_critical_conversion_raises_fatal() {
        let dealer = with_stats(20, 10);
        let receiver = with_stats(5, 20);
        let skills = SkillProfile {
            critical_conversion: true,
            ..Default::default()
        };
        let damage = compute_damage(&dealer, &receiver, &skills, 1.0, 0.0);
        assert_eq!(damage.residual, 10);
        assert_eq!(damage.fatal, 10);
    }

    #[test]
    fn test_zero_ratios_no_damage() {
        let dealer = with_stats(20, 10);
        let receiver = with_stats(5, 20);
        let damage = compute_damage(&dealer, &receiver, &SkillProfile::default(), 0.0, 0.0);
        assert!(damage.is_none());
    }
}
