//! Combatant stat block
//!
//! Every combatant has two-tier health, a hand of remaining attack-kind uses,
//! base stats, and a buff table.

use serde::{Deserialize, Serialize};

use crate::combat::buffs::{BuffKind, BuffTable};
use crate::core::types::{ActorId, AttackKind, Side, SkillId};

/// Two-tier damage pools sharing one maximum
///
/// Invariant: `residual + fatal <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    max: u32,
    residual: u32,
    fatal: u32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self {
            max: max.max(1),
            residual: 0,
            fatal: 0,
        }
    }

    /// Build with pre-existing damage, clamped to keep the invariant
    pub fn with_damage(max: u32, residual: u32, fatal: u32) -> Self {
        let mut health = Self::new(max);
        health.take(residual, fatal);
        health
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn residual(&self) -> u32 {
        self.residual
    }

    pub fn fatal(&self) -> u32 {
        self.fatal
    }

    /// HP left before death
    pub fn remaining(&self) -> u32 {
        self.max - self.residual - self.fatal
    }

    pub fn is_dead(&self) -> bool {
        self.residual + self.fatal >= self.max
    }

    /// Apply damage. Fatal damage lands first and can crowd out residual.
    pub fn take(&mut self, residual: u32, fatal: u32) {
        self.fatal = self.fatal.saturating_add(fatal).min(self.max);
        let room = self.max - self.fatal;
        self.residual = self.residual.saturating_add(residual).min(room);
    }

    /// Heal residual damage. Fatal damage is permanent.
    pub fn recover_residual(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.residual);
        self.residual -= healed;
        healed
    }
}

/// Remaining uses per attack kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    remaining: [u8; 3],
    max: [u8; 3],
}

impl Hand {
    /// Full hand with the same cap for every kind
    pub fn full(max_per_kind: u8) -> Self {
        Self {
            remaining: [max_per_kind; 3],
            max: [max_per_kind; 3],
        }
    }

    pub fn new(remaining: [u8; 3], max: [u8; 3]) -> Self {
        let mut clamped = remaining;
        for (r, m) in clamped.iter_mut().zip(max.iter()) {
            *r = (*r).min(*m);
        }
        Self {
            remaining: clamped,
            max,
        }
    }

    pub fn remaining(&self, kind: AttackKind) -> u8 {
        self.remaining[kind.index()]
    }

    pub fn max(&self, kind: AttackKind) -> u8 {
        self.max[kind.index()]
    }

    pub fn total(&self) -> u32 {
        self.remaining.iter().map(|&r| r as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Spend one use. Returns false without mutation when none are left.
    pub fn consume(&mut self, kind: AttackKind) -> bool {
        let slot = &mut self.remaining[kind.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Add `amount` to every kind, capped at each kind's maximum
    pub fn refill(&mut self, amount: u8) {
        for (r, m) in self.remaining.iter_mut().zip(self.max.iter()) {
            *r = r.saturating_add(amount).min(*m);
        }
    }

    /// Largest remaining count across kinds
    pub fn most_abundant(&self) -> u8 {
        self.remaining.iter().copied().max().unwrap_or(0)
    }

    pub fn usable_kinds(&self) -> Vec<AttackKind> {
        AttackKind::ALL
            .into_iter()
            .filter(|k| self.remaining(*k) > 0)
            .collect()
    }

    pub fn snapshot(&self) -> [u8; 3] {
        self.remaining
    }
}

/// Base stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub attack: u32,
    pub defense: u32,
    pub speed: f32,
    pub insight: u32,
    pub confuse: u32,
    /// 0-99 chance the AI reads a visible slot correctly
    pub intelligence: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            attack: 10,
            defense: 10,
            speed: 10.0,
            insight: 10,
            confuse: 10,
            intelligence: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub id: ActorId,
    pub name: String,
    pub side: Side,
    pub health: Health,
    pub hand: Hand,
    pub stats: Stats,
    pub buffs: BuffTable,
    pub skills: Vec<SkillId>,
    /// Successful evades this turn (drives evade fatigue)
    pub evade_successes: u32,
}

impl Combatant {
    pub fn new(id: ActorId, name: impl Into<String>, side: Side, max_hp: u32, stats: Stats) -> Self {
        Self {
            id,
            name: name.into(),
            side,
            health: Health::new(max_hp),
            hand: Hand::full(3),
            stats,
            buffs: BuffTable::new(),
            skills: Vec::new(),
            evade_successes: 0,
        }
    }

    /// Test combatant: balanced fighter with a full hand of three per kind
    pub fn test_fighter(id: ActorId, side: Side) -> Self {
        Self::new(id, format!("fighter-{}", id.0), side, 100, Stats::default())
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    pub fn attack(&self) -> f32 {
        self.stats.attack as f32 * self.buffs.rate(BuffKind::AttackRate)
    }

    pub fn defense(&self) -> f32 {
        self.stats.defense as f32 * self.buffs.rate(BuffKind::DefenseRate)
    }

    pub fn is_concealed(&self) -> bool {
        self.buffs.has(BuffKind::Concealment)
    }

    /// Per-turn counters reset at start of turn
    pub fn reset_turn(&mut self) {
        self.evade_successes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_at_max_minus_one_then_one_more_kills() {
        let mut health = Health::with_damage(50, 0, 49);
        assert!(!health.is_dead());

        health.take(0, 1);
        assert!(health.is_dead());
        assert_eq!(health.remaining(), 0);
    }

    #[test]
    fn test_fatal_crowds_out_residual() {
        let mut health = Health::with_damage(100, 60, 0);
        health.take(0, 70);
        assert_eq!(health.fatal(), 70);
        assert_eq!(health.residual(), 30);
        assert!(health.is_dead());
    }

    #[test]
    fn test_residual_clamped_to_room() {
        let mut health = Health::with_damage(100, 0, 90);
        health.take(50, 0);
        assert_eq!(health.residual(), 10);
        assert!(health.is_dead());
    }

    #[test]
    fn test_recover_only_heals_residual() {
        let mut health = Health::with_damage(100, 20, 30);
        assert_eq!(health.recover_residual(50), 20);
        assert_eq!(health.residual(), 0);
        assert_eq!(health.fatal(), 30);
    }

    #[test]
    fn test_hand_consume_rejects_empty() {
        let mut hand = Hand::new([1, 0, 2], [3, 3, 3]);
        assert!(hand.consume(AttackKind::Slash));
        assert!(!hand.consume(AttackKind::Slash));
        assert!(!hand.consume(AttackKind::Smash));
        assert_eq!(hand.total(), 2);
    }

    #[test]
    fn test_hand_refill_capped() {
        let mut hand = Hand::new([0, 2, 3], [3, 3, 3]);
        hand.refill(2);
        assert_eq!(hand.snapshot(), [2, 3, 3]);
    }

    #[test]
    fn test_hand_usable_kinds() {
        let hand = Hand::new([0, 1, 0], [3, 3, 3]);
        assert_eq!(hand.usable_kinds(), vec![AttackKind::Smash]);
        assert_eq!(hand.most_abundant(), 1);
    }

    #[test]
    fn test_buffs_scale_attack() {
        let mut fighter = Combatant::test_fighter(ActorId(1), Side::Ally);
        fighter
            .buffs
            .apply(BuffKind::AttackRate, 1.5, crate::combat::buffs::Expiry::EndOfTurn);
        assert_eq!(fighter.attack(), 15.0);
        assert_eq!(fighter.defense(), 10.0);
    }
}
