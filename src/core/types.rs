//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for a combatant on the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a skill in the injected skill repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillId(pub u32);

/// Turn counter
pub type Turn = u32;

/// Which party a combatant fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Ally,
    Enemy,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Ally => Side::Enemy,
            Side::Enemy => Side::Ally,
        }
    }
}

/// The three attack kinds an attacker can reserve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    Slash,
    Smash,
    Thrust,
}

impl AttackKind {
    pub const ALL: [AttackKind; 3] = [AttackKind::Slash, AttackKind::Smash, AttackKind::Thrust];

    /// Dense index into per-kind arrays
    pub fn index(self) -> usize {
        match self {
            AttackKind::Slash => 0,
            AttackKind::Smash => 1,
            AttackKind::Thrust => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttackKind::Slash => "slash",
            AttackKind::Smash => "smash",
            AttackKind::Thrust => "thrust",
        }
    }
}

/// Defender responses: two counters plus evade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseKind {
    /// Counter that spends a Slash use
    Parry,
    /// Counter that spends a Smash use
    Block,
    /// Always legal, spends nothing
    Evade,
}

impl ResponseKind {
    pub const ALL: [ResponseKind; 3] = [ResponseKind::Parry, ResponseKind::Block, ResponseKind::Evade];

    /// Attack kind whose remaining uses this response consumes
    pub fn cost(self) -> Option<AttackKind> {
        match self {
            ResponseKind::Parry => Some(AttackKind::Slash),
            ResponseKind::Block => Some(AttackKind::Smash),
            ResponseKind::Evade => None,
        }
    }

    pub fn is_counter(self) -> bool {
        self.cost().is_some()
    }

    /// Dense index into per-response arrays
    pub fn index(self) -> usize {
        match self {
            ResponseKind::Parry => 0,
            ResponseKind::Block => 1,
            ResponseKind::Evade => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseKind::Parry => "parry",
            ResponseKind::Block => "block",
            ResponseKind::Evade => "evade",
        }
    }
}

/// Who came out ahead in an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Advantage {
    AttackerAdvantage,
    DefenderAdvantage,
    Draw,
}

impl Advantage {
    /// Ranking from the defender's point of view (lower is better)
    pub fn defender_rank(self) -> u8 {
        match self {
            Advantage::DefenderAdvantage => 0,
            Advantage::Draw => 1,
            Advantage::AttackerAdvantage => 2,
        }
    }
}
