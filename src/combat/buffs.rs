//! Transient numeric modifiers
//!
//! A fixed-capacity table keyed by `BuffKind`. At most one buff of each kind
//! is active; applying a kind again replaces the previous value.

use serde::{Deserialize, Serialize};

/// Named modifier slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffKind {
    /// Multiplies effective attack
    AttackRate,
    /// Multiplies effective defense
    DefenseRate,
    /// Multiplies the defender's evade rate
    EvasionSuccessRate,
    /// Multiplies the defender's miss probability
    EvasionFailRate,
    /// Hides every reservation slot from the opposing side
    Concealment,
}

impl BuffKind {
    pub const COUNT: usize = 5;

    fn slot(self) -> usize {
        match self {
            BuffKind::AttackRate => 0,
            BuffKind::DefenseRate => 1,
            BuffKind::EvasionSuccessRate => 2,
            BuffKind::EvasionFailRate => 3,
            BuffKind::Concealment => 4,
        }
    }
}

/// When a buff is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expiry {
    EndOfTurn,
    Persistent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub value: f32,
    pub expiry: Expiry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuffTable {
    entries: [Option<Buff>; BuffKind::COUNT],
}

impl BuffTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, kind: BuffKind, value: f32, expiry: Expiry) {
        self.entries[kind.slot()] = Some(Buff { value, expiry });
    }

    pub fn remove(&mut self, kind: BuffKind) -> Option<Buff> {
        self.entries[kind.slot()].take()
    }

    pub fn get(&self, kind: BuffKind) -> Option<f32> {
        self.entries[kind.slot()].map(|b| b.value)
    }

    pub fn has(&self, kind: BuffKind) -> bool {
        self.entries[kind.slot()].is_some()
    }

    /// Multiplier for `kind`, 1.0 when absent
    pub fn rate(&self, kind: BuffKind) -> f32 {
        self.get(kind).unwrap_or(1.0)
    }

    /// End-of-turn pass: drop everything that expires with the turn
    pub fn clear_expired(&mut self) -> usize {
        let mut cleared = 0;
        for entry in self.entries.iter_mut() {
            if matches!(entry, Some(b) if b.expiry == Expiry::EndOfTurn) {
                *entry = None;
                cleared += 1;
            }
        }
        cleared
    }
}
