//! Structured battle event log

use serde::{Deserialize, Serialize};

use crate::battle::outcome::BattleResult;
use crate::battle::phase::BattlePhase;
use crate::combat::damage::Damage;
use crate::core::types::{ActorId, Advantage, AttackKind, ResponseKind, Turn};

/// Log entry for battle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleEvent {
    pub turn: Turn,
    pub event_type: BattleEventType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEventType {
    PhaseEntered {
        phase: BattlePhase,
    },
    TurnStarted {
        actor: ActorId,
    },
    AttackReserved {
        attacker: ActorId,
        target: ActorId,
        kind: AttackKind,
        slot: usize,
        visible: bool,
    },
    ResponseChosen {
        responder: ActorId,
        kind: ResponseKind,
        slot: usize,
        advantage: Advantage,
    },
    SlotResolved {
        slot: usize,
        evaded: bool,
        advantage: Advantage,
        defender_damage: Damage,
        attacker_damage: Damage,
    },
    CombatantFell {
        actor: ActorId,
    },
    ResolutionAborted {
        remaining_slots: usize,
    },
    HandRecovered {
        actor: ActorId,
        amount: u8,
    },
    ConsumableUsed {
        actor: ActorId,
    },
    BattleEnded {
        result: BattleResult,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleEventLog {
    pub events: Vec<BattleEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn, event_type: BattleEventType) {
        self.events.push(BattleEvent { turn, event_type });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEventType> {
        self.events.iter().map(|e| &e.event_type)
    }

    /// Phases entered, in order
    pub fn phases(&self) -> Vec<BattlePhase> {
        self.iter()
            .filter_map(|e| match e {
                BattleEventType::PhaseEntered { phase } => Some(*phase),
                _ => None,
            })
            .collect()
    }
}
