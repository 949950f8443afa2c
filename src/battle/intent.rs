//! Intents submitted by the input collaborator
//!
//! A closed set; the controller dispatches on (phase, intent) and ignores
//! anything that does not fit the current phase.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::battle::phase::BattlePhase;
use crate::core::types::{ActorId, AttackKind, ResponseKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Tap a combatant to select it as target
    TapTarget(ActorId),
    /// Queue an attack into the next free reservation slot
    ReserveAttack(AttackKind),
    /// Answer the queued attack in `slot`
    ChooseResponse { slot: usize, response: ResponseKind },
    /// Generic confirm
    Confirm,
    /// Posted by the resolution sequencer when playback finishes
    ResolutionComplete,
    /// Harness intent: force a transition into `phase`
    Bypass(BattlePhase),
}

/// FIFO of submitted intents, drained once per tick
#[derive(Debug, Clone, Default)]
pub struct IntentQueue {
    pending: VecDeque<Intent>,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, intent: Intent) {
        self.pending.push_back(intent);
    }

    /// Take everything queued so far; intents pushed while the batch is
    /// handled wait for the next drain
    pub fn drain(&mut self) -> Vec<Intent> {
        self.pending.drain(..).collect()
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
