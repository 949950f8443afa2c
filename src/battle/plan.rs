//! Reservation slots and predicted responses for one turn

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::judge::Outcome;
use crate::core::types::{ActorId, AttackKind, ResponseKind};

/// One reservation slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub attacker: ActorId,
    pub target: ActorId,
    pub kind: AttackKind,
    pub slot: usize,
    /// Shown to the defending side before it commits responses
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedResponse {
    pub responder: ActorId,
    pub kind: ResponseKind,
    pub slot: usize,
    /// Outcome as judged when the response was chosen
    pub outcome: Outcome,
}

/// Both queues for the current turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnPlan {
    capacity: usize,
    /// Slot indices whose content will be visible once filled
    visible_slots: Vec<usize>,
    actions: Vec<PlannedAction>,
    responses: Vec<PredictedResponse>,
}

impl TurnPlan {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Clear both queues for a new turn
    pub fn reset(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.visible_slots.clear();
        self.actions.clear();
        self.responses.clear();
    }

    /// Decide up front which slot indices will be visible
    pub fn set_visible_slots(&mut self, slots: Vec<usize>) {
        self.visible_slots = slots;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn actions(&self) -> &[PlannedAction] {
        &self.actions
    }

    pub fn responses(&self) -> &[PredictedResponse] {
        &self.responses
    }

    pub fn is_full(&self) -> bool {
        self.actions.len() >= self.capacity
    }

    pub fn remaining_slots(&self) -> usize {
        self.capacity.saturating_sub(self.actions.len())
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Append an action into the next slot; `None` when full
    pub fn push_action(&mut self, attacker: ActorId, target: ActorId, kind: AttackKind) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let slot = self.actions.len();
        self.actions.push(PlannedAction {
            attacker,
            target,
            kind,
            slot,
            visible: self.visible_slots.contains(&slot),
        });
        Some(slot)
    }

    /// Retarget every queued action (target re-selected mid-reservation)
    pub fn retarget(&mut self, target: ActorId) {
        for action in self.actions.iter_mut() {
            action.target = target;
        }
    }

    pub fn action(&self, slot: usize) -> Option<&PlannedAction> {
        self.actions.get(slot)
    }

    pub fn response_for(&self, slot: usize) -> Option<&PredictedResponse> {
        self.responses.iter().find(|r| r.slot == slot)
    }

    /// Record a response; rejects unknown or already-answered slots
    pub fn push_response(&mut self, response: PredictedResponse) -> bool {
        if response.slot >= self.actions.len() || self.response_for(response.slot).is_some() {
            return false;
        }
        self.responses.push(response);
        true
    }

    pub fn all_responded(&self) -> bool {
        self.actions
            .iter()
            .all(|a| self.response_for(a.slot).is_some())
    }

    pub fn visible_count(&self) -> usize {
        self.actions.iter().filter(|a| a.visible).count()
    }

    /// Once planning ends short of capacity, promote hidden slots at random
    /// until `reveal_count` of the filled slots are visible
    pub fn promote_visibility(&mut self, rng: &mut impl Rng, reveal_count: usize) {
        let target = reveal_count.min(self.actions.len());
        let missing = target.saturating_sub(self.visible_count());
        if missing == 0 {
            return;
        }

        let mut hidden: Vec<usize> = self
            .actions
            .iter()
            .filter(|a| !a.visible)
            .map(|a| a.slot)
            .collect();
        hidden.shuffle(rng);

        for slot in hidden.into_iter().take(missing) {
            self.actions[slot].visible = true;
        }
    }
}
