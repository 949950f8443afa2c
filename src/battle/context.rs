//! Per-turn battle context
//!
//! Reset at `ChooseActor`, mutated through reservation, prediction and
//! resolution, read-only during results.

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, Side, Turn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleContext {
    pub turn: Turn,
    pub actor: Option<ActorId>,
    /// Current actor belongs to the intent-driven side
    pub actor_is_human: bool,
    pub target: Option<ActorId>,
    /// Side filling reservation slots this turn
    pub offense_side: Option<Side>,
    pub reveal_count: usize,
    /// The actor committed at least one reservation this turn
    pub acted: bool,
    /// Actor's remaining uses before this turn's planning began
    pub pre_turn_hand: [u8; 3],
}

impl BattleContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything except the turn counter
    pub fn reset(&mut self) {
        *self = Self {
            turn: self.turn,
            ..Self::default()
        };
    }

    pub fn defense_side(&self) -> Option<Side> {
        self.offense_side.map(Side::opposite)
    }
}
