//! Battle phases and transition steps

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    StartOfBattle,
    PrologueScript,
    StartOfTurn,
    ChooseActor,
    Reservation,
    ReservationSelectTarget,
    ReservationSelectAttack,
    Prediction,
    PredictionSelectAttack,
    PredictionConfirm,
    Resolution,
    Results,
    EndTurn,
    EndBattle,
    /// Harness-only parking state
    Test,
}

impl BattlePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, BattlePhase::EndBattle)
    }

    /// Phases that wait on submitted intents
    pub fn awaits_intent(self) -> bool {
        matches!(
            self,
            BattlePhase::ReservationSelectTarget
                | BattlePhase::ReservationSelectAttack
                | BattlePhase::PredictionSelectAttack
                | BattlePhase::PredictionConfirm
                | BattlePhase::Resolution
                | BattlePhase::Test
        )
    }
}

/// What a phase procedure asks the controller to do next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Remain in the current phase
    Stay,
    /// Enter `phase` immediately
    Go(BattlePhase),
    /// Enter `phase` after `seconds`, parking the controller meanwhile
    After { seconds: f32, phase: BattlePhase },
}

/// Pending transition scheduled by `Step::After`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayedTransition {
    pub remaining: f32,
    pub phase: BattlePhase,
}

impl DelayedTransition {
    pub fn new(seconds: f32, phase: BattlePhase) -> Self {
        Self {
            remaining: seconds.max(0.0),
            phase,
        }
    }

    /// Count down; returns the target phase once elapsed
    pub fn advance(&mut self, delta_time: f32) -> Option<BattlePhase> {
        self.remaining -= delta_time;
        (self.remaining <= 0.0).then_some(self.phase)
    }
}
