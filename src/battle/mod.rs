//! Battle system - ATB turns with hidden reservation/prediction duels
//!
//! Flow per turn:
//! gauge ready -> reservation (offense) -> prediction (defense) -> resolution -> results
//!
//! The controller owns all mutable battle state. Combat math lives in
//! `combat`; this module sequences it.

pub mod ai;
pub mod context;
pub mod controller;
pub mod events;
pub mod gauge;
pub mod intent;
pub mod outcome;
pub mod phase;
pub mod plan;
pub mod sequencer;

// Re-exports for convenient access
pub use ai::{OffensePlan, OpponentPolicy, WeightedPolicy};
pub use context::BattleContext;
pub use controller::{BattleController, Consumable};
pub use events::{BattleEvent, BattleEventLog, BattleEventType};
pub use gauge::GaugeScheduler;
pub use intent::{Intent, IntentQueue};
pub use outcome::{check_battle_end, BattleResult};
pub use phase::{BattlePhase, DelayedTransition, Step};
pub use plan::{PlannedAction, PredictedResponse, TurnPlan};
pub use sequencer::{apply_resolution, resolve_slot, PlaybackEnv, Sequencer, SlotResolution};
