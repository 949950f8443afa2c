//! Contracts for the collaborators that render and script a battle
//!
//! The combat core never draws anything. It asks the stage to play an
//! animation or a scripted event and paces itself by the returned duration.

use serde::{Deserialize, Serialize};

use crate::battle::outcome::BattleResult;
use crate::core::types::ActorId;

/// Points at which the controller hands off to scripted content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptTrigger {
    Title,
    Prologue,
    Victory,
    Defeat,
}

impl ScriptTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptTrigger::Title => "Title",
            ScriptTrigger::Prologue => "Prologue",
            ScriptTrigger::Victory => "Victory",
            ScriptTrigger::Defeat => "Defeat",
        }
    }
}

pub trait Animator {
    /// Play a single-actor animation; returns its duration in seconds
    fn play_animation(&mut self, actor: ActorId, name: &str) -> f32;

    /// Play an exchange led by `lead` against `other`; returns its duration
    fn play_attack_animation(&mut self, lead: ActorId, other: ActorId, name: &str) -> f32;
}

pub trait EventScripts {
    /// Play a scripted event; returns how long the controller should wait
    fn play_event_script(&mut self, trigger: ScriptTrigger) -> f32;

    /// Control returns to the owning scene
    fn on_battle_end(&mut self, _result: BattleResult) {}
}

/// Everything the controller needs from its host
pub trait Stage: Animator + EventScripts {}

impl<T: Animator + EventScripts> Stage for T {}

/// Headless stage with fixed durations
#[derive(Debug, Clone)]
pub struct NullStage {
    pub animation_seconds: f32,
    pub script_seconds: f32,
    pub result: Option<BattleResult>,
}

impl NullStage {
    pub fn new(animation_seconds: f32, script_seconds: f32) -> Self {
        Self {
            animation_seconds,
            script_seconds,
            result: None,
        }
    }

    /// Zero-length animations and scripts
    pub fn instant() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Default for NullStage {
    fn default() -> Self {
        Self::new(0.8, 1.0)
    }
}

impl Animator for NullStage {
    fn play_animation(&mut self, _actor: ActorId, _name: &str) -> f32 {
        self.animation_seconds
    }

    fn play_attack_animation(&mut self, _lead: ActorId, _other: ActorId, _name: &str) -> f32 {
        self.animation_seconds
    }
}

impl EventScripts for NullStage {
    fn play_event_script(&mut self, _trigger: ScriptTrigger) -> f32 {
        self.script_seconds
    }

    fn on_battle_end(&mut self, result: BattleResult) {
        self.result = Some(result);
    }
}
