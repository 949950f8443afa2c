//! Battle configuration with documented constants
//!
//! Every tunable of the scheduler, the reveal/judge pipeline, the playback
//! pacing and the opponent policy lives here. Values can be loaded from TOML;
//! missing keys fall back to the defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{BattleError, Result};
use crate::core::types::Side;

/// Hard cap on reservation slots per turn
pub const MAX_RESERVATION_SLOTS: usize = 4;

/// Weights used by the weighted-random opponent policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Multiplier for the attack kind the attacker holds the most of
    pub abundance_boost: f32,

    /// Multiplier for a kind that would extend a repeat streak
    pub repeat_penalty: f32,

    /// Number of identical trailing picks that triggers the repeat penalty
    pub streak_window: usize,

    /// Offense planning stops before total remaining uses would drop below this
    ///
    /// Keeps counters in hand for the upcoming defense phase.
    pub reserve_floor: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            abundance_boost: 1.4,
            repeat_penalty: 0.35,
            streak_window: 2,
            reserve_floor: 3,
        }
    }
}

/// Configuration for one battle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    // === GAUGE ===
    /// Value a gauge must reach to make its owner ready
    pub gauge_threshold: f32,

    /// Seconds a combatant of party-average speed needs to fill its gauge
    pub gauge_target_seconds: f32,

    // === RESERVATION ===
    /// Reservation slots per turn (capped at `MAX_RESERVATION_SLOTS`)
    pub max_reservations: usize,

    // === JUDGE ===
    /// Evade rate lost per prior successful evade this turn
    /// (only for defenders without Thrust uses left)
    pub evade_fatigue_step: f32,

    // === PLAYBACK ===
    /// Pause after damage is applied, before the next slot
    pub resolution_beat_seconds: f32,

    /// Fast-forward multiplier for every animation wait
    pub playback_speed: f32,

    // === RECOVERY ===
    /// Residual damage healed on every living combatant at end of turn
    pub residual_recovery_per_turn: u32,

    // === CONTROL ===
    /// Side driven by submitted intents; `None` runs AI against AI
    pub human_side: Option<Side>,

    /// Allow the test/bypass intent to force phase transitions
    pub allow_bypass: bool,

    /// Seed for the battle RNG
    pub seed: u64,

    pub policy: PolicyConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            gauge_threshold: 100.0,
            gauge_target_seconds: 3.0,
            max_reservations: MAX_RESERVATION_SLOTS,
            evade_fatigue_step: 0.1,
            resolution_beat_seconds: 0.5,
            playback_speed: 1.0,
            residual_recovery_per_turn: 0,
            human_side: Some(Side::Ally),
            allow_bypass: false,
            seed: 42,
            policy: PolicyConfig::default(),
        }
    }
}

impl BattleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Config for headless AI-vs-AI battles
    pub fn ai_vs_ai(seed: u64) -> Self {
        Self {
            human_side: None,
            seed,
            ..Self::default()
        }
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Reservation slots actually available this battle
    pub fn reservation_slots(&self) -> usize {
        self.max_reservations.min(MAX_RESERVATION_SLOTS)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.gauge_threshold <= 0.0 {
            return Err(BattleError::InvalidConfig(format!(
                "gauge_threshold ({}) must be positive",
                self.gauge_threshold
            )));
        }

        if self.gauge_target_seconds <= 0.0 {
            return Err(BattleError::InvalidConfig(format!(
                "gauge_target_seconds ({}) must be positive",
                self.gauge_target_seconds
            )));
        }

        if !(1..=MAX_RESERVATION_SLOTS).contains(&self.max_reservations) {
            return Err(BattleError::InvalidConfig(format!(
                "max_reservations ({}) must be within 1..={}",
                self.max_reservations, MAX_RESERVATION_SLOTS
            )));
        }

        if self.playback_speed <= 0.0 {
            return Err(BattleError::InvalidConfig(format!(
                "playback_speed ({}) must be positive",
                self.playback_speed
            )));
        }

        if self.resolution_beat_seconds < 0.0 || self.evade_fatigue_step < 0.0 {
            return Err(BattleError::InvalidConfig(
                "durations and fatigue step must not be negative".into(),
            ));
        }

        let policy = &self.policy;
        if policy.abundance_boost < 0.0 || policy.repeat_penalty < 0.0 {
            return Err(BattleError::InvalidConfig(
                "policy multipliers must not be negative".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BattleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = BattleConfig::from_toml_str(
            r#"
            seed = 7
            max_reservations = 3

            [policy]
            reserve_floor = 2
            "#,
        )
        .expect("Should parse partial config");

        assert_eq!(config.seed, 7);
        assert_eq!(config.reservation_slots(), 3);
        assert_eq!(config.policy.reserve_floor, 2);
        assert_eq!(config.policy.streak_window, 2);
        assert_eq!(config.gauge_threshold, 100.0);
    }

    #[test]
    fn test_rejects_too_many_slots() {
        let result = BattleConfig::from_toml_str("max_reservations = 5");
        assert!(matches!(result, Err(BattleError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = BattleConfig::from_toml_str("seed = \"twelve\"");
        assert!(matches!(result, Err(BattleError::ConfigParse(_))));
    }

    #[test]
    fn test_human_side_parses() {
        let config = BattleConfig::from_toml_str(r#"human_side = "Enemy""#).unwrap();
        assert_eq!(config.human_side, Some(Side::Enemy));
    }
}
