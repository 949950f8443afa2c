//! Active-time gauge scheduler
//!
//! Each living combatant accumulates `speed * scale * dt` per tick. Crossing the
//! threshold wraps the gauge and pushes the actor onto a FIFO ready queue; one
//! tick can queue the same actor more than once. While an actor has a queued
//! turn that was not yet released, its fill ratio is latched at 1.0.

use std::collections::VecDeque;

use ahash::AHashMap;

use crate::combat::roster::Roster;
use crate::core::error::{BattleError, Result};
use crate::core::types::ActorId;

/// Threshold used when the requested one is zero, negative or not finite
pub const DEFAULT_THRESHOLD: f32 = 100.0;

#[derive(Debug, Clone)]
pub struct GaugeScheduler {
    threshold: f32,
    scale: f32,
    gauges: AHashMap<ActorId, f32>,
    latched: AHashMap<ActorId, u32>,
    ready: VecDeque<ActorId>,
}

impl GaugeScheduler {
    /// Build from the live roster so an average-speed combatant fills its gauge
    /// in `target_seconds`. A non-positive threshold falls back to
    /// `DEFAULT_THRESHOLD`.
    pub fn new(roster: &Roster, threshold: f32, target_seconds: f32) -> Self {
        let threshold = if threshold > 0.0 && threshold.is_finite() {
            threshold
        } else {
            tracing::warn!("gauge threshold {} is unusable, using {}", threshold, DEFAULT_THRESHOLD);
            DEFAULT_THRESHOLD
        };
        let average = roster.average_speed();
        let scale = if average > 0.0 && target_seconds > 0.0 {
            threshold / (average * target_seconds)
        } else {
            0.0
        };

        let gauges = roster.iter().map(|c| (c.id, 0.0)).collect();

        Self {
            threshold,
            scale,
            gauges,
            latched: AHashMap::new(),
            ready: VecDeque::new(),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Advance every living combatant's gauge
    pub fn tick(&mut self, delta_time: f32, roster: &Roster) {
        if delta_time <= 0.0 {
            return;
        }

        for combatant in roster.iter() {
            if combatant.is_dead() {
                continue;
            }

            let gauge = self.gauges.entry(combatant.id).or_insert(0.0);
            *gauge += combatant.stats.speed.max(0.0) * self.scale * delta_time;

            while *gauge >= self.threshold {
                *gauge -= self.threshold;
                self.ready.push_back(combatant.id);
                *self.latched.entry(combatant.id).or_insert(0) += 1;
                tracing::debug!("{} is ready", combatant.id);
            }
        }
    }

    /// Next ready actor
    pub fn pop(&mut self) -> Result<ActorId> {
        self.ready.pop_front().ok_or(BattleError::ReadyQueueEmpty)
    }

    pub fn has_ready(&self) -> bool {
        !self.ready.is_empty()
    }

    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Fill in [0, 1]; pinned at 1.0 while a ready turn is unreleased
    pub fn fill_ratio(&self, id: ActorId, roster: &Roster) -> f32 {
        if !roster.is_alive(id) {
            return 0.0;
        }
        if self.latched.get(&id).copied().unwrap_or(0) > 0 {
            return 1.0;
        }
        let gauge = self.gauges.get(&id).copied().unwrap_or(0.0);
        (gauge / self.threshold).clamp(0.0, 1.0)
    }

    /// Release one latched turn after it was popped and played
    pub fn release(&mut self, id: ActorId) {
        if let Some(count) = self.latched.get_mut(&id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.latched.remove(&id);
            }
        }
    }

    /// Consume one latched turn without popping: releases the latch and drops
    /// one matching ready-queue entry if present
    pub fn consume_latch(&mut self, id: ActorId) {
        self.release(id);
        if let Some(pos) = self.ready.iter().position(|&r| r == id) {
            self.ready.remove(pos);
        }
    }
}
