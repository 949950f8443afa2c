//! Actor id to combatant mapping
//!
//! Ordered by id so every iteration (gauge ticks, AI target lists) is
//! reproducible for a given seed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combat::combatant::Combatant;
use crate::core::error::{BattleError, Result};
use crate::core::types::{ActorId, Side};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    members: BTreeMap<ActorId, Combatant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_combatants(combatants: impl IntoIterator<Item = Combatant>) -> Self {
        let mut roster = Self::new();
        for combatant in combatants {
            roster.insert(combatant);
        }
        roster
    }

    /// Insert or replace a combatant
    pub fn insert(&mut self, combatant: Combatant) -> Option<Combatant> {
        self.members.insert(combatant.id, combatant)
    }

    pub fn get(&self, id: ActorId) -> Option<&Combatant> {
        self.members.get(&id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Combatant> {
        self.members.get_mut(&id)
    }

    pub fn require(&self, id: ActorId) -> Result<&Combatant> {
        self.get(id).ok_or(BattleError::UnknownActor(id))
    }

    pub fn require_mut(&mut self, id: ActorId) -> Result<&mut Combatant> {
        self.get_mut(id).ok_or(BattleError::UnknownActor(id))
    }

    /// Mutable access to two distinct combatants at once
    pub fn pair_mut(&mut self, a: ActorId, b: ActorId) -> Option<(&mut Combatant, &mut Combatant)> {
        if a == b {
            return None;
        }
        let mut first = None;
        let mut second = None;
        for (id, combatant) in self.members.iter_mut() {
            if *id == a {
                first = Some(combatant);
            } else if *id == b {
                second = Some(combatant);
            }
        }
        Some((first?, second?))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.members.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.members.values_mut()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_alive(&self, id: ActorId) -> bool {
        self.get(id).is_some_and(Combatant::is_alive)
    }

    pub fn living(&self, side: Side) -> impl Iterator<Item = &Combatant> {
        self.iter().filter(move |c| c.side == side && c.is_alive())
    }

    pub fn living_ids(&self, side: Side) -> Vec<ActorId> {
        self.living(side).map(|c| c.id).collect()
    }

    pub fn any_alive(&self, side: Side) -> bool {
        self.living(side).next().is_some()
    }

    /// Valid target for `attacker`: alive and on the opposite side
    pub fn is_valid_target(&self, attacker: ActorId, target: ActorId) -> bool {
        match (self.get(attacker), self.get(target)) {
            (Some(a), Some(t)) => a.side != t.side && t.is_alive(),
            _ => false,
        }
    }

    /// Mean speed of all living combatants
    pub fn average_speed(&self) -> f32 {
        let speeds: Vec<f32> = self
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| c.stats.speed)
            .collect();
        if speeds.is_empty() {
            return 0.0;
        }
        speeds.iter().sum::<f32>() / speeds.len() as f32
    }
}
