//! Skill repository injected into the combat core
//!
//! The core never mutates skills; it aggregates a combatant's skills into a
//! `SkillProfile` whenever the judge, damage formula, or recovery pass needs one.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::combatant::Combatant;
use crate::core::types::SkillId;

/// Static definition of a skill
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillDef {
    pub name: String,
    /// Percentage added to both damage tiers
    #[serde(default)]
    pub damage_bonus_percent: f32,
    /// Extra remaining uses granted per kind by hand recovery
    #[serde(default)]
    pub recovery_bonus: u8,
    /// Evade against this attacker is impossible (Thrust only halved)
    #[serde(default)]
    pub unavoidable: bool,
    /// Fatal damage is raised to at least the residual damage
    #[serde(default)]
    pub critical_conversion: bool,
}

/// Read-only lookup of skills by id
pub trait SkillRepository {
    fn skill(&self, id: SkillId) -> Option<&SkillDef>;
}

/// In-memory repository
#[derive(Debug, Clone, Default)]
pub struct SkillBook {
    skills: AHashMap<SkillId, SkillDef>,
}

impl SkillBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: SkillId, def: SkillDef) {
        self.skills.insert(id, def);
    }

    pub fn with(mut self, id: SkillId, def: SkillDef) -> Self {
        self.insert(id, def);
        self
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl SkillRepository for SkillBook {
    fn skill(&self, id: SkillId) -> Option<&SkillDef> {
        self.skills.get(&id)
    }
}

/// Aggregated effect of all skills a combatant holds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkillProfile {
    pub damage_bonus_percent: f32,
    pub recovery_bonus: u8,
    pub unavoidable: bool,
    pub critical_conversion: bool,
}

impl SkillProfile {
    /// Unknown skill ids are skipped
    pub fn of(combatant: &Combatant, repo: &dyn SkillRepository) -> Self {
        combatant
            .skills
            .iter()
            .filter_map(|id| repo.skill(*id))
            .fold(Self::default(), |mut acc, def| {
                acc.damage_bonus_percent += def.damage_bonus_percent;
                acc.recovery_bonus = acc.recovery_bonus.saturating_add(def.recovery_bonus);
                acc.unavoidable |= def.unavoidable;
                acc.critical_conversion |= def.critical_conversion;
                acc
            })
    }

    /// Multiplier applied to damage
    pub fn damage_multiplier(&self) -> f32 {
        (1.0 + self.damage_bonus_percent / 100.0).max(0.0)
    }
}
