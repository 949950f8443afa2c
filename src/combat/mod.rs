//! Combat primitives: stat blocks, the outcome judge, reveal odds and damage
//!
//! Everything here is pure or owns plain data. Sequencing lives in `battle`.

pub mod buffs;
pub mod combatant;
pub mod damage;
pub mod judge;
pub mod reveal;
pub mod roster;
pub mod skills;

pub use buffs::{Buff, BuffKind, BuffTable, Expiry};
pub use combatant::{Combatant, Hand, Health, Stats};
pub use damage::{base_residual, compute_damage, Damage};
pub use judge::{evade_advantage, Outcome, OutcomeJudge};
pub use reveal::{choose_visible_slots, insight_ratio, reveal, reveal_against};
pub use roster::Roster;
pub use skills::{SkillBook, SkillDef, SkillProfile, SkillRepository};
