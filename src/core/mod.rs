pub mod config;
pub mod error;
pub mod types;

pub use config::{BattleConfig, PolicyConfig, MAX_RESERVATION_SLOTS};
pub use error::{BattleError, Result};
pub use types::{ActorId, Advantage, AttackKind, ResponseKind, Side, SkillId, Turn};
