use thiserror::Error;

use crate::core::types::ActorId;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Actor not found: {0}")]
    UnknownActor(ActorId),

    #[error("Ready queue is empty")]
    ReadyQueueEmpty,

    #[error("No actor is taking a turn")]
    NoActor,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, BattleError>;
