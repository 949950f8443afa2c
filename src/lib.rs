//! Duel ATB - active-time battle engine with hidden reservation/prediction duels

pub mod battle;
pub mod combat;
pub mod core;
pub mod stage;
