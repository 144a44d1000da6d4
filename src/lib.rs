//! Squadfall - Round-Based Auto-Battler Simulation Core

pub mod battle;
pub mod core;
pub mod events;
pub mod navigation;
pub mod progression;
pub mod unit;
