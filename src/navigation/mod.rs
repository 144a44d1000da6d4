//! Pathfinding contract and reference implementation

pub mod gateway;
pub mod grid;
pub mod pathfinder;

pub use gateway::TargetingGateway;
pub use grid::GridPathfinder;
pub use pathfinder::{OpenField, Pathfinder};
