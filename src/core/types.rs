//! Core type definitions used throughout the codebase

use std::fmt;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Simulation tick counter (logical time unit)
pub type Tick = u64;

/// Deterministic RNG shared by every stochastic decision in a match
pub type SimRng = ChaCha8Rng;

/// Unique identifier for units
///
/// Ids are handed out sequentially and never reused within a match, so
/// ordering by id is ordering by spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Team affiliation. Fixed for the lifetime of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Player, Side::Enemy];

    pub fn opponent(&self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Side::Player => "Player",
            Side::Enemy => "Enemy",
        }
    }
}

/// Who spends a side's skill points between rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Points are queued for an external selection UI
    #[default]
    Manual,
    /// Points are spent immediately on random ranks
    Auto,
}

/// Upgradeable stat tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillType {
    Health,
    Damage,
    Defense,
    Speed,
}

impl SkillType {
    pub const ALL: [SkillType; 4] = [
        SkillType::Health,
        SkillType::Damage,
        SkillType::Defense,
        SkillType::Speed,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_id_ordering_follows_spawn_order() {
        let first = UnitId(1);
        let second = UnitId(2);
        assert!(first < second);
        assert_eq!(first.to_string(), "#1");
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Player.opponent(), Side::Enemy);
        assert_eq!(Side::Enemy.opponent(), Side::Player);
    }

    #[test]
    fn test_control_mode_parses_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: ControlMode,
        }
        let parsed: Wrapper = toml::from_str("mode = \"auto\"").unwrap();
        assert_eq!(parsed.mode, ControlMode::Auto);
    }
}
