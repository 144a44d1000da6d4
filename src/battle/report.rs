//! Serializable snapshot of a match for post-match analysis

use serde::{Deserialize, Serialize};

use crate::battle::rounds::RoundStatus;
use crate::battle::simulation::Battle;
use crate::core::types::{Side, UnitId};
use crate::unit::SkillRanks;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSummary {
    pub id: UnitId,
    pub side: Side,
    pub name: String,
    pub alive: bool,
    pub level: u32,
    pub experience: u32,
    pub skill_points: u32,
    pub ranks: SkillRanks,
    pub health: f32,
    pub max_health: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub round: u32,
    pub round_status: RoundStatus,
    pub rounds_won: u32,
    pub game_over: bool,
    pub ticks: u64,
    pub elapsed_seconds: f32,
    pub events_logged: usize,
    pub experience_awarded: u64,
    pub units: Vec<UnitSummary>,
}

impl MatchSummary {
    pub fn capture(battle: &Battle) -> Self {
        let units = battle
            .units()
            .iter()
            .map(|unit| UnitSummary {
                id: unit.id,
                side: unit.side,
                name: unit.name.clone(),
                alive: unit.is_alive(),
                level: unit.state.level,
                experience: unit.state.experience,
                skill_points: unit.state.skill_points,
                ranks: unit.state.ranks,
                health: unit.state.health,
                max_health: unit.state.max_health,
            })
            .collect();

        Self {
            round: battle.round_number(),
            round_status: battle.round_status(),
            rounds_won: battle.rounds_won(),
            game_over: battle.is_game_over(),
            ticks: battle.now(),
            elapsed_seconds: battle.elapsed_seconds(),
            events_logged: battle.log().len(),
            experience_awarded: battle.progression().total_awarded(),
            units,
        }
    }

    /// Living units per side
    pub fn living(&self, side: Side) -> usize {
        self.units.iter().filter(|u| u.side == side && u.alive).count()
    }
}
