//! Domain events published during a match

use serde::{Deserialize, Serialize};

use crate::core::types::{Side, SkillType, Tick, UnitId, Vec2};

/// Outcome of a finished round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Won(Side),
    /// Both sides eliminated. Counts as a loss for the player.
    MutualWipe,
}

impl RoundOutcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            RoundOutcome::Won(side) => Some(*side),
            RoundOutcome::MutualWipe => None,
        }
    }

    pub fn player_won(&self) -> bool {
        matches!(self, RoundOutcome::Won(Side::Player))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    UnitSpawned {
        unit: UnitId,
        side: Side,
        name: String,
        position: Vec2,
    },
    UnitRevived {
        unit: UnitId,
        side: Side,
    },
    UnitDamaged {
        attacker: UnitId,
        victim: UnitId,
        amount: f32,
        remaining_health: f32,
    },
    UnitDeath {
        victim: UnitId,
        killer: Option<UnitId>,
    },
    UnitLeveledUp {
        unit: UnitId,
        old_level: u32,
        new_level: u32,
        skill_points: u32,
    },
    RoundStarted {
        round: u32,
        allies_target: usize,
        enemies_target: usize,
    },
    RoundCompleted {
        round: u32,
        outcome: RoundOutcome,
    },
    SkillAllocationStarted {
        round: u32,
        pending: usize,
    },
    SkillSelectionRequested {
        unit: UnitId,
        points: u32,
    },
    SkillPointAllocated {
        unit: UnitId,
        skill: SkillType,
        rank: u32,
    },
    SkillAllocationCompleted {
        round: u32,
    },
    GameOver {
        rounds_won: u32,
    },
    MatchRestarted,
}

/// Discriminant tag used to key subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    UnitSpawned,
    UnitRevived,
    UnitDamaged,
    UnitDeath,
    UnitLeveledUp,
    RoundStarted,
    RoundCompleted,
    SkillAllocationStarted,
    SkillSelectionRequested,
    SkillPointAllocated,
    SkillAllocationCompleted,
    GameOver,
    MatchRestarted,
}

impl EventKind {
    pub const ALL: [EventKind; 13] = [
        EventKind::UnitSpawned,
        EventKind::UnitRevived,
        EventKind::UnitDamaged,
        EventKind::UnitDeath,
        EventKind::UnitLeveledUp,
        EventKind::RoundStarted,
        EventKind::RoundCompleted,
        EventKind::SkillAllocationStarted,
        EventKind::SkillSelectionRequested,
        EventKind::SkillPointAllocated,
        EventKind::SkillAllocationCompleted,
        EventKind::GameOver,
        EventKind::MatchRestarted,
    ];
}

impl SimEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SimEvent::UnitSpawned { .. } => EventKind::UnitSpawned,
            SimEvent::UnitRevived { .. } => EventKind::UnitRevived,
            SimEvent::UnitDamaged { .. } => EventKind::UnitDamaged,
            SimEvent::UnitDeath { .. } => EventKind::UnitDeath,
            SimEvent::UnitLeveledUp { .. } => EventKind::UnitLeveledUp,
            SimEvent::RoundStarted { .. } => EventKind::RoundStarted,
            SimEvent::RoundCompleted { .. } => EventKind::RoundCompleted,
            SimEvent::SkillAllocationStarted { .. } => EventKind::SkillAllocationStarted,
            SimEvent::SkillSelectionRequested { .. } => EventKind::SkillSelectionRequested,
            SimEvent::SkillPointAllocated { .. } => EventKind::SkillPointAllocated,
            SimEvent::SkillAllocationCompleted { .. } => EventKind::SkillAllocationCompleted,
            SimEvent::GameOver { .. } => EventKind::GameOver,
            SimEvent::MatchRestarted => EventKind::MatchRestarted,
        }
    }
}

/// Tick-stamped record of a published event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleLogEntry {
    pub tick: Tick,
    pub event: SimEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let event = SimEvent::UnitDeath {
            victim: UnitId(4),
            killer: None,
        };
        assert_eq!(event.kind(), EventKind::UnitDeath);
        assert_eq!(SimEvent::MatchRestarted.kind(), EventKind::MatchRestarted);
    }

    #[test]
    fn test_mutual_wipe_has_no_winner() {
        assert_eq!(RoundOutcome::MutualWipe.winner(), None);
        assert!(!RoundOutcome::MutualWipe.player_won());
        assert!(RoundOutcome::Won(Side::Player).player_won());
        assert!(!RoundOutcome::Won(Side::Enemy).player_won());
    }
}
