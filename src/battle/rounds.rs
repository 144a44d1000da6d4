//! Round counter, round status and escalating team sizes

use serde::{Deserialize, Serialize};

use crate::core::config::{EscalationConfig, TeamsConfig};
use crate::core::types::Side;
use crate::events::RoundOutcome;

/// Lifecycle of one round
///
/// `Resolving` covers the short window between the elimination being
/// detected and `RoundCompleted` being published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    Pending,
    Active,
    Resolving,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    pub status: RoundStatus,
}

/// Extra units a side gets in `round` on top of its base count
pub fn additional_units(round: u32, offset: u32, cadence: u32) -> usize {
    ((round + offset) / cadence.max(1)) as usize
}

/// Target roster size for one side
pub fn team_target(round: u32, base: usize, offset: u32, cadence: u32, cap: usize) -> usize {
    (base + additional_units(round, offset, cadence)).min(cap)
}

#[derive(Debug, Clone)]
pub struct RoundScheduler {
    round: Round,
    rounds_won: u32,
    escalation: EscalationConfig,
    ally_base: usize,
    enemy_base: usize,
    cap: usize,
}

impl RoundScheduler {
    pub fn new(teams: &TeamsConfig, escalation: &EscalationConfig) -> Self {
        Self {
            round: Round {
                number: 0,
                status: RoundStatus::Pending,
            },
            rounds_won: 0,
            escalation: escalation.clone(),
            ally_base: teams.base_count(Side::Player),
            enemy_base: teams.base_count(Side::Enemy),
            cap: teams.max_team_size,
        }
    }

    pub fn current(&self) -> Round {
        self.round
    }

    pub fn number(&self) -> u32 {
        self.round.number
    }

    pub fn status(&self) -> RoundStatus {
        self.round.status
    }

    pub fn rounds_won(&self) -> u32 {
        self.rounds_won
    }

    /// `(allies, enemies)` targets for `round`
    pub fn targets(&self, round: u32) -> (usize, usize) {
        (self.target(Side::Player, round), self.target(Side::Enemy, round))
    }

    pub fn target(&self, side: Side, round: u32) -> usize {
        let (base, offset) = match side {
            Side::Player => (self.ally_base, self.escalation.ally_offset),
            Side::Enemy => (self.enemy_base, self.escalation.enemy_offset),
        };
        team_target(round, base, offset, self.escalation.cadence, self.cap)
    }

    /// Number of the round that will start next
    pub fn next_number(&self) -> u32 {
        match self.round.status {
            RoundStatus::Pending if self.round.number > 0 => self.round.number,
            _ => self.round.number + 1,
        }
    }

    /// Mark the next round as scheduled
    pub fn schedule_next(&mut self) -> u32 {
        let number = self.next_number();
        self.round = Round {
            number,
            status: RoundStatus::Pending,
        };
        number
    }

    pub fn activate(&mut self, number: u32) {
        self.round = Round {
            number,
            status: RoundStatus::Active,
        };
    }

    /// Move an active round into `Resolving`. Only the first call succeeds.
    pub fn begin_resolving(&mut self) -> bool {
        if self.round.status != RoundStatus::Active {
            return false;
        }
        self.round.status = RoundStatus::Resolving;
        true
    }

    /// Finish a resolving round. Returns its number the first time only.
    pub fn complete(&mut self, outcome: RoundOutcome) -> Option<u32> {
        if self.round.status != RoundStatus::Resolving {
            return None;
        }
        self.round.status = RoundStatus::Completed;
        if outcome.player_won() {
            self.rounds_won += 1;
        }
        Some(self.round.number)
    }

    /// Back to before round 1
    pub fn reset(&mut self) {
        self.round = Round {
            number: 0,
            status: RoundStatus::Pending,
        };
        self.rounds_won = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> RoundScheduler {
        RoundScheduler::new(&TeamsConfig::default(), &EscalationConfig::default())
    }

    #[test]
    fn test_default_escalation_alternates_sides() {
        let s = scheduler();
        assert_eq!(s.targets(1), (3, 3));
        assert_eq!(s.targets(2), (4, 3));
        assert_eq!(s.targets(4), (4, 4));
        assert_eq!(s.targets(6), (5, 4));
        assert_eq!(s.targets(8), (5, 5));
    }

    #[test]
    fn test_targets_capped() {
        let s = scheduler();
        assert_eq!(s.targets(1000), (12, 12));
    }

    #[test]
    fn test_round_lifecycle_guards() {
        let mut s = scheduler();
        assert_eq!(s.schedule_next(), 1);
        assert_eq!(s.status(), RoundStatus::Pending);
        s.activate(1);

        assert!(s.begin_resolving());
        assert!(!s.begin_resolving());
        assert_eq!(s.complete(RoundOutcome::Won(Side::Player)), Some(1));
        assert_eq!(s.complete(RoundOutcome::Won(Side::Player)), None);
        assert_eq!(s.rounds_won(), 1);

        assert_eq!(s.schedule_next(), 2);
        assert_eq!(s.schedule_next(), 2);
    }

    #[test]
    fn test_losses_do_not_count_as_wins() {
        let mut s = scheduler();
        s.activate(1);
        s.begin_resolving();
        s.complete(RoundOutcome::MutualWipe);
        assert_eq!(s.rounds_won(), 0);

        s.reset();
        assert_eq!(s.next_number(), 1);
    }
}
