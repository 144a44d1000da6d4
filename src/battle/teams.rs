//! Team rosters and the win condition
//!
//! Rosters are kept across rounds. Dead units stay listed until they are
//! revived at the next round start. Units only leave a roster when the
//! match is torn down.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Side, Tick, UnitId, Vec2};
use crate::events::{RoundOutcome, SimEvent};
use crate::navigation::TargetingGateway;
use crate::unit::{UnitMode, UnitStore};

/// Result of the win check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleStatus {
    Ongoing,
    Decided(RoundOutcome),
}

#[derive(Debug, Clone)]
pub struct Team {
    pub side: Side,
    roster: Vec<UnitId>,
    pub anchor: Option<Vec2>,
    pub cap: usize,
}

impl Team {
    pub fn new(side: Side, anchor: Option<Vec2>, cap: usize) -> Self {
        Self {
            side,
            roster: Vec::new(),
            anchor,
            cap,
        }
    }

    pub fn roster(&self) -> &[UnitId] {
        &self.roster
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.roster.len() >= self.cap
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.roster.contains(&unit)
    }
}

#[derive(Debug, Clone)]
pub struct TeamRegistry {
    player: Team,
    enemy: Team,
}

impl TeamRegistry {
    pub fn new(player_anchor: Option<Vec2>, enemy_anchor: Option<Vec2>, cap: usize) -> Self {
        Self {
            player: Team::new(Side::Player, player_anchor, cap),
            enemy: Team::new(Side::Enemy, enemy_anchor, cap),
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    pub fn roster(&self, side: Side) -> &[UnitId] {
        self.team(side).roster()
    }

    pub fn side_of(&self, unit: UnitId) -> Option<Side> {
        Side::ALL.into_iter().find(|side| self.team(*side).contains(unit))
    }

    /// Add a unit to a roster. A unit may only ever be on one.
    pub fn add_unit(&mut self, side: Side, unit: UnitId) -> Result<()> {
        if self.side_of(unit).is_some() {
            return Err(SimError::AlreadyRostered(unit));
        }
        let team = self.team_mut(side);
        if team.is_full() {
            return Err(SimError::RosterFull {
                side,
                cap: team.cap,
            });
        }
        team.roster.push(unit);
        Ok(())
    }

    /// Permanent removal, used by teardown only
    pub fn remove_unit(&mut self, unit: UnitId) -> Option<Side> {
        let side = self.side_of(unit)?;
        self.team_mut(side).roster.retain(|id| *id != unit);
        Some(side)
    }

    pub fn living_count(&self, side: Side, units: &UnitStore) -> usize {
        self.roster(side)
            .iter()
            .filter(|id| units.get(**id).is_some_and(|u| u.is_alive()))
            .count()
    }

    pub fn living_members(&self, side: Side, units: &UnitStore) -> Vec<UnitId> {
        self.roster(side)
            .iter()
            .copied()
            .filter(|id| units.get(*id).is_some_and(|u| u.is_alive()))
            .collect()
    }

    /// Bring every roster member back to full health in place
    pub fn revive_team(&self, side: Side, units: &mut UnitStore) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for &id in self.roster(side) {
            if let Some(unit) = units.get_mut(id) {
                unit.revive();
                events.push(SimEvent::UnitRevived { unit: id, side });
            }
        }
        events
    }

    /// Win check over a snapshot of living counts
    pub fn check_battle_status(&self, units: &UnitStore) -> BattleStatus {
        let players = self.living_count(Side::Player, units);
        let enemies = self.living_count(Side::Enemy, units);
        match (players, enemies) {
            (0, 0) => BattleStatus::Decided(RoundOutcome::MutualWipe),
            (0, _) => BattleStatus::Decided(RoundOutcome::Won(Side::Enemy)),
            (_, 0) => BattleStatus::Decided(RoundOutcome::Won(Side::Player)),
            _ => BattleStatus::Ongoing,
        }
    }

    /// Order every living member to walk toward `target`
    ///
    /// Each unit aims for its own point within `spread` of the target, or
    /// the target itself if sampling fails. Returns how many got a path.
    pub fn move_team_to(
        &self,
        side: Side,
        target: Vec2,
        spread: f32,
        units: &mut UnitStore,
        gateway: &mut TargetingGateway,
        rng: &mut dyn RngCore,
    ) -> usize {
        let mut moved = 0;
        for id in self.living_members(side, units) {
            let Some(unit) = units.get_mut(id) else { continue };
            if unit.controller.is_manual() {
                continue;
            }
            let destination = gateway
                .random_point_near(target, spread, rng)
                .unwrap_or(target);
            let Some(path) = gateway.path_to(unit.position, destination) else {
                continue;
            };
            unit.controller.transition(UnitMode::Scouting);
            if unit.controller.start_motion(path) {
                moved += 1;
            } else {
                unit.controller.transition(UnitMode::Idle);
            }
        }
        tracing::debug!(side = side.name(), moved, "Team ordered to advance");
        moved
    }

    /// Put surviving members into the victory celebration
    pub fn celebrate_victory(&self, side: Side, units: &mut UnitStore, now: Tick) {
        for id in self.living_members(side, units) {
            if let Some(unit) = units.get_mut(id) {
                unit.controller.transition(UnitMode::Victory { since: now });
            }
        }
    }

    /// Empty both rosters, returning the removed ids
    pub fn clear(&mut self) -> Vec<UnitId> {
        let mut removed = std::mem::take(&mut self.player.roster);
        removed.append(&mut self.enemy.roster);
        removed
    }
}
