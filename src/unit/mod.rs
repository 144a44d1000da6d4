//! Combat units: identity, stats, state machine and combat rules

pub mod combat;
pub mod config;
pub mod controller;
pub mod names;
pub mod state;
pub mod stats;

use std::collections::BTreeMap;

use crate::core::types::{Side, UnitId, Vec2};
use crate::unit::combat::TargetView;

pub use config::UnitConfig;
pub use controller::{Engagement, UnitController, UnitMode};
pub use state::{BattleStats, LevelChange, SkillRanks, UnitState};

#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub side: Side,
    pub name: String,
    pub position: Vec2,
    /// Unit-length heading on the ground plane
    pub facing: Vec2,
    pub config: UnitConfig,
    pub state: UnitState,
    pub controller: UnitController,
}

impl Unit {
    pub fn new(id: UnitId, side: Side, name: String, position: Vec2, config: UnitConfig) -> Self {
        let state = UnitState::new(&config);
        let facing = match side {
            Side::Player => Vec2::X,
            Side::Enemy => Vec2::NEG_X,
        };
        Self {
            id,
            side,
            name,
            position,
            facing,
            config,
            state,
            controller: UnitController::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive() && !self.controller.is_dead()
    }

    /// Full health and a fresh controller, in place
    pub fn revive(&mut self) {
        self.state.restore_full_health();
        self.controller.revive();
    }

    pub fn view(&self) -> TargetView {
        TargetView {
            id: self.id,
            side: self.side,
            position: self.position,
            alive: self.is_alive(),
        }
    }
}

/// Owner of every live unit record, iterated in id order
#[derive(Debug, Default)]
pub struct UnitStore {
    units: BTreeMap<UnitId, Unit>,
    next_id: u32,
}

impl UnitStore {
    pub fn new() -> Self {
        Self {
            units: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Reserve the next id. Ids are never reused within a match.
    pub fn allocate_id(&mut self) -> UnitId {
        let id = UnitId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        id
    }

    pub fn insert(&mut self, unit: Unit) {
        self.units.insert(unit.id, unit);
    }

    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }

    pub fn views(&self) -> Vec<TargetView> {
        self.units.values().map(Unit::view).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Remove every unit. The id counter keeps counting.
    pub fn clear(&mut self) -> Vec<Unit> {
        std::mem::take(&mut self.units).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(store: &mut UnitStore, side: Side) -> UnitId {
        let id = store.allocate_id();
        store.insert(Unit::new(id, side, format!("u{}", id.0), Vec2::ZERO, UnitConfig::default()));
        id
    }

    #[test]
    fn test_ids_are_sequential_and_not_reused() {
        let mut store = UnitStore::new();
        let a = unit(&mut store, Side::Player);
        let b = unit(&mut store, Side::Enemy);
        assert_eq!((a, b), (UnitId(1), UnitId(2)));

        store.clear();
        assert_eq!(unit(&mut store, Side::Player), UnitId(3));
    }

    #[test]
    fn test_iteration_in_id_order() {
        let mut store = UnitStore::new();
        for _ in 0..5 {
            unit(&mut store, Side::Enemy);
        }
        let ids: Vec<u32> = store.iter().map(|u| u.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_revive_restores_in_place() {
        let mut store = UnitStore::new();
        let id = unit(&mut store, Side::Player);
        let u = store.get_mut(id).unwrap();
        u.position = Vec2::new(3.0, 4.0);
        u.state.apply_damage(1000.0);
        u.controller.transition(UnitMode::Dead);
        assert!(!u.is_alive());

        u.revive();
        assert!(u.is_alive());
        assert_eq!(u.state.health, u.state.max_health);
        assert_eq!(u.position, Vec2::new(3.0, 4.0));
        assert_eq!(u.controller.mode(), UnitMode::Idle);
    }
}
