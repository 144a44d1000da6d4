//! Experience accrual from combat events
//!
//! Damage and kills grant experience to the attacker, scaled by the
//! victim's level. Level changes hand out (or revoke) skill points and
//! are announced as `UnitLeveledUp`.

use crate::core::error::{Result, SimError};
use crate::core::types::UnitId;
use crate::events::SimEvent;
use crate::unit::state::LevelChange;
use crate::unit::{stats, UnitStore};

#[derive(Debug, Default, Clone)]
pub struct ProgressionService {
    total_awarded: u64,
}

impl ProgressionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Experience handed out over the service lifetime
    pub fn total_awarded(&self) -> u64 {
        self.total_awarded
    }

    /// React to one published event. Returns follow-up events.
    pub fn handle(&mut self, units: &mut UnitStore, event: &SimEvent) -> Vec<SimEvent> {
        let award = match event {
            SimEvent::UnitDamaged {
                attacker,
                victim,
                amount,
                ..
            } => self.damage_award(units, *attacker, *victim, *amount),
            SimEvent::UnitDeath {
                victim,
                killer: Some(killer),
            } => self.kill_award(units, *killer, *victim),
            _ => None,
        };

        award
            .and_then(|(unit, xp)| self.grant(units, unit, xp).ok().flatten())
            .into_iter()
            .collect()
    }

    fn damage_award(
        &self,
        units: &UnitStore,
        attacker: UnitId,
        victim: UnitId,
        amount: f32,
    ) -> Option<(UnitId, u32)> {
        let victim_level = units.get(victim)?.state.level;
        let config = &units.get(attacker)?.config;
        Some((attacker, stats::damage_experience(config, amount, victim_level)))
    }

    fn kill_award(&self, units: &UnitStore, killer: UnitId, victim: UnitId) -> Option<(UnitId, u32)> {
        let victim_level = units.get(victim)?.state.level;
        let config = &units.get(killer)?.config;
        Some((killer, stats::kill_experience(config, victim_level)))
    }

    /// Add experience to a unit, returning `UnitLeveledUp` if its level moved
    pub fn grant(&mut self, units: &mut UnitStore, unit: UnitId, xp: u32) -> Result<Option<SimEvent>> {
        if xp == 0 {
            return Ok(None);
        }
        let record = units.get_mut(unit).ok_or(SimError::UnitNotFound(unit))?;
        self.total_awarded += xp as u64;

        let change = record.state.add_experience(&record.config, xp);
        Ok(change.map(|change| level_event(unit, change, record.state.skill_points)))
    }

    /// Overwrite a unit's total experience
    ///
    /// Used by tooling and tests. A level loss revokes points.
    pub fn set_experience(
        &mut self,
        units: &mut UnitStore,
        unit: UnitId,
        experience: u32,
    ) -> Result<Option<SimEvent>> {
        let record = units.get_mut(unit).ok_or(SimError::UnitNotFound(unit))?;
        let change = record.state.set_experience(&record.config, experience);
        Ok(change.map(|change| level_event(unit, change, record.state.skill_points)))
    }
}

fn level_event(unit: UnitId, change: LevelChange, skill_points: u32) -> SimEvent {
    tracing::info!(
        unit = %unit,
        old_level = change.old_level,
        new_level = change.new_level,
        skill_points,
        "Level changed"
    );
    SimEvent::UnitLeveledUp {
        unit,
        old_level: change.old_level,
        new_level: change.new_level,
        skill_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Side, Vec2};
    use crate::unit::{Unit, UnitConfig};

    fn setup() -> (UnitStore, UnitId, UnitId) {
        let mut units = UnitStore::new();
        let mut spawn = |side| {
            let id = units.allocate_id();
            units.insert(Unit::new(id, side, "x".into(), Vec2::ZERO, UnitConfig::default()));
            id
        };
        let a = spawn(Side::Player);
        let b = spawn(Side::Enemy);
        (units, a, b)
    }

    #[test]
    fn test_damage_awards_attacker() {
        let (mut units, a, b) = setup();
        let mut progression = ProgressionService::new();
        let event = SimEvent::UnitDamaged {
            attacker: a,
            victim: b,
            amount: 10.0,
            remaining_health: 90.0,
        };

        assert!(progression.handle(&mut units, &event).is_empty());
        assert_eq!(units.get(a).unwrap().state.experience, 5);
        assert_eq!(units.get(b).unwrap().state.experience, 0);
    }

    #[test]
    fn test_kill_award_scales_with_victim_level() {
        let (mut units, a, b) = setup();
        units.get_mut(b).unwrap().state.level = 3;
        let mut progression = ProgressionService::new();

        let event = SimEvent::UnitDeath {
            victim: b,
            killer: Some(a),
        };
        progression.handle(&mut units, &event);
        assert_eq!(units.get(a).unwrap().state.experience, 75);
    }

    #[test]
    fn test_level_up_emits_event_with_points() {
        let (mut units, a, _) = setup();
        let mut progression = ProgressionService::new();

        let event = progression.grant(&mut units, a, 100).unwrap();
        assert_eq!(
            event,
            Some(SimEvent::UnitLeveledUp {
                unit: a,
                old_level: 1,
                new_level: 2,
                skill_points: 1,
            })
        );
        assert_eq!(progression.total_awarded(), 100);
    }

    #[test]
    fn test_death_without_killer_awards_nothing() {
        let (mut units, a, b) = setup();
        let mut progression = ProgressionService::new();
        let event = SimEvent::UnitDeath {
            victim: b,
            killer: None,
        };
        progression.handle(&mut units, &event);
        assert_eq!(units.get(a).unwrap().state.experience, 0);
    }

    #[test]
    fn test_grant_to_unknown_unit_fails() {
        let (mut units, _, _) = setup();
        let mut progression = ProgressionService::new();
        assert!(matches!(
            progression.grant(&mut units, UnitId(99), 10),
            Err(SimError::UnitNotFound(_))
        ));
    }
}
