//! Mutable unit state: health, derived stats, experience and skill ranks

use serde::{Deserialize, Serialize};

use crate::core::types::SkillType;
use crate::unit::config::UnitConfig;
use crate::unit::stats;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRanks {
    pub health: u32,
    pub damage: u32,
    pub defense: u32,
    pub speed: u32,
}

impl SkillRanks {
    pub fn get(&self, skill: SkillType) -> u32 {
        match skill {
            SkillType::Health => self.health,
            SkillType::Damage => self.damage,
            SkillType::Defense => self.defense,
            SkillType::Speed => self.speed,
        }
    }

    fn get_mut(&mut self, skill: SkillType) -> &mut u32 {
        match skill {
            SkillType::Health => &mut self.health,
            SkillType::Damage => &mut self.damage,
            SkillType::Defense => &mut self.defense,
            SkillType::Speed => &mut self.speed,
        }
    }

    pub fn total(&self) -> u32 {
        self.health + self.damage + self.defense + self.speed
    }
}

/// Per-round counters, reset at the round boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleStats {
    pub damage_dealt: f32,
    pub kills: u32,
}

/// Level transition caused by an experience change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    pub old_level: u32,
    pub new_level: u32,
}

impl LevelChange {
    pub fn delta(&self) -> i64 {
        self.new_level as i64 - self.old_level as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitState {
    pub health: f32,
    pub max_health: f32,
    pub damage_output: f32,
    pub damage_reduction: f32,
    pub movement_speed: f32,
    pub experience: u32,
    pub level: u32,
    pub skill_points: u32,
    pub ranks: SkillRanks,
    pub battle: BattleStats,
}

impl UnitState {
    /// Fresh level-1 state at full health
    pub fn new(config: &UnitConfig) -> Self {
        let mut state = Self {
            health: 0.0,
            max_health: 0.0,
            damage_output: 0.0,
            damage_reduction: 0.0,
            movement_speed: 0.0,
            experience: 0,
            level: 1,
            skill_points: 0,
            ranks: SkillRanks::default(),
            battle: BattleStats::default(),
        };
        state.recompute_stats(config);
        state.health = state.max_health;
        state
    }

    /// Re-derive stats from ranks
    ///
    /// Health is clamped only when the max went down. A raised max leaves
    /// current health where it was.
    pub fn recompute_stats(&mut self, config: &UnitConfig) {
        let old_max = self.max_health;
        self.max_health = stats::max_health(config, self.ranks.health);
        self.damage_output = stats::damage_output(config, self.ranks.damage);
        self.damage_reduction = stats::damage_reduction(config, self.ranks.defense);
        self.movement_speed = stats::movement_speed(config, self.ranks.speed);
        if self.max_health < old_max {
            self.health = self.health.min(self.max_health);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Subtract damage, clamping at 0. Returns the health actually removed.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - amount.max(0.0)).max(0.0);
        before - self.health
    }

    pub fn restore_full_health(&mut self) {
        self.health = self.max_health;
    }

    pub fn add_experience(&mut self, config: &UnitConfig, amount: u32) -> Option<LevelChange> {
        self.set_experience(config, self.experience.saturating_add(amount))
    }

    /// Set total experience and settle level and skill points
    ///
    /// A level gain grants one point per level. A level loss revokes them,
    /// saturating at zero.
    pub fn set_experience(&mut self, config: &UnitConfig, experience: u32) -> Option<LevelChange> {
        self.experience = experience;
        let new_level = stats::level_for_experience(config, experience);
        if new_level == self.level {
            return None;
        }

        let change = LevelChange {
            old_level: self.level,
            new_level,
        };
        self.level = new_level;
        if new_level > change.old_level {
            self.skill_points += new_level - change.old_level;
        } else {
            self.skill_points = self.skill_points.saturating_sub(change.old_level - new_level);
        }
        Some(change)
    }

    /// Spend one point on `skill`. Returns the new rank, or `None` without points.
    pub fn spend_skill_point(&mut self, config: &UnitConfig, skill: SkillType) -> Option<u32> {
        if self.skill_points == 0 {
            return None;
        }
        self.skill_points -= 1;
        let rank = self.ranks.get_mut(skill);
        *rank += 1;
        let new_rank = *rank;
        self.recompute_stats(config);
        Some(new_rank)
    }

    pub fn record_hit(&mut self, damage: f32) {
        self.battle.damage_dealt += damage;
    }

    pub fn record_kill(&mut self) {
        self.battle.kills += 1;
    }

    pub fn reset_battle_stats(&mut self) {
        self.battle = BattleStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_full_health_level_one() {
        let config = UnitConfig::default();
        let state = UnitState::new(&config);
        assert_eq!(state.level, 1);
        assert_eq!(state.health, 100.0);
        assert_eq!(state.max_health, 100.0);
        assert_eq!(state.skill_points, 0);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let config = UnitConfig::default();
        let mut state = UnitState::new(&config);
        assert_eq!(state.apply_damage(30.0), 30.0);
        assert_eq!(state.apply_damage(500.0), 70.0);
        assert_eq!(state.health, 0.0);
        assert!(!state.is_alive());
    }

    #[test]
    fn test_raising_max_health_keeps_current_health() {
        let config = UnitConfig::default();
        let mut state = UnitState::new(&config);
        state.apply_damage(40.0);
        state.skill_points = 1;

        assert_eq!(state.spend_skill_point(&config, SkillType::Health), Some(1));
        assert_eq!(state.max_health, 110.0);
        assert_eq!(state.health, 60.0);
    }

    #[test]
    fn test_lowering_max_health_clamps() {
        let config = UnitConfig::default();
        let mut state = UnitState::new(&config);
        state.ranks.health = 5;
        state.recompute_stats(&config);
        state.restore_full_health();
        assert_eq!(state.health, 150.0);

        state.ranks.health = 0;
        state.recompute_stats(&config);
        assert_eq!(state.health, 100.0);
    }

    #[test]
    fn test_level_up_grants_points() {
        let config = UnitConfig::default();
        let mut state = UnitState::new(&config);

        let change = state.add_experience(&config, 283).unwrap();
        assert_eq!(change.old_level, 1);
        assert_eq!(change.new_level, 3);
        assert_eq!(state.skill_points, 2);
        assert!(state.add_experience(&config, 1).is_none());
    }

    #[test]
    fn test_level_loss_revokes_points_saturating() {
        let config = UnitConfig::default();
        let mut state = UnitState::new(&config);
        state.add_experience(&config, 283);
        state.spend_skill_point(&config, SkillType::Damage);
        assert_eq!(state.skill_points, 1);

        let change = state.set_experience(&config, 0).unwrap();
        assert_eq!(change.delta(), -2);
        assert_eq!(state.level, 1);
        assert_eq!(state.skill_points, 0);
    }

    #[test]
    fn test_spend_without_points_fails() {
        let config = UnitConfig::default();
        let mut state = UnitState::new(&config);
        assert_eq!(state.spend_skill_point(&config, SkillType::Speed), None);
        assert_eq!(state.ranks.total(), 0);
    }

    #[test]
    fn test_battle_stats_reset() {
        let config = UnitConfig::default();
        let mut state = UnitState::new(&config);
        state.record_hit(12.0);
        state.record_kill();
        assert_eq!(state.battle.kills, 1);
        state.reset_battle_stats();
        assert_eq!(state.battle, BattleStats::default());
    }
}
