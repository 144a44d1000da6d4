//! Per-unit template: base stats, per-point growth and the experience curve

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    // === EXPERIENCE ===
    /// Experience required to reach level 2
    pub base_experience: u32,
    /// Exponent of the level curve (higher = steeper)
    pub experience_growth_factor: f32,
    /// Experience per point of damage dealt, scaled by victim level
    pub experience_per_damage: f32,
    /// Experience per kill, scaled by victim level
    pub experience_per_kill: f32,

    // === HEALTH ===
    pub base_health: f32,
    pub health_per_point: f32,

    // === DAMAGE ===
    pub base_damage: f32,
    pub damage_per_point: f32,

    // === DEFENSE ===
    /// Fraction of incoming damage absorbed at rank 0
    pub base_defense: f32,
    /// Extra fraction absorbed per defense rank
    pub defense_per_point: f32,
    /// Upper bound on the absorbed fraction
    pub max_defense: f32,

    // === SPEED ===
    /// Movement speed in units per second
    pub base_speed: f32,
    pub speed_per_point: f32,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            base_experience: 100,
            experience_growth_factor: 1.5,
            experience_per_damage: 0.5,
            experience_per_kill: 25.0,
            base_health: 100.0,
            health_per_point: 10.0,
            base_damage: 10.0,
            damage_per_point: 2.0,
            base_defense: 0.05,
            defense_per_point: 0.02,
            max_defense: 0.9,
            base_speed: 3.0,
            speed_per_point: 0.5,
        }
    }
}

impl UnitConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.base_health <= 0.0 {
            return Err(format!("base_health ({}) must be positive", self.base_health));
        }
        if self.base_damage < 0.0 || self.base_speed < 0.0 {
            return Err("base_damage and base_speed must not be negative".into());
        }
        if !(0.0..1.0).contains(&self.max_defense) {
            return Err(format!("max_defense ({}) must be within 0..1", self.max_defense));
        }
        if self.base_defense < 0.0 || self.defense_per_point < 0.0 {
            return Err("defense values must not be negative".into());
        }
        if self.base_experience == 0 {
            return Err("base_experience must be positive".into());
        }
        if self.experience_growth_factor < 1.0 {
            return Err(format!(
                "experience_growth_factor ({}) must be >= 1",
                self.experience_growth_factor
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_is_valid() {
        assert!(UnitConfig::default().validate().is_ok());
    }

    #[test]
    fn test_defense_cap_must_leave_damage() {
        let config = UnitConfig {
            max_defense: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flat_curve_rejected() {
        let config = UnitConfig {
            experience_growth_factor: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
