//! Pure stat formulas
//!
//! Rank → stat and experience → level edges. No state, so every caller
//! gets the same numbers for the same inputs.

use crate::unit::config::UnitConfig;

/// Hard ceiling on the level curve
pub const MAX_LEVEL: u32 = 1000;

/// Total experience needed to reach `level`
///
/// `experience_for_level(1) == 0`, then `round(base * (level - 1)^growth)`.
pub fn experience_for_level(config: &UnitConfig, level: u32) -> u32 {
    if level <= 1 {
        return 0;
    }
    let steps = (level - 1) as f64;
    (config.base_experience as f64 * steps.powf(config.experience_growth_factor as f64)).round()
        as u32
}

/// Largest level whose threshold does not exceed `experience`
pub fn level_for_experience(config: &UnitConfig, experience: u32) -> u32 {
    let mut level = 1;
    while level < MAX_LEVEL && experience_for_level(config, level + 1) <= experience {
        level += 1;
    }
    level
}

pub fn max_health(config: &UnitConfig, rank: u32) -> f32 {
    config.base_health + rank as f32 * config.health_per_point
}

pub fn damage_output(config: &UnitConfig, rank: u32) -> f32 {
    config.base_damage + rank as f32 * config.damage_per_point
}

/// Fraction of incoming damage absorbed, capped by `max_defense`
pub fn damage_reduction(config: &UnitConfig, rank: u32) -> f32 {
    (config.base_defense + rank as f32 * config.defense_per_point).clamp(0.0, config.max_defense)
}

pub fn movement_speed(config: &UnitConfig, rank: u32) -> f32 {
    config.base_speed + rank as f32 * config.speed_per_point
}

/// Damage actually applied to a target
///
/// Never less than 1.
pub fn final_damage(output: f32, reduction: f32) -> f32 {
    (output * (1.0 - reduction.clamp(0.0, 1.0))).max(1.0)
}

/// Experience an attacker earns for dealing `damage` to a unit of `victim_level`
pub fn damage_experience(config: &UnitConfig, damage: f32, victim_level: u32) -> u32 {
    (config.experience_per_damage * damage * victim_level as f32)
        .round()
        .max(0.0) as u32
}

/// Experience a killer earns for finishing a unit of `victim_level`
pub fn kill_experience(config: &UnitConfig, victim_level: u32) -> u32 {
    (config.experience_per_kill * victim_level as f32)
        .round()
        .max(0.0) as u32
}
