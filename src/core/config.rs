//! Match configuration with documented constants
//!
//! Every tunable of the simulation lives here, grouped by the component
//! that reads it. All sections deserialize from TOML with per-field
//! defaults, so a config file only needs to name what it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{ControlMode, Side, Vec2};
use crate::unit::config::UnitConfig;

/// Complete configuration for one match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the match RNG. `None` draws a seed from entropy.
    pub seed: Option<u64>,
    pub timing: TimingConfig,
    pub combat: CombatConfig,
    pub teams: TeamsConfig,
    pub escalation: EscalationConfig,
    pub control: ControlConfig,
    pub arena: ArenaConfig,
    pub names: NamesConfig,
    /// Template for player-side units. `None` makes every player spawn fail.
    pub player_unit: Option<UnitConfig>,
    /// Template for enemy-side units. `None` makes every enemy spawn fail.
    pub enemy_unit: Option<UnitConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            timing: TimingConfig::default(),
            combat: CombatConfig::default(),
            teams: TeamsConfig::default(),
            escalation: EscalationConfig::default(),
            control: ControlConfig::default(),
            arena: ArenaConfig::default(),
            names: NamesConfig::default(),
            player_unit: Some(UnitConfig::default()),
            enemy_unit: Some(UnitConfig::default()),
        }
    }
}

// === TIMING ===

/// Logical clock rate and every scheduled delay, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Simulation ticks per second of match time
    pub tick_rate: u32,

    /// Seconds between AI decision passes
    ///
    /// Decoupled from the tick so decision cost stays bounded as
    /// rosters grow. Target acquisition and scouting rolls only happen here.
    pub ai_update_interval: f32,

    /// Delay before round 1 starts
    pub round_start_delay: f32,

    /// Delay between skill allocation completing and the next round starting
    pub round_transition_delay: f32,

    /// Delay between the last death and `RoundCompleted`
    pub round_over_delay: f32,

    /// Delay after `RoundStarted` before both teams advance on each other
    pub battle_settle_delay: f32,

    /// How long survivors celebrate before repositioning
    pub victory_duration: f32,

    /// Delay between `RoundCompleted` and the start of skill allocation
    pub allocation_delay: f32,

    /// Delay between a defeat and the match restarting from round 1
    pub restart_delay: f32,

    /// Optional limit on how long one manual selection may stay open
    ///
    /// `None` (the default) waits forever for the UI to close the selection.
    pub selection_timeout: Option<f32>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30,
            ai_update_interval: 1.0,
            round_start_delay: 1.0,
            round_transition_delay: 3.0,
            round_over_delay: 0.2,
            battle_settle_delay: 1.0,
            victory_duration: 3.0,
            allocation_delay: 0.0,
            restart_delay: 3.0,
            selection_timeout: None,
        }
    }
}

impl TimingConfig {
    /// Seconds covered by a single tick
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

// === COMBAT & AI ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Maximum distance at which a unit can land an attack
    pub attack_range: f32,

    /// Maximum distance at which a unit notices enemies
    pub detection_range: f32,

    /// Distance within which a noticed enemy is engaged outright
    pub engage_distance: f32,

    /// Seconds between attacks
    pub attack_cooldown: f32,

    /// Chance per AI pass that an engaged unit looks for a nearer target
    pub retarget_probability: f32,

    /// Chance per AI pass to engage a noticed enemy beyond engage distance
    pub move_toward_enemy_chance: f32,

    /// Chance per AI pass to start a random patrol when no enemy is visible
    pub random_scout_chance: f32,

    /// Maximum distance of a random patrol leg
    pub scout_movement_range: f32,

    /// Distance at which a destination counts as reached
    pub destination_reached_threshold: f32,

    /// How far a target may drift from the current goal before re-pathing
    pub repath_distance: f32,

    /// Seconds a hit unit is staggered (no movement, attacks or decisions)
    pub stagger_duration: f32,

    /// Radius of the repositioning move after a victory celebration
    pub preparation_distance: f32,

    /// Spread radius when a whole team is ordered to a point
    pub team_spread_radius: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_range: 1.5,
            detection_range: 20.0,
            engage_distance: 12.0,
            attack_cooldown: 1.0,
            retarget_probability: 0.1,
            move_toward_enemy_chance: 0.2,
            random_scout_chance: 0.1,
            scout_movement_range: 5.0,
            destination_reached_threshold: 0.2,
            repath_distance: 1.0,
            stagger_duration: 0.5,
            preparation_distance: 5.0,
            team_spread_radius: 5.0,
        }
    }
}

// === TEAMS ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamsConfig {
    /// Roster cap shared by both sides
    pub max_team_size: usize,
    /// Player units targeted in round 1
    pub ally_base_count: usize,
    /// Enemy units targeted in round 1
    pub enemy_base_count: usize,
    /// Anchor the player side spawns around
    pub player_spawn: Option<[f32; 2]>,
    /// Anchor the enemy side spawns around
    pub enemy_spawn: Option<[f32; 2]>,
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            max_team_size: 12,
            ally_base_count: 3,
            enemy_base_count: 3,
            player_spawn: Some([-15.0, 0.0]),
            enemy_spawn: Some([15.0, 0.0]),
        }
    }
}

impl TeamsConfig {
    pub fn spawn_anchor(&self, side: Side) -> Option<Vec2> {
        let anchor = match side {
            Side::Player => self.player_spawn,
            Side::Enemy => self.enemy_spawn,
        };
        anchor.map(Vec2::from)
    }

    pub fn base_count(&self, side: Side) -> usize {
        match side {
            Side::Player => self.ally_base_count,
            Side::Enemy => self.enemy_base_count,
        }
    }
}

// === ESCALATION ===

/// Cadence of roster growth between rounds
///
/// A side gains `(round + offset) / cadence` extra units (integer
/// division) on top of its base count, capped by `max_team_size`. The
/// defaults grow the player side at rounds 2, 6, 10, ... and the enemy
/// side at rounds 4, 8, 12, ... so the two sides alternate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Rounds between growth steps of the same side (must be >= 1)
    pub cadence: u32,
    /// Phase shift of the player side's growth
    pub ally_offset: u32,
    /// Phase shift of the enemy side's growth
    pub enemy_offset: u32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            cadence: 4,
            ally_offset: 2,
            enemy_offset: 0,
        }
    }
}

// === CONTROL ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Who spends player-side skill points
    pub player: ControlMode,
    /// Who spends enemy-side skill points
    pub enemy: ControlMode,
    /// Restart from round 1 after a defeat instead of stopping
    pub restart_on_defeat: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            player: ControlMode::Manual,
            enemy: ControlMode::Auto,
            restart_on_defeat: true,
        }
    }
}

impl ControlConfig {
    pub fn mode(&self, side: Side) -> ControlMode {
        match side {
            Side::Player => self.player,
            Side::Enemy => self.enemy,
        }
    }
}

// === ARENA ===

/// Walkable area handed to the reference grid pathfinder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub half_width: f32,
    pub half_height: f32,
    pub cell_size: f32,
    pub obstacles: Vec<ObstacleConfig>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_width: 30.0,
            half_height: 30.0,
            cell_size: 1.0,
            obstacles: Vec::new(),
        }
    }
}

/// Circular blocked region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub center: [f32; 2],
    pub radius: f32,
}

// === NAMES ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    pub player: Vec<String>,
    pub enemy: Vec<String>,
}

impl Default for NamesConfig {
    fn default() -> Self {
        let to_owned = |names: &[&str]| names.iter().map(|n| n.to_string()).collect();
        Self {
            player: to_owned(&[
                "Aldric", "Brenna", "Cedric", "Dara", "Edwin", "Freya", "Gareth", "Helga",
                "Ivor", "Jorunn", "Kael", "Liora",
            ]),
            enemy: to_owned(&[
                "Grub", "Snag", "Muzgash", "Rikta", "Bolg", "Skarn", "Vex", "Throk", "Nazra",
                "Ugluk", "Krell", "Zogg",
            ]),
        }
    }
}

impl NamesConfig {
    pub fn for_side(&self, side: Side) -> &[String] {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }
}

impl SimConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn unit_template(&self, side: Side) -> Option<&UnitConfig> {
        match side {
            Side::Player => self.player_unit.as_ref(),
            Side::Enemy => self.enemy_unit.as_ref(),
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(SimError::InvalidConfig(msg));

        if self.timing.tick_rate == 0 {
            return fail("timing.tick_rate must be positive".into());
        }
        if self.timing.ai_update_interval <= 0.0 {
            return fail("timing.ai_update_interval must be positive".into());
        }
        if let Some(timeout) = self.timing.selection_timeout {
            if timeout <= 0.0 {
                return fail("timing.selection_timeout must be positive when set".into());
            }
        }

        for (name, value) in [
            ("combat.retarget_probability", self.combat.retarget_probability),
            ("combat.move_toward_enemy_chance", self.combat.move_toward_enemy_chance),
            ("combat.random_scout_chance", self.combat.random_scout_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return fail(format!("{} ({}) must be within 0..=1", name, value));
            }
        }
        if self.combat.attack_range <= 0.0 {
            return fail("combat.attack_range must be positive".into());
        }
        if self.combat.detection_range < self.combat.attack_range {
            return fail(format!(
                "combat.detection_range ({}) should be >= attack_range ({})",
                self.combat.detection_range, self.combat.attack_range
            ));
        }

        if self.escalation.cadence == 0 {
            return fail("escalation.cadence must be at least 1".into());
        }
        if self.teams.max_team_size == 0 {
            return fail("teams.max_team_size must be positive".into());
        }
        if self.teams.ally_base_count > self.teams.max_team_size
            || self.teams.enemy_base_count > self.teams.max_team_size
        {
            return fail(format!(
                "base counts ({}, {}) exceed max_team_size ({})",
                self.teams.ally_base_count, self.teams.enemy_base_count, self.teams.max_team_size
            ));
        }

        if self.arena.cell_size <= 0.0 || self.arena.half_width <= 0.0 || self.arena.half_height <= 0.0 {
            return fail("arena dimensions must be positive".into());
        }

        for side in Side::ALL {
            if let Some(template) = self.unit_template(side) {
                template.validate().map_err(|msg| {
                    SimError::InvalidConfig(format!("{} unit: {}", side.name(), msg))
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimConfig::from_toml_str(
            r#"
            seed = 7

            [teams]
            ally_base_count = 5

            [control]
            player = "auto"
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.teams.ally_base_count, 5);
        assert_eq!(config.teams.enemy_base_count, 3);
        assert_eq!(config.control.player, ControlMode::Auto);
        assert_eq!(config.timing.tick_rate, 30);
        assert!(config.player_unit.is_some());
    }

    #[test]
    fn test_zero_cadence_rejected() {
        let mut config = SimConfig::default();
        config.escalation.cadence = 0;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_base_count_above_cap_rejected() {
        let mut config = SimConfig::default();
        config.teams.max_team_size = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let mut config = SimConfig::default();
        config.combat.retarget_probability = 1.5;
        assert!(config.validate().is_err());
    }
}
