//! Slow-interval AI decision pass
//!
//! Runs every `ai_update_interval` instead of every tick. Handles target
//! acquisition, opportunistic retargeting and random patrols. Per-tick
//! combat and movement live in the unit update.

use rand::{Rng, RngCore};

use crate::battle::teams::TeamRegistry;
use crate::core::config::CombatConfig;
use crate::core::types::{Side, Tick};
use crate::navigation::TargetingGateway;
use crate::unit::combat::nearest_enemy;
use crate::unit::{UnitMode, UnitStore};

/// Decisions taken in one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiReport {
    pub engaged: usize,
    pub retargeted: usize,
    pub patrols: usize,
}

#[derive(Debug, Clone)]
pub struct CombatAi {
    interval: Tick,
    next_pass: Tick,
    passes: u64,
}

impl CombatAi {
    pub fn new(interval: Tick) -> Self {
        Self {
            interval: interval.max(1),
            next_pass: 0,
            passes: 0,
        }
    }

    pub fn is_due(&self, now: Tick) -> bool {
        now >= self.next_pass
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Run the pass if its interval has elapsed
    pub fn maybe_run(
        &mut self,
        now: Tick,
        units: &mut UnitStore,
        teams: &TeamRegistry,
        gateway: &mut TargetingGateway,
        combat: &CombatConfig,
        rng: &mut dyn RngCore,
    ) -> Option<AiReport> {
        if !self.is_due(now) {
            return None;
        }
        self.next_pass = now + self.interval;
        self.passes += 1;
        Some(self.run(now, units, teams, gateway, combat, rng))
    }

    /// Decide for every unit, player side first, each side in roster order
    pub fn run(
        &mut self,
        now: Tick,
        units: &mut UnitStore,
        teams: &TeamRegistry,
        gateway: &mut TargetingGateway,
        combat: &CombatConfig,
        rng: &mut dyn RngCore,
    ) -> AiReport {
        let views = units.views();
        let mut report = AiReport::default();

        for side in Side::ALL {
            for &id in teams.roster(side) {
                let Some(unit) = units.get_mut(id) else { continue };
                if !unit.is_alive()
                    || unit.controller.is_staggered(now)
                    || unit.controller.is_manual()
                {
                    continue;
                }

                let position = unit.position;
                match unit.controller.mode() {
                    UnitMode::Victory { .. } | UnitMode::Preparing | UnitMode::Dead => {}
                    UnitMode::Combat => {
                        if rng.gen::<f32>() >= combat.retarget_probability {
                            continue;
                        }
                        let current = unit.controller.target();
                        let current_distance = current
                            .and_then(|t| views.iter().find(|v| v.id == t))
                            .filter(|v| v.alive)
                            .map_or(f32::INFINITY, |v| position.distance(v.position));
                        let candidate =
                            nearest_enemy(position, side, combat.engage_distance, views.iter().copied());
                        if let Some((target, distance)) = candidate {
                            if Some(target) != current && distance < current_distance {
                                tracing::debug!(unit = %id, target = %target, "Retargeting to nearer enemy");
                                unit.controller.retarget(target, now);
                                report.retargeted += 1;
                            }
                        }
                    }
                    UnitMode::Idle | UnitMode::Scouting => {
                        let seen =
                            nearest_enemy(position, side, combat.detection_range, views.iter().copied());
                        match seen {
                            Some((target, distance)) => {
                                let engage = distance <= combat.engage_distance
                                    || rng.gen::<f32>() < combat.move_toward_enemy_chance;
                                if engage {
                                    tracing::debug!(unit = %id, target = %target, distance, "Engaging");
                                    unit.controller.engage(target, now);
                                    report.engaged += 1;
                                }
                            }
                            None => {
                                let ready = unit.controller.mode() == UnitMode::Idle
                                    || !unit.controller.is_moving();
                                if ready && rng.gen::<f32>() < combat.random_scout_chance {
                                    let Some(point) =
                                        gateway.random_point_near(position, combat.scout_movement_range, rng)
                                    else {
                                        continue;
                                    };
                                    let Some(path) = gateway.path_to(position, point) else {
                                        continue;
                                    };
                                    unit.controller.transition(UnitMode::Scouting);
                                    if unit.controller.start_motion(path) {
                                        report.patrols += 1;
                                    } else {
                                        unit.controller.transition(UnitMode::Idle);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        report
    }
}
