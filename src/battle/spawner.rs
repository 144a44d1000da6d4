//! Unit creation near a team's spawn anchor

use rand::{Rng, RngCore};

use crate::battle::teams::TeamRegistry;
use crate::core::config::SimConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{Side, UnitId};
use crate::navigation::TargetingGateway;
use crate::unit::names::NameGenerator;
use crate::unit::{Unit, UnitStore};

/// Smallest spawn scatter radius
const MIN_SPAWN_RADIUS: f32 = 1.0;

/// Scatter radius ceiling: `max(5, 3 + roster * 1.5)`
fn spawn_radius_ceiling(roster_size: usize) -> f32 {
    (3.0 + roster_size as f32 * 1.5).max(5.0)
}

#[derive(Debug, Clone)]
pub struct Spawner {
    names: NameGenerator,
}

impl Spawner {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            names: NameGenerator::new(&config.names),
        }
    }

    /// Create a unit for `side` near its anchor and put it on the roster
    ///
    /// The spot is sampled through the gateway. If sampling fails the unit
    /// lands on the anchor itself.
    pub fn spawn_unit(
        &mut self,
        side: Side,
        config: &SimConfig,
        teams: &mut TeamRegistry,
        units: &mut UnitStore,
        gateway: &mut TargetingGateway,
        rng: &mut dyn RngCore,
    ) -> Result<UnitId> {
        let template = config
            .unit_template(side)
            .ok_or(SimError::MissingTemplate(side))?;
        let team = teams.team(side);
        let anchor = team.anchor.ok_or(SimError::MissingSpawnAnchor(side))?;
        if team.is_full() {
            return Err(SimError::RosterFull {
                side,
                cap: team.cap,
            });
        }

        let radius = rng.gen_range(MIN_SPAWN_RADIUS..=spawn_radius_ceiling(team.len()));
        let position = gateway
            .random_point_near(anchor, radius, rng)
            .unwrap_or(anchor);

        let id = units.allocate_id();
        teams.add_unit(side, id)?;
        let name = self.names.unique_name(side, rng);
        tracing::info!(unit = %id, side = side.name(), name = %name, "Spawned unit");

        let mut unit = Unit::new(id, side, name, position, template.clone());
        if let Some(opposing) = teams.team(side.opponent()).anchor {
            if let Some(facing) = (opposing - position).try_normalize() {
                unit.facing = facing;
            }
        }
        units.insert(unit);
        Ok(id)
    }

    pub fn release_name(&mut self, side: Side, name: &str) {
        self.names.release(side, name);
    }

    pub fn reset_names(&mut self) {
        self.names.reset();
    }
}
