//! Façade over the pathfinding collaborator used by unit movement

use rand::RngCore;

use crate::core::types::Vec2;
use crate::navigation::pathfinder::Pathfinder;

pub struct TargetingGateway {
    pathfinder: Box<dyn Pathfinder>,
    failed_queries: u64,
}

impl TargetingGateway {
    pub fn new(pathfinder: Box<dyn Pathfinder>) -> Self {
        Self {
            pathfinder,
            failed_queries: 0,
        }
    }

    /// Waypoints toward `destination`, or `None` if it cannot be reached
    pub fn path_to(&mut self, start: Vec2, destination: Vec2) -> Option<Vec<Vec2>> {
        let path = self.pathfinder.calculate_path(start, destination);
        if path.is_none() {
            self.failed_queries += 1;
            tracing::debug!(?start, ?destination, "No path found");
        }
        path
    }

    pub fn random_point_near(
        &mut self,
        center: Vec2,
        radius: f32,
        rng: &mut dyn RngCore,
    ) -> Option<Vec2> {
        let point = self.pathfinder.random_point_near(center, radius, rng);
        if point.is_none() {
            self.failed_queries += 1;
            tracing::debug!(?center, radius, "No walkable point sampled");
        }
        point
    }

    pub fn is_reachable(&self, start: Vec2, destination: Vec2) -> bool {
        self.pathfinder.is_reachable(start, destination)
    }

    /// Queries the collaborator could not satisfy
    pub fn failed_queries(&self) -> u64 {
        self.failed_queries
    }
}

impl std::fmt::Debug for TargetingGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetingGateway")
            .field("failed_queries", &self.failed_queries)
            .finish_non_exhaustive()
    }
}
