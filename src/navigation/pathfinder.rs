//! Pathfinding collaborator contract and a straight-line implementation

use rand::{Rng, RngCore};

use crate::core::types::Vec2;

/// Query contract of the pathfinding collaborator
///
/// Failures are `None`. Callers skip the action and hold position.
pub trait Pathfinder {
    /// Waypoints from `start` to `destination`, ending at `destination`.
    /// `None` if no complete path exists.
    fn calculate_path(&self, start: Vec2, destination: Vec2) -> Option<Vec<Vec2>>;

    /// A walkable point within `radius` of `center`, or `None` if sampling failed
    fn random_point_near(&self, center: Vec2, radius: f32, rng: &mut dyn RngCore) -> Option<Vec2>;

    fn is_reachable(&self, start: Vec2, destination: Vec2) -> bool {
        self.calculate_path(start, destination).is_some()
    }
}

/// Obstacle-free plane. Every path is a straight line.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl Pathfinder for OpenField {
    fn calculate_path(&self, _start: Vec2, destination: Vec2) -> Option<Vec<Vec2>> {
        Some(vec![destination])
    }

    fn random_point_near(&self, center: Vec2, radius: f32, rng: &mut dyn RngCore) -> Option<Vec2> {
        Some(sample_disc(center, radius, rng))
    }
}

/// Uniform sample inside a disc
pub fn sample_disc(center: Vec2, radius: f32, rng: &mut dyn RngCore) -> Vec2 {
    if radius <= 0.0 {
        return center;
    }
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let dist = radius * rng.gen::<f32>().sqrt();
    center + Vec2::new(angle.cos(), angle.sin()) * dist
}
