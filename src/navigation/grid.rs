//! A* pathfinding over a walkable grid
//!
//! 8-connected cells with circular obstacles. Diagonal moves may not cut
//! blocked corners.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use rand::RngCore;

use crate::core::config::ArenaConfig;
use crate::core::types::Vec2;
use crate::navigation::pathfinder::{sample_disc, Pathfinder};

/// Sampling attempts before `random_point_near` gives up
const SAMPLE_ATTEMPTS: usize = 30;

type Cell = (i32, i32);

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    cell: Cell,
    f_cost: f32, // g_cost + heuristic
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
pub struct GridPathfinder {
    origin: Vec2,
    cell_size: f32,
    cols: i32,
    rows: i32,
    blocked: Vec<bool>,
}

impl GridPathfinder {
    /// Open grid covering `[-half_width, half_width] x [-half_height, half_height]`
    pub fn new(half_width: f32, half_height: f32, cell_size: f32) -> Self {
        let cols = ((half_width * 2.0) / cell_size).ceil().max(1.0) as i32;
        let rows = ((half_height * 2.0) / cell_size).ceil().max(1.0) as i32;
        Self {
            origin: Vec2::new(-half_width, -half_height),
            cell_size,
            cols,
            rows,
            blocked: vec![false; (cols * rows) as usize],
        }
    }

    pub fn from_arena(arena: &ArenaConfig) -> Self {
        let mut grid = Self::new(arena.half_width, arena.half_height, arena.cell_size);
        for obstacle in &arena.obstacles {
            grid.block_circle(Vec2::from(obstacle.center), obstacle.radius);
        }
        grid
    }

    /// Mark every cell whose center lies inside the circle as blocked
    pub fn block_circle(&mut self, center: Vec2, radius: f32) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.cell_center((col, row)).distance(center) <= radius {
                    let idx = self.index((col, row));
                    self.blocked[idx] = true;
                }
            }
        }
    }

    pub fn is_walkable(&self, point: Vec2) -> bool {
        self.cell_of(point).is_some_and(|cell| !self.is_blocked(cell))
    }

    fn index(&self, (col, row): Cell) -> usize {
        (row * self.cols + col) as usize
    }

    fn in_bounds(&self, (col, row): Cell) -> bool {
        col >= 0 && row >= 0 && col < self.cols && row < self.rows
    }

    fn is_blocked(&self, cell: Cell) -> bool {
        !self.in_bounds(cell) || self.blocked[self.index(cell)]
    }

    fn cell_of(&self, point: Vec2) -> Option<Cell> {
        let local = (point - self.origin) / self.cell_size;
        let cell = (local.x.floor() as i32, local.y.floor() as i32);
        self.in_bounds(cell).then_some(cell)
    }

    fn cell_center(&self, (col, row): Cell) -> Vec2 {
        self.origin + Vec2::new(col as f32 + 0.5, row as f32 + 0.5) * self.cell_size
    }

    fn neighbors(&self, (col, row): Cell) -> impl Iterator<Item = (Cell, f32)> + '_ {
        const STEPS: [(i32, i32); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];
        STEPS.iter().filter_map(move |&(dc, dr)| {
            let next = (col + dc, row + dr);
            if self.is_blocked(next) {
                return None;
            }
            if dc != 0 && dr != 0 {
                // No squeezing between two blocked orthogonal cells
                if self.is_blocked((col + dc, row)) || self.is_blocked((col, row + dr)) {
                    return None;
                }
                Some((next, std::f32::consts::SQRT_2))
            } else {
                Some((next, 1.0))
            }
        })
    }

    fn heuristic(a: Cell, b: Cell) -> f32 {
        let dx = (a.0 - b.0).abs() as f32;
        let dy = (a.1 - b.1).abs() as f32;
        // Octile distance
        dx.max(dy) + (std::f32::consts::SQRT_2 - 1.0) * dx.min(dy)
    }

    fn find_cells(&self, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
        let mut open_set = BinaryHeap::new();
        let mut came_from: AHashMap<Cell, Cell> = AHashMap::new();
        let mut g_scores: AHashMap<Cell, f32> = AHashMap::new();

        g_scores.insert(start, 0.0);
        open_set.push(PathNode {
            cell: start,
            f_cost: Self::heuristic(start, goal),
        });

        while let Some(current) = open_set.pop() {
            if current.cell == goal {
                return Some(reconstruct_path(&came_from, current.cell));
            }

            let current_g = *g_scores.get(&current.cell).unwrap_or(&f32::INFINITY);

            for (neighbor, step_cost) in self.neighbors(current.cell) {
                let tentative_g = current_g + step_cost;
                let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY);

                if tentative_g < neighbor_g {
                    came_from.insert(neighbor, current.cell);
                    g_scores.insert(neighbor, tentative_g);
                    open_set.push(PathNode {
                        cell: neighbor,
                        f_cost: tentative_g + Self::heuristic(neighbor, goal),
                    });
                }
            }
        }

        None
    }
}

fn reconstruct_path(came_from: &AHashMap<Cell, Cell>, mut current: Cell) -> Vec<Cell> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

impl Pathfinder for GridPathfinder {
    fn calculate_path(&self, start: Vec2, destination: Vec2) -> Option<Vec<Vec2>> {
        let start_cell = self.cell_of(start)?;
        let goal_cell = self.cell_of(destination)?;
        if self.is_blocked(goal_cell) {
            return None;
        }
        if start_cell == goal_cell {
            return Some(vec![destination]);
        }

        let cells = self.find_cells(start_cell, goal_cell)?;
        // Drop the start cell and end exactly on the requested point
        let mut waypoints: Vec<Vec2> = cells
            .iter()
            .skip(1)
            .take(cells.len().saturating_sub(2))
            .map(|&cell| self.cell_center(cell))
            .collect();
        waypoints.push(destination);
        Some(waypoints)
    }

    fn random_point_near(&self, center: Vec2, radius: f32, rng: &mut dyn RngCore) -> Option<Vec2> {
        (0..SAMPLE_ATTEMPTS)
            .map(|_| sample_disc(center, radius, rng))
            .find(|point| self.is_walkable(*point))
    }
}
