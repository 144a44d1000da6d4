//! Per-unit state machine runtime
//!
//! Enter and exit hooks only clear runtime data (motion, engagement,
//! timers). Choosing the next mode is the job of the per-tick update in
//! `battle::simulation` and the AI pass in `battle::ai`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{Tick, UnitId, Vec2};

/// Simulation mode. Exactly one is active per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitMode {
    Idle,
    /// Walking a patrol leg, a team advance order or a manual move
    Scouting,
    Combat,
    /// Repositioning after a victory celebration
    Preparing,
    Victory { since: Tick },
    Dead,
}

impl UnitMode {
    pub fn name(&self) -> &'static str {
        match self {
            UnitMode::Idle => "Idle",
            UnitMode::Scouting => "Scouting",
            UnitMode::Combat => "Combat",
            UnitMode::Preparing => "Preparing",
            UnitMode::Victory { .. } => "Victory",
            UnitMode::Dead => "Dead",
        }
    }
}

/// Current combat target. Present only while in `Combat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub target: UnitId,
    pub engaged_at: Tick,
}

/// Result of advancing along a path for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStatus {
    Moving,
    Arrived,
}

/// Remaining waypoints of the active move
#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    waypoints: VecDeque<Vec2>,
    goal: Vec2,
}

impl Motion {
    /// `None` for an empty path
    pub fn new(path: Vec<Vec2>) -> Option<Self> {
        let goal = *path.last()?;
        Some(Self {
            waypoints: path.into(),
            goal,
        })
    }

    pub fn goal(&self) -> Vec2 {
        self.goal
    }

    /// Move `position` up to `step` distance along the path
    pub fn advance(&mut self, position: &mut Vec2, step: f32, threshold: f32) -> MotionStatus {
        let mut budget = step.max(0.0);
        while let Some(&next) = self.waypoints.front() {
            let to_next = next - *position;
            let dist = to_next.length();
            if dist <= budget {
                *position = next;
                budget -= dist;
                self.waypoints.pop_front();
                continue;
            }
            if dist > f32::EPSILON {
                *position += to_next / dist * budget;
            }
            break;
        }

        if self.waypoints.is_empty() || position.distance(self.goal) <= threshold {
            self.waypoints.clear();
            MotionStatus::Arrived
        } else {
            MotionStatus::Moving
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnitController {
    mode: UnitMode,
    engagement: Option<Engagement>,
    motion: Option<Motion>,
    last_attack_at: Option<Tick>,
    manual_control: bool,
    stagger_until: Tick,
    death_published: bool,
}

impl Default for UnitController {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitController {
    pub fn new() -> Self {
        Self {
            mode: UnitMode::Idle,
            engagement: None,
            motion: None,
            last_attack_at: None,
            manual_control: false,
            stagger_until: 0,
            death_published: false,
        }
    }

    pub fn mode(&self) -> UnitMode {
        self.mode
    }

    pub fn engagement(&self) -> Option<Engagement> {
        self.engagement
    }

    pub fn target(&self) -> Option<UnitId> {
        self.engagement.map(|e| e.target)
    }

    pub fn is_in_combat(&self) -> bool {
        self.engagement.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.mode == UnitMode::Dead
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    pub fn motion(&self) -> Option<&Motion> {
        self.motion.as_ref()
    }

    pub fn motion_mut(&mut self) -> Option<&mut Motion> {
        self.motion.as_mut()
    }

    pub fn is_manual(&self) -> bool {
        self.manual_control
    }

    pub fn set_manual(&mut self, manual: bool) {
        self.manual_control = manual;
    }

    pub fn last_attack_at(&self) -> Option<Tick> {
        self.last_attack_at
    }

    /// Whether `cooldown` ticks have elapsed since the last attack
    pub fn cooldown_ready(&self, now: Tick, cooldown: Tick) -> bool {
        self.last_attack_at
            .map_or(true, |last| now.saturating_sub(last) >= cooldown)
    }

    pub fn record_attack(&mut self, now: Tick) {
        self.last_attack_at = Some(now);
    }

    pub fn is_staggered(&self, now: Tick) -> bool {
        now < self.stagger_until
    }

    /// Halt and stay inactive until `until`
    pub fn stagger(&mut self, until: Tick) {
        self.stagger_until = self.stagger_until.max(until);
        self.motion = None;
    }

    pub fn death_published(&self) -> bool {
        self.death_published
    }

    /// Mark the death of this life as announced. Returns false if it already was.
    pub fn mark_death_published(&mut self) -> bool {
        !std::mem::replace(&mut self.death_published, true)
    }

    /// Replace the active path
    pub fn start_motion(&mut self, path: Vec<Vec2>) -> bool {
        self.motion = Motion::new(path);
        self.motion.is_some()
    }

    pub fn stop(&mut self) {
        self.motion = None;
    }

    /// Switch modes, running exit then enter hooks
    ///
    /// Returns the previous mode. Leaving `Dead` is only possible through
    /// [`UnitController::revive`].
    pub fn transition(&mut self, next: UnitMode) -> UnitMode {
        let previous = self.mode;
        if previous == UnitMode::Dead {
            return previous;
        }
        self.exit(previous);
        self.mode = next;
        self.enter(next);
        if previous.name() != next.name() {
            tracing::trace!(from = previous.name(), to = next.name(), "Mode transition");
        }
        previous
    }

    /// Enter `Combat` against `target`
    pub fn engage(&mut self, target: UnitId, now: Tick) {
        if self.is_dead() {
            return;
        }
        if self.mode != UnitMode::Combat {
            self.transition(UnitMode::Combat);
        }
        self.engagement = Some(Engagement {
            target,
            engaged_at: now,
        });
    }

    /// Swap the target without leaving `Combat`. The attack cooldown carries over.
    pub fn retarget(&mut self, target: UnitId, now: Tick) {
        if self.mode == UnitMode::Combat {
            self.engagement = Some(Engagement {
                target,
                engaged_at: now,
            });
            self.motion = None;
        }
    }

    /// Back to a fresh `Idle` for a new life
    pub fn revive(&mut self) {
        self.mode = UnitMode::Idle;
        self.engagement = None;
        self.motion = None;
        self.last_attack_at = None;
        self.manual_control = false;
        self.stagger_until = 0;
        self.death_published = false;
    }

    fn exit(&mut self, mode: UnitMode) {
        if mode == UnitMode::Combat {
            self.engagement = None;
        }
    }

    fn enter(&mut self, mode: UnitMode) {
        match mode {
            UnitMode::Idle | UnitMode::Combat => self.motion = None,
            UnitMode::Victory { .. } => {
                self.motion = None;
                self.manual_control = false;
            }
            UnitMode::Dead => {
                self.motion = None;
                self.engagement = None;
                self.manual_control = false;
            }
            UnitMode::Scouting | UnitMode::Preparing => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_exists_only_in_combat() {
        let mut ctrl = UnitController::new();
        ctrl.engage(UnitId(2), 10);
        assert_eq!(ctrl.mode(), UnitMode::Combat);
        assert!(ctrl.is_in_combat());

        ctrl.transition(UnitMode::Idle);
        assert!(!ctrl.is_in_combat());
        assert_eq!(ctrl.target(), None);
    }

    #[test]
    fn test_dead_is_sticky_until_revive() {
        let mut ctrl = UnitController::new();
        ctrl.engage(UnitId(2), 0);
        ctrl.transition(UnitMode::Dead);
        assert!(!ctrl.is_in_combat());

        ctrl.transition(UnitMode::Idle);
        assert!(ctrl.is_dead());
        ctrl.engage(UnitId(3), 5);
        assert!(!ctrl.is_in_combat());

        ctrl.revive();
        assert_eq!(ctrl.mode(), UnitMode::Idle);
    }

    #[test]
    fn test_cooldown_survives_retarget() {
        let mut ctrl = UnitController::new();
        ctrl.engage(UnitId(2), 0);
        ctrl.record_attack(10);
        ctrl.retarget(UnitId(5), 12);

        assert_eq!(ctrl.target(), Some(UnitId(5)));
        assert!(!ctrl.cooldown_ready(20, 30));
        assert!(ctrl.cooldown_ready(40, 30));
    }

    #[test]
    fn test_death_published_once_per_life() {
        let mut ctrl = UnitController::new();
        assert!(ctrl.mark_death_published());
        assert!(!ctrl.mark_death_published());
        ctrl.revive();
        assert!(!ctrl.death_published());
        assert!(ctrl.mark_death_published());
    }

    #[test]
    fn test_stagger_stops_motion() {
        let mut ctrl = UnitController::new();
        ctrl.transition(UnitMode::Scouting);
        assert!(ctrl.start_motion(vec![Vec2::new(5.0, 0.0)]));
        ctrl.stagger(15);
        assert!(!ctrl.is_moving());
        assert!(ctrl.is_staggered(14));
        assert!(!ctrl.is_staggered(15));
    }

    #[test]
    fn test_motion_advances_through_waypoints() {
        let mut motion = Motion::new(vec![Vec2::new(1.0, 0.0), Vec2::new(1.0, 2.0)]).unwrap();
        let mut pos = Vec2::ZERO;

        assert_eq!(motion.advance(&mut pos, 1.5, 0.1), MotionStatus::Moving);
        assert!((pos - Vec2::new(1.0, 0.5)).length() < 1e-5);

        assert_eq!(motion.advance(&mut pos, 5.0, 0.1), MotionStatus::Arrived);
        assert_eq!(pos, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_empty_path_is_not_motion() {
        assert!(Motion::new(Vec::new()).is_none());
    }
}
