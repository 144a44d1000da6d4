//! Combat resolution and target selection
//!
//! Resolution is split into a read-only plan over a snapshot of both
//! units and an apply step that mutates the victim, so the two units
//! never need to be borrowed mutably at the same time.

use ordered_float::OrderedFloat;

use crate::core::types::{Side, UnitId, Vec2};
use crate::unit::state::UnitState;
use crate::unit::stats;

/// Read-only view of a potential target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub id: UnitId,
    pub side: Side,
    pub position: Vec2,
    pub alive: bool,
}

/// What an engaged unit does this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CombatStep {
    /// Target dead, missing, or beyond detection range
    Disengage,
    /// Cooldown still running
    Wait,
    Attack { target: UnitId },
    Chase { destination: Vec2 },
}

#[derive(Debug, Clone, Copy)]
pub struct CombatRanges {
    pub attack_range: f32,
    pub detection_range: f32,
}

/// Decide the combat step for a unit at `position`
pub fn plan_combat_step(
    position: Vec2,
    target: Option<TargetView>,
    cooldown_ready: bool,
    ranges: CombatRanges,
) -> CombatStep {
    let Some(target) = target else {
        return CombatStep::Disengage;
    };
    let distance = position.distance(target.position);
    if !target.alive || distance > ranges.detection_range {
        return CombatStep::Disengage;
    }
    if !cooldown_ready {
        return CombatStep::Wait;
    }
    if distance <= ranges.attack_range {
        CombatStep::Attack { target: target.id }
    } else {
        CombatStep::Chase {
            destination: target.position,
        }
    }
}

/// Result of one landed hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub damage: f32,
    pub remaining_health: f32,
    pub killed: bool,
}

/// Apply an attack with `damage_output` to `victim`
///
/// A hit on an already dead victim does nothing and returns `None`.
pub fn apply_strike(damage_output: f32, victim: &mut UnitState) -> Option<Strike> {
    if !victim.is_alive() {
        return None;
    }
    let damage = stats::final_damage(damage_output, victim.damage_reduction);
    victim.apply_damage(damage);
    Some(Strike {
        damage,
        remaining_health: victim.health,
        killed: !victim.is_alive(),
    })
}

/// Nearest living enemy of `side` within `range`
///
/// Candidates must come in id order. Equal distances keep the earlier
/// candidate, so ties go to the lowest id.
pub fn nearest_enemy<I>(position: Vec2, side: Side, range: f32, candidates: I) -> Option<(UnitId, f32)>
where
    I: IntoIterator<Item = TargetView>,
{
    candidates
        .into_iter()
        .filter(|c| c.alive && c.side != side)
        .map(|c| (c.id, position.distance(c.position)))
        .filter(|(_, distance)| *distance <= range)
        .min_by_key(|(_, distance)| OrderedFloat(*distance))
}

/// Face from `from` toward `to`, keeping `current` when they coincide
pub fn facing_toward(from: Vec2, to: Vec2, current: Vec2) -> Vec2 {
    (to - from).try_normalize().unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::config::UnitConfig;

    fn view(id: u32, side: Side, x: f32, alive: bool) -> TargetView {
        TargetView {
            id: UnitId(id),
            side,
            position: Vec2::new(x, 0.0),
            alive,
        }
    }

    const RANGES: CombatRanges = CombatRanges {
        attack_range: 1.5,
        detection_range: 20.0,
    };

    #[test]
    fn test_plan_attack_in_range() {
        let target = view(2, Side::Enemy, 1.0, true);
        assert_eq!(
            plan_combat_step(Vec2::ZERO, Some(target), true, RANGES),
            CombatStep::Attack { target: UnitId(2) }
        );
    }

    #[test]
    fn test_plan_chase_out_of_range() {
        let target = view(2, Side::Enemy, 8.0, true);
        assert_eq!(
            plan_combat_step(Vec2::ZERO, Some(target), true, RANGES),
            CombatStep::Chase {
                destination: Vec2::new(8.0, 0.0)
            }
        );
    }

    #[test]
    fn test_plan_waits_on_cooldown() {
        let target = view(2, Side::Enemy, 1.0, true);
        assert_eq!(
            plan_combat_step(Vec2::ZERO, Some(target), false, RANGES),
            CombatStep::Wait
        );
    }

    #[test]
    fn test_plan_disengages_invalid_targets() {
        let dead = view(2, Side::Enemy, 1.0, false);
        let far = view(3, Side::Enemy, 25.0, true);
        assert_eq!(plan_combat_step(Vec2::ZERO, Some(dead), true, RANGES), CombatStep::Disengage);
        assert_eq!(plan_combat_step(Vec2::ZERO, Some(far), true, RANGES), CombatStep::Disengage);
        assert_eq!(plan_combat_step(Vec2::ZERO, None, true, RANGES), CombatStep::Disengage);
    }

    #[test]
    fn test_strike_applies_reduction_and_floor() {
        let config = UnitConfig::default();
        let mut victim = UnitState::new(&config);
        victim.damage_reduction = 0.5;

        let strike = apply_strike(10.0, &mut victim).unwrap();
        assert_eq!(strike.damage, 5.0);
        assert_eq!(strike.remaining_health, 95.0);

        victim.damage_reduction = 0.99;
        let strike = apply_strike(1.0, &mut victim).unwrap();
        assert_eq!(strike.damage, 1.0);
    }

    #[test]
    fn test_strike_kills_once() {
        let config = UnitConfig::default();
        let mut victim = UnitState::new(&config);
        victim.health = 3.0;

        let strike = apply_strike(50.0, &mut victim).unwrap();
        assert!(strike.killed);
        assert_eq!(victim.health, 0.0);
        assert!(apply_strike(50.0, &mut victim).is_none());
    }

    #[test]
    fn test_nearest_enemy_ties_go_to_lowest_id() {
        let candidates = vec![
            view(1, Side::Player, 0.5, true),
            view(2, Side::Enemy, 3.0, true),
            view(3, Side::Enemy, -3.0, true),
            view(4, Side::Enemy, 1.0, false),
        ];
        let found = nearest_enemy(Vec2::ZERO, Side::Player, 10.0, candidates);
        assert_eq!(found.map(|(id, _)| id), Some(UnitId(2)));
    }

    #[test]
    fn test_nearest_enemy_respects_range() {
        let candidates = vec![view(2, Side::Enemy, 30.0, true)];
        assert!(nearest_enemy(Vec2::ZERO, Side::Player, 20.0, candidates).is_none());
    }

    #[test]
    fn test_facing_keeps_current_on_overlap() {
        let current = Vec2::Y;
        assert_eq!(facing_toward(Vec2::ONE, Vec2::ONE, current), current);
        assert_eq!(facing_toward(Vec2::ZERO, Vec2::new(3.0, 0.0), current), Vec2::X);
    }
}
