//! Progression integration tests: experience curve, awards and level changes

use squadfall::core::types::{Side, SkillType, UnitId, Vec2};
use squadfall::events::SimEvent;
use squadfall::progression::ProgressionService;
use squadfall::unit::stats::{experience_for_level, level_for_experience};
use squadfall::unit::{Unit, UnitConfig, UnitStore};

fn store_with(sides: &[Side]) -> UnitStore {
    let mut units = UnitStore::new();
    for &side in sides {
        let id = units.allocate_id();
        units.insert(Unit::new(id, side, format!("unit{}", id.0), Vec2::ZERO, UnitConfig::default()));
    }
    units
}

#[test]
fn test_level_curve_round_trip() {
    let config = UnitConfig::default();
    for level in 1..=60 {
        let threshold = experience_for_level(&config, level);
        assert_eq!(level_for_experience(&config, threshold), level);
        if threshold > 0 {
            assert_eq!(level_for_experience(&config, threshold - 1), level - 1);
        }
    }
}

#[test]
fn test_default_curve_thresholds() {
    let config = UnitConfig::default();
    assert_eq!(experience_for_level(&config, 1), 0);
    assert_eq!(experience_for_level(&config, 2), 100);
    // 100 * 2^1.5
    assert_eq!(experience_for_level(&config, 3), 283);
}

#[test]
fn test_reaching_next_level_grants_one_point() {
    let mut units = store_with(&[Side::Player]);
    let mut progression = ProgressionService::new();
    let id = UnitId(1);

    let event = progression.grant(&mut units, id, 100).unwrap();
    assert_eq!(
        event,
        Some(SimEvent::UnitLeveledUp {
            unit: id,
            old_level: 1,
            new_level: 2,
            skill_points: 1,
        })
    );
    let unit = units.get(id).unwrap();
    assert_eq!(unit.state.level, 2);
    assert_eq!(unit.state.skill_points, 1);
}

#[test]
fn test_multi_level_jump_grants_point_per_level() {
    let mut units = store_with(&[Side::Player]);
    let mut progression = ProgressionService::new();
    let id = UnitId(1);
    let config = UnitConfig::default();

    let xp = experience_for_level(&config, 5);
    let event = progression.grant(&mut units, id, xp).unwrap();
    assert!(matches!(
        event,
        Some(SimEvent::UnitLeveledUp {
            old_level: 1,
            new_level: 5,
            skill_points: 4,
            ..
        })
    ));
    assert_eq!(progression.total_awarded(), xp as u64);
}

#[test]
fn test_small_grant_does_not_level() {
    let mut units = store_with(&[Side::Player]);
    let mut progression = ProgressionService::new();

    assert_eq!(progression.grant(&mut units, UnitId(1), 99).unwrap(), None);
    assert_eq!(progression.grant(&mut units, UnitId(1), 0).unwrap(), None);
    assert_eq!(units.get(UnitId(1)).unwrap().state.level, 1);
}

#[test]
fn test_grant_to_unknown_unit_is_error() {
    let mut units = store_with(&[Side::Player]);
    let mut progression = ProgressionService::new();
    assert!(progression.grant(&mut units, UnitId(99), 10).is_err());
}

#[test]
fn test_lowering_experience_revokes_points() {
    let mut units = store_with(&[Side::Player]);
    let mut progression = ProgressionService::new();
    let id = UnitId(1);
    let config = UnitConfig::default();

    progression
        .set_experience(&mut units, id, experience_for_level(&config, 4))
        .unwrap();
    assert_eq!(units.get(id).unwrap().state.skill_points, 3);

    let event = progression
        .set_experience(&mut units, id, experience_for_level(&config, 2))
        .unwrap();
    assert!(matches!(
        event,
        Some(SimEvent::UnitLeveledUp {
            old_level: 4,
            new_level: 2,
            skill_points: 1,
            ..
        })
    ));
}

#[test]
fn test_revoke_never_goes_negative() {
    let mut units = store_with(&[Side::Player]);
    let mut progression = ProgressionService::new();
    let id = UnitId(1);
    let config = UnitConfig::default();

    progression
        .set_experience(&mut units, id, experience_for_level(&config, 3))
        .unwrap();
    {
        let unit = units.get_mut(id).unwrap();
        let config = unit.config.clone();
        unit.state.spend_skill_point(&config, SkillType::Speed).unwrap();
        unit.state.spend_skill_point(&config, SkillType::Speed).unwrap();
    }

    progression.set_experience(&mut units, id, 0).unwrap();
    let unit = units.get(id).unwrap();
    assert_eq!(unit.state.level, 1);
    assert_eq!(unit.state.skill_points, 0);
}

#[test]
fn test_damage_award_scales_with_victim_level() {
    let mut units = store_with(&[Side::Player, Side::Enemy]);
    let mut progression = ProgressionService::new();
    let config = UnitConfig::default();
    progression
        .set_experience(&mut units, UnitId(2), experience_for_level(&config, 3))
        .unwrap();

    let hit = SimEvent::UnitDamaged {
        attacker: UnitId(1),
        victim: UnitId(2),
        amount: 10.0,
        remaining_health: 90.0,
    };
    let follow_up = progression.handle(&mut units, &hit);
    assert!(follow_up.is_empty());
    // 0.5 xp per damage, times victim level 3
    assert_eq!(units.get(UnitId(1)).unwrap().state.experience, 15);
}

#[test]
fn test_kill_award_needs_a_killer() {
    let mut units = store_with(&[Side::Player, Side::Enemy]);
    let mut progression = ProgressionService::new();

    let unattributed = SimEvent::UnitDeath {
        victim: UnitId(2),
        killer: None,
    };
    assert!(progression.handle(&mut units, &unattributed).is_empty());
    assert_eq!(progression.total_awarded(), 0);

    let kill = SimEvent::UnitDeath {
        victim: UnitId(2),
        killer: Some(UnitId(1)),
    };
    progression.handle(&mut units, &kill);
    assert_eq!(units.get(UnitId(1)).unwrap().state.experience, 25);
}

#[test]
fn test_health_rank_raises_max_not_current() {
    let mut units = store_with(&[Side::Player]);
    let unit = units.get_mut(UnitId(1)).unwrap();
    let config = unit.config.clone();
    unit.state.skill_points = 1;
    unit.state.apply_damage(30.0);

    let rank = unit.state.spend_skill_point(&config, SkillType::Health).unwrap();
    assert_eq!(rank, 1);
    assert_eq!(unit.state.max_health, 110.0);
    assert_eq!(unit.state.health, 70.0);
    assert!(unit.state.spend_skill_point(&config, SkillType::Health).is_none());
}
