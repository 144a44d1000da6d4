//! Property tests for escalation, health bounds and the level curve

use proptest::prelude::*;

use squadfall::battle::rounds::{team_target, RoundScheduler};
use squadfall::core::config::{EscalationConfig, TeamsConfig};
use squadfall::core::types::{Side, SkillType};
use squadfall::unit::combat::apply_strike;
use squadfall::unit::stats::{experience_for_level, level_for_experience};
use squadfall::unit::{UnitConfig, UnitState};

#[derive(Debug, Clone)]
enum Op {
    Hit(f32),
    Spend(SkillType),
    Grant(u32),
    Heal,
}

fn skill() -> impl Strategy<Value = SkillType> {
    prop_oneof![
        Just(SkillType::Health),
        Just(SkillType::Damage),
        Just(SkillType::Defense),
        Just(SkillType::Speed),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.0f32..500.0).prop_map(Op::Hit),
        skill().prop_map(Op::Spend),
        (0u32..2_000).prop_map(Op::Grant),
        Just(Op::Heal),
    ]
}

proptest! {
    #[test]
    fn prop_team_targets_capped_and_monotonic(
        base in 0usize..8,
        offset in 0u32..8,
        cadence in 1u32..10,
        cap in 1usize..20,
        round in 1u32..500,
    ) {
        let now = team_target(round, base, offset, cadence, cap);
        let next = team_target(round + 1, base, offset, cadence, cap);
        prop_assert!(now <= cap);
        prop_assert!(now <= next);
        prop_assert!(next - now <= 1);
    }

    #[test]
    fn prop_scheduler_targets_respect_cap(round in 1u32..1_000, cap in 3usize..16) {
        let teams = TeamsConfig {
            max_team_size: cap,
            ..TeamsConfig::default()
        };
        let scheduler = RoundScheduler::new(&teams, &EscalationConfig::default());
        for side in Side::ALL {
            prop_assert!(scheduler.target(side, round) <= cap);
            prop_assert!(scheduler.target(side, round) >= 3);
        }
    }

    #[test]
    fn prop_health_stays_in_bounds(ops in prop::collection::vec(op(), 1..60)) {
        let config = UnitConfig::default();
        let mut state = UnitState::new(&config);

        for op in ops {
            match op {
                Op::Hit(output) => {
                    if let Some(strike) = apply_strike(output, &mut state) {
                        prop_assert!(strike.damage >= 1.0);
                    }
                }
                Op::Spend(skill) => {
                    let before = state.skill_points;
                    let spent = state.spend_skill_point(&config, skill).is_some();
                    prop_assert_eq!(spent, before > 0);
                }
                Op::Grant(xp) => {
                    state.add_experience(&config, xp);
                }
                Op::Heal => state.restore_full_health(),
            }
            prop_assert!(state.health >= 0.0);
            prop_assert!(state.health <= state.max_health);
            prop_assert!(state.damage_reduction <= config.max_defense);
        }
    }

    #[test]
    fn prop_points_match_levels_gained(grants in prop::collection::vec(0u32..5_000, 1..20)) {
        let config = UnitConfig::default();
        let mut state = UnitState::new(&config);
        for xp in grants {
            state.add_experience(&config, xp);
        }
        prop_assert_eq!(state.skill_points + state.ranks.total(), state.level - 1);
    }

    #[test]
    fn prop_level_curve_round_trip(level in 1u32..200) {
        let config = UnitConfig::default();
        let threshold = experience_for_level(&config, level);
        prop_assert_eq!(level_for_experience(&config, threshold), level);
    }

    #[test]
    fn prop_level_monotonic_in_experience(a in 0u32..1_000_000, b in 0u32..1_000_000) {
        let config = UnitConfig::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(level_for_experience(&config, low) <= level_for_experience(&config, high));
    }
}
