//! Tests for nova expansion and damage window.

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::*;
    use crate::config::{LevelScaled, SkillId, SkillTable};
    use crate::targeting::Target;
    use bevy::prelude::*;

    fn nova_table(radius: f32) -> SkillTable {
        let mut table = SkillTable::default();
        table.nova.radius = LevelScaled::new(radius, 0.0);
        table.nova.damage = LevelScaled::new(40.0, 0.0);
        table
    }

    #[test]
    fn test_near_target_hit_once_far_target_never() {
        let mut harness = Harness::with_tables(nova_table(5.0), Default::default());
        harness.dt = 0.016;
        harness.targets = vec![
            Target::new(1, Vec3::new(2.0, 0.0, 0.0)),
            Target::new(2, Vec3::new(8.0, 0.0, 0.0)),
        ];

        harness.cast(SkillId::Nova, Vec3::Z);
        harness.run(50);

        let near = harness.hits_on(1);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].amount, 40.0);
        assert_eq!(near[0].kind, EffectKind::Nova);
        assert!(harness.hits_on(2).is_empty());
    }

    #[test]
    fn test_radius_grows_then_caps() {
        assert_eq!(NovaState::radius_at(0.0, 5.0, 0.8), 0.0);
        assert_eq!(NovaState::radius_at(0.4, 5.0, 0.8), 2.5);
        assert_eq!(NovaState::radius_at(0.8, 5.0, 0.8), 5.0);
        assert_eq!(NovaState::radius_at(1.4, 5.0, 0.8), 5.0);
    }

    #[test]
    fn test_no_damage_after_expansion_window() {
        let mut harness = Harness::with_tables(nova_table(5.0), Default::default());
        let id = harness.cast(SkillId::Nova, Vec3::Z)[0];

        // 0.6 × 0.8 = 0.48 с окно урона; цель появляется позже
        harness.run_for(0.55);
        harness.targets = vec![Target::new(1, Vec3::new(1.0, 0.0, 0.0))];
        harness.run_for(0.2);

        assert!(harness.hits.is_empty());
        let state = harness.registry.get(id).and_then(|e| e.nova().cloned()).expect("still fading");
        assert!(state.fading);
        assert_eq!(state.current_radius, 5.0);
    }

    #[test]
    fn test_lives_for_fade_fraction_of_duration() {
        let mut harness = Harness::with_tables(nova_table(5.0), Default::default());
        let id = harness.cast(SkillId::Nova, Vec3::Z)[0];

        // duration 0.6 × fade 1.5 = 0.9 с
        let reason = harness.run_until_removed(id, 2.0);
        assert_eq!(reason, Some(RemovalReason::Expired));
        assert!(harness.now > 0.9 && harness.now < 0.9 + 2.0 * DT);
    }
}
