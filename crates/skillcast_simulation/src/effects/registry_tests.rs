//! Tests for EffectRegistry lifecycle.

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::*;
    use crate::config::EffectTuning;
    use crate::logger::{self, LogLevel, MemoryLogger};
    use bevy::prelude::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_ids_are_unique_and_never_reused() {
        let mut harness = Harness::new();
        let a = harness.spawn(inert(0.0, Lifespan::Finite(0.01)));
        let b = harness.spawn(inert(0.0, Lifespan::Finite(0.01)));
        assert_ne!(a, b);

        harness.run(3);
        assert!(harness.registry.is_empty());

        let c = harness.spawn(inert(harness.now, Lifespan::Infinite));
        assert!(c > b && c > a);
    }

    #[test]
    fn test_spawn_visible_before_first_update() {
        let tuning = EffectTuning::default();
        let mut harness = Harness::with_tuning(tuning.clone());
        let start = Vec3::new(0.0, 1.0, 0.0);

        let id = harness.spawn(missile(start, Vec3::new(0.0, 9.0, 4.0), 10.0, &tuning));

        // В snapshot'е сразу, но ещё не сдвинут
        let effect = harness.registry.get(id).expect("visible immediately");
        assert_eq!(effect.position(), start);
        assert_eq!(harness.registry.snapshot().len(), 1);
    }

    #[test]
    fn test_expires_on_first_tick_past_duration() {
        let mut harness = Harness::new();
        harness.dt = 0.016;
        let id = harness.spawn(inert(0.0, Lifespan::Finite(2.0)));

        for _ in 0..200 {
            harness.step();
            let alive = harness.registry.get(id).is_some();
            assert_eq!(alive, harness.now <= 2.0, "now = {}", harness.now);
            if !alive {
                break;
            }
        }
        assert_eq!(harness.removal_reason(id), Some(RemovalReason::Expired));
    }

    #[test]
    fn test_infinite_lifespan_never_expires() {
        let mut harness = Harness::new();
        let id = harness.spawn(inert(0.0, Lifespan::Infinite));
        harness.run_for(30.0);
        assert!(harness.registry.get(id).is_some());
    }

    #[test]
    fn test_age_is_monotonic() {
        let mut harness = Harness::new();
        let id = harness.spawn(inert(0.0, Lifespan::Infinite));

        let mut last_age = f32::NEG_INFINITY;
        for _ in 0..20 {
            harness.step();
            let age = harness.registry.get(id).unwrap().age(harness.now);
            assert!(age > last_age);
            last_age = age;
        }
    }

    #[test]
    fn test_non_finite_effect_removed() {
        let memory = MemoryLogger::default();
        logger::set_logger(Box::new(memory.clone()));

        let tuning = EffectTuning::default();
        let mut harness = Harness::with_tuning(tuning.clone());
        let id = harness.spawn(missile(Vec3::new(f32::NAN, 1.0, 0.0), Vec3::Y, 10.0, &tuning));
        let healthy = harness.spawn(missile(Vec3::Y, Vec3::new(0.0, 9.0, 1.0), 10.0, &tuning));

        harness.run(5);
        logger::clear_logger();

        assert_eq!(harness.removal_reason(id), Some(RemovalReason::Invalid));
        assert!(harness.registry.get(healthy).is_some());
        assert!(harness.hits.is_empty());

        // Одна warning-строка на невалидный эффект, даже через несколько тиков
        let lines = memory.lines.lock().unwrap();
        let warnings: Vec<_> = lines
            .iter()
            .filter(|(level, message)| *level == LogLevel::Warning && message.contains("non-finite state"))
            .collect();
        assert_eq!(warnings.len(), 1, "warnings: {:?}", warnings);
        assert!(warnings[0].1.contains(&format!("{:?}", id)));
    }

    #[test]
    fn test_invalid_tuning_falls_back_to_defaults() {
        let mut tuning = EffectTuning::default();
        tuning.missile.min_speed = 20.0;
        tuning.missile.max_speed = 10.0;
        assert!(tuning.validate().is_err());

        let registry = EffectRegistry::new(tuning.clone(), 1);
        assert_eq!(registry.tuning(), &EffectTuning::default());

        // Тот же tuning через factory: missile'ы проходят Seeking без паники
        let mut harness = Harness::with_tuning(tuning);
        harness.targets = vec![crate::targeting::Target::new(1, Vec3::new(4.0, 1.0, 25.0))];
        harness.cast(crate::config::SkillId::MagicMissile, Vec3::Z);
        harness.run_for(3.0);

        assert_eq!(harness.factory.tuning, EffectTuning::default());
        assert!(harness.registry.snapshot().iter().all(|e| e.is_kinematically_valid()));
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut tuning = EffectTuning::default();
        tuning.max_active_effects = Some(3);
        let mut harness = Harness::with_tuning(tuning);

        let ids: Vec<EffectId> = (0..5).map(|_| harness.spawn(inert(0.0, Lifespan::Infinite))).collect();

        let remaining: Vec<EffectId> = harness.registry.snapshot().iter().map(|e| e.id()).collect();
        assert_eq!(remaining, ids[2..].to_vec());
    }

    #[test]
    fn test_oversized_batch_returns_only_live_ids() {
        let mut tuning = EffectTuning::default();
        tuning.max_active_effects = Some(3);
        let mut harness = Harness::with_tuning(tuning);

        // 7 ракет при лимите 3
        let ids = harness.cast(crate::config::SkillId::MagicMissile, Vec3::Z);

        assert_eq!(ids.len(), 3);
        let live: Vec<EffectId> = harness.registry.snapshot().iter().map(|e| e.id()).collect();
        assert_eq!(ids, live);
        assert!(ids.iter().all(|id| harness.registry.get(*id).is_some()));
    }

    #[test]
    fn test_unbounded_cap() {
        let mut tuning = EffectTuning::default();
        tuning.max_active_effects = None;
        let mut harness = Harness::with_tuning(tuning);

        for _ in 0..2000 {
            harness.spawn(inert(0.0, Lifespan::Infinite));
        }
        assert_eq!(harness.registry.len(), 2000);
    }

    #[test]
    fn test_observer_sees_count_changes() {
        let mut harness = Harness::new();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();
        harness.registry.on_active_count_changed(move |change| {
            sink.lock().unwrap().push(change);
        });

        harness.spawn(inert(0.0, Lifespan::Finite(0.01)));
        harness.spawn(inert(0.0, Lifespan::Infinite));
        harness.step();
        // Тик без изменений: без уведомления
        harness.step();

        let changes = changes.lock().unwrap();
        assert_eq!(
            *changes,
            vec![
                ActiveCountChange { previous: 0, current: 1 },
                ActiveCountChange { previous: 1, current: 2 },
                ActiveCountChange { previous: 2, current: 1 },
            ]
        );
    }

    #[test]
    fn test_trail_pruned_on_removal() {
        let tuning = EffectTuning::default();
        let mut harness = Harness::with_tuning(tuning.clone());
        let id = harness.spawn(missile(Vec3::new(0.0, 0.2, 0.0), Vec3::new(0.0, -5.0, 1.0), 10.0, &tuning));

        harness.step();
        assert!(harness.registry.trail(id).is_some());

        harness.run(10);
        assert_eq!(harness.removal_reason(id), Some(RemovalReason::Grounded));
        assert!(harness.registry.trail(id).is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut harness = Harness::new();
        harness.spawn(inert(0.0, Lifespan::Infinite));
        let before = harness.spawn(inert(0.0, Lifespan::Infinite));

        harness.registry.reset();
        assert!(harness.registry.is_empty());

        // id counter продолжает расти
        let after = harness.spawn(inert(0.0, Lifespan::Infinite));
        assert!(after > before);
    }

    #[test]
    fn test_invalid_dt_treated_as_zero() {
        let tuning = EffectTuning::default();
        let mut harness = Harness::with_tuning(tuning.clone());
        let start = Vec3::new(0.0, 1.0, 0.0);
        let id = harness.spawn(missile(start, Vec3::new(0.0, 9.0, 4.0), 10.0, &tuning));

        let input = TickInput {
            dt: f32::NAN,
            now: 0.0,
            targets: &[],
            caster_position: Vec3::ZERO,
        };
        harness.registry.tick(input, |_| {});

        assert_eq!(harness.registry.get(id).unwrap().position(), start);
    }
}
