//! Collision: distance-based попадания и расчёт урона
//!
//! Два режима:
//! - point hit (снаряды): distance ≤ radius, урон с falloff по дистанции
//! - area (nova): distance < live radius, плоский урон, один раз на цель
//!
//! Физического движка нет: только дистанции до snapshot'а целей.

use bevy::prelude::*;
use std::collections::BTreeSet;

use super::{DamageHit, EffectId, EffectKind};
use crate::targeting::{Target, TargetId};

/// Кто бьёт (попадает в DamageHit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitSource {
    pub effect: EffectId,
    pub kind: EffectKind,
}

impl HitSource {
    pub fn new(effect: EffectId, kind: EffectKind) -> Self {
        Self { effect, kind }
    }

    pub fn hit(&self, target: TargetId, amount: f32) -> DamageHit {
        DamageHit {
            effect: self.effect,
            kind: self.kind,
            target,
            amount,
        }
    }
}

/// Falloff параметры снаряда
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Falloff {
    pub falloff: f32,
    pub min_multiplier: f32,
}

impl Falloff {
    /// Без falloff (полный урон на любой дистанции)
    pub const NONE: Falloff = Falloff {
        falloff: 0.0,
        min_multiplier: 1.0,
    };

    pub fn new(falloff: f32, min_multiplier: f32) -> Self {
        Self {
            falloff,
            min_multiplier,
        }
    }

    /// multiplier = 1 − (d / r) × falloff, не ниже min_multiplier
    ///
    /// r ≤ 0 → сразу min_multiplier (деления на ноль нет).
    pub fn multiplier(&self, distance: f32, radius: f32) -> f32 {
        if !(radius > 0.0) || !distance.is_finite() {
            return self.min_multiplier;
        }
        (1.0 - (distance / radius) * self.falloff).max(self.min_multiplier)
    }

    pub fn damage(&self, base: f32, distance: f32, radius: f32) -> f32 {
        base * self.multiplier(distance, radius)
    }
}

/// Point hit: урон каждой валидной цели с distance ≤ radius
///
/// `already_hit`: once-per-target фильтр (boomerang). Попавшие цели добавляются в set.
/// Возвращает true если было хотя бы одно попадание.
pub fn resolve_point_hit<F>(
    source: HitSource,
    center: Vec3,
    radius: f32,
    base_damage: f32,
    falloff: Falloff,
    targets: &[Target],
    mut already_hit: Option<&mut BTreeSet<TargetId>>,
    mut apply: F,
) -> bool
where
    F: FnMut(DamageHit),
{
    if !center.is_finite() {
        return false;
    }

    let mut hit_any = false;
    for target in targets.iter().filter(|t| t.is_valid()) {
        if already_hit.as_deref().is_some_and(|set| set.contains(&target.id)) {
            continue;
        }

        let distance = center.distance(target.position);
        if distance > radius {
            continue;
        }

        apply(source.hit(target.id, falloff.damage(base_damage, distance, radius)));
        if let Some(set) = already_hit.as_deref_mut() {
            set.insert(target.id);
        }
        hit_any = true;
    }
    hit_any
}

/// Area: плоский урон каждой цели строго внутри live_radius, один раз на цель
///
/// Возвращает количество новых попаданий.
pub fn resolve_area<F>(
    source: HitSource,
    center: Vec3,
    live_radius: f32,
    damage: f32,
    targets: &[Target],
    already_hit: &mut BTreeSet<TargetId>,
    mut apply: F,
) -> usize
where
    F: FnMut(DamageHit),
{
    if !center.is_finite() || !(live_radius > 0.0) {
        return 0;
    }

    let mut hits = 0;
    for target in crate::targeting::within_radius(center, targets, live_radius) {
        if already_hit.insert(target.id) {
            apply(source.hit(target.id, damage));
            hits += 1;
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> HitSource {
        HitSource::new(EffectId(1), EffectKind::Missile)
    }

    #[test]
    fn test_falloff_multiplier() {
        let f = Falloff::new(0.5, 0.5);
        assert_eq!(f.multiplier(0.0, 2.0), 1.0);
        assert_eq!(f.multiplier(1.0, 2.0), 0.75);
        // Floor
        assert_eq!(Falloff::new(2.0, 0.4).multiplier(2.0, 2.0), 0.4);
    }

    #[test]
    fn test_zero_radius_uses_min_multiplier() {
        let f = Falloff::new(0.5, 0.3);
        assert_eq!(f.multiplier(0.0, 0.0), 0.3);
        assert_eq!(f.damage(100.0, 0.0, 0.0), 30.0);
    }

    #[test]
    fn test_point_hit_applies_falloff() {
        let targets = [
            Target::new(1, Vec3::new(0.5, 0.0, 0.0)),
            Target::new(2, Vec3::new(3.0, 0.0, 0.0)),
        ];
        let mut hits = Vec::new();

        let hit = resolve_point_hit(source(), Vec3::ZERO, 1.0, 40.0, Falloff::new(0.5, 0.5), &targets, None, |h| {
            hits.push(h)
        });

        assert!(hit);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, TargetId(1));
        assert_eq!(hits[0].amount, 30.0);
    }

    #[test]
    fn test_point_hit_once_per_target() {
        let targets = [Target::new(1, Vec3::ZERO)];
        let mut seen = BTreeSet::new();
        let mut count = 0;

        for _ in 0..3 {
            resolve_point_hit(source(), Vec3::ZERO, 1.0, 10.0, Falloff::NONE, &targets, Some(&mut seen), |_| {
                count += 1
            });
        }
        assert_eq!(count, 1);
        assert!(seen.contains(&TargetId(1)));
    }

    #[test]
    fn test_area_is_strict_and_once() {
        let targets = [
            Target::new(1, Vec3::new(2.0, 0.0, 0.0)),
            Target::new(2, Vec3::new(5.0, 0.0, 0.0)),
        ];
        let mut seen = BTreeSet::new();
        let mut hits = Vec::new();

        assert_eq!(resolve_area(source(), Vec3::ZERO, 5.0, 20.0, &targets, &mut seen, |h| hits.push(h)), 1);
        assert_eq!(resolve_area(source(), Vec3::ZERO, 5.0, 20.0, &targets, &mut seen, |h| hits.push(h)), 0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].amount, 20.0);
    }

    #[test]
    fn test_nan_center_never_hits() {
        let targets = [Target::new(1, Vec3::ZERO)];
        let hit = resolve_point_hit(source(), Vec3::NAN, 1.0, 10.0, Falloff::NONE, &targets, None, |_| {
            panic!("no damage expected")
        });
        assert!(!hit);
    }
}
