//! Targeting: read-only запросы к snapshot'у целей
//!
//! Цели (враги) живут снаружи симуляции: ядро только читает snapshot,
//! обновлённый один раз перед tick(), и запрашивает урон через callback.
//!
//! Tie-break: при равной дистанции побеждает цель, встреченная первой
//! в порядке snapshot'а (сравнение строгое `<`).

use bevy::prelude::*;
use std::collections::BTreeSet;


/// Stable ID внешней цели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// Внешняя цель (read-only с точки зрения симуляции)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub position: Vec3,
    pub alive: bool,
    /// Скорость цели, если известна (для упреждения)
    pub velocity: Option<Vec3>,
}

impl Target {
    pub fn new(id: u64, position: Vec3) -> Self {
        Self {
            id: TargetId(id),
            position,
            alive: true,
            velocity: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn dead(mut self) -> Self {
        self.alive = false;
        self
    }

    /// Живая цель с конечной позицией. Всё остальное молча пропускается.
    pub fn is_valid(&self) -> bool {
        self.alive && self.position.is_finite()
    }

    /// Упреждённая позиция: position + velocity × lead (velocity игнорируется если не конечна)
    pub fn predicted_position(&self, lead: f32) -> Vec3 {
        match self.velocity {
            Some(v) if v.is_finite() => self.position + v * lead,
            _ => self.position,
        }
    }
}

/// Ближайшая валидная цель к `origin` (O(n) линейный проход)
///
/// `max_range` отсекает цели дальше радиуса ДО сравнения.
pub fn nearest<'a>(origin: Vec3, targets: &'a [Target], max_range: Option<f32>) -> Option<&'a Target> {
    nearest_matching(origin, targets, max_range, |_| true)
}

/// Ближайшая цель, которой нет в `visited` (chain lightning)
pub fn nearest_unvisited<'a>(
    origin: Vec3,
    targets: &'a [Target],
    max_range: Option<f32>,
    visited: &BTreeSet<TargetId>,
) -> Option<&'a Target> {
    nearest_matching(origin, targets, max_range, |t| !visited.contains(&t.id))
}

/// Общий проход: фильтр + строгий минимум по дистанции
pub fn nearest_matching<'a, F>(
    origin: Vec3,
    targets: &'a [Target],
    max_range: Option<f32>,
    mut filter: F,
) -> Option<&'a Target>
where
    F: FnMut(&Target) -> bool,
{
    if !origin.is_finite() {
        return None;
    }

    let max_range_sq = max_range.map(|r| r * r);
    let mut best: Option<(&Target, f32)> = None;

    for target in targets.iter() {
        if !target.is_valid() || !filter(target) {
            continue;
        }

        let distance_sq = origin.distance_squared(target.position);
        if let Some(limit) = max_range_sq {
            if distance_sq > limit {
                continue;
            }
        }

        match best {
            Some((_, best_sq)) if distance_sq >= best_sq => {}
            _ => best = Some((target, distance_sq)),
        }
    }

    best.map(|(target, _)| target)
}

/// Все валидные цели строго внутри радиуса (area эффекты)
pub fn within_radius<'a>(
    origin: Vec3,
    targets: &'a [Target],
    radius: f32,
) -> impl Iterator<Item = &'a Target> + 'a {
    let radius_sq = radius * radius;
    targets
        .iter()
        .filter(move |t| t.is_valid() && origin.distance_squared(t.position) < radius_sq)
}
