//! Steering helpers: общая математика поворота/скорости
//!
//! Все функции чистые: на вход векторы, на выход новый вектор.
//! Нормализация везде через try_normalize с fallback (нулевая скорость не даёт NaN).

use bevy::prelude::*;

/// Доля blend'а за тик: turn_rate × dt, зажато в [0, 1]
pub fn blend_factor(turn_rate: f32, dt: f32) -> f32 {
    let t = turn_rate * dt;
    if t.is_finite() {
        t.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Поворот направления: lerp нормализованных векторов + renormalize
///
/// Если current и desired противоположны и lerp дал ноль,
/// берём то направление, к которому ближе blend.
pub fn turn_direction(current: Vec3, desired: Vec3, blend: f32) -> Vec3 {
    let blend = blend.clamp(0.0, 1.0);
    current.lerp(desired, blend).try_normalize().unwrap_or(if blend >= 0.5 {
        desired
    } else {
        current
    })
}

/// Направление скорости, либо fallback если скорость нулевая/не конечна
pub fn direction_or(velocity: Vec3, fallback: Vec3) -> Vec3 {
    velocity.try_normalize().unwrap_or(fallback)
}

/// Зажимает модуль скорости в [min_speed, max_speed], направление сохраняется
///
/// Границы в любом порядке; NaN-граница игнорируется (f32::max/min), паники нет.
pub fn clamp_speed(velocity: Vec3, min_speed: f32, max_speed: f32, fallback_direction: Vec3) -> Vec3 {
    let (low, high) = if min_speed <= max_speed {
        (min_speed, max_speed)
    } else {
        (max_speed, min_speed)
    };
    let speed = velocity.length();
    let direction = direction_or(velocity, fallback_direction);
    direction * speed.max(low).min(high)
}

/// Проекция на горизонтальную плоскость XZ
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Дистанция в плоскости XZ
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    horizontal(b - a).length()
}

/// Боковая ось для curve (перпендикуляр к направлению в XZ)
///
/// Для направления +Z возвращает +X. Для вертикального/нулевого: ZERO.
pub fn lateral_axis(direction: Vec3) -> Vec3 {
    Vec3::Y.cross(horizontal(direction)).try_normalize().unwrap_or(Vec3::ZERO)
}

/// Height-hold: вертикальное ускорение к cruise_height (PD, критическое демпфирование)
pub fn height_hold_acceleration(height: f32, vertical_speed: f32, cruise_height: f32, gain: f32) -> f32 {
    let gain = gain.max(0.0);
    (cruise_height - height) * gain - vertical_speed * 2.0 * gain.sqrt()
}
