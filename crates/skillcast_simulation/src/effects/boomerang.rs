//! Boomerang: изогнутая траектория от кастера и обратно
//!
//! Outward: постоянная скорость, боковое curve ускорение (знак задаётся при спавне),
//! наведение на ближайшую цель только пока ни в кого не попали.
//! Дальше max_distance от точки спавна → Return.
//!
//! Return: поворот в плоскости XZ к ТЕКУЩЕЙ позиции кастера, сила поворота растёт
//! по мере приближения; высота плавно выравнивается к кастеру.
//! Ближе return_radius (XZ) → удаление.
//!
//! Попадания в обеих фазах, но не больше одного раза на цель.

use bevy::prelude::*;
use std::collections::BTreeSet;

use super::collision::{resolve_point_hit, Falloff, HitSource};
use super::steering::{blend_factor, direction_or, horizontal, horizontal_distance, lateral_axis, turn_direction};
use super::{EffectCommon, EffectContext, EffectHandler, EffectKind, EffectStatus, RemovalReason};
use crate::config::BoomerangTuning;
use crate::targeting::{nearest, TargetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoomerangPhase {
    Outward,
    Return,
}

impl BoomerangPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoomerangPhase::Outward => "outward",
            BoomerangPhase::Return => "return",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoomerangState {
    pub phase: BoomerangPhase,
    pub velocity: Vec3,
    /// Точка спавна (для max_distance)
    pub spawn_origin: Vec3,
    curve_sign: f32,
    has_hit_target: bool,
    hit_targets: BTreeSet<TargetId>,
}

impl BoomerangState {
    /// `curve_sign` > 0: изгиб вправо от направления броска, < 0: влево
    pub fn launch(spawn_origin: Vec3, velocity: Vec3, curve_sign: f32) -> Self {
        Self {
            phase: BoomerangPhase::Outward,
            velocity,
            spawn_origin,
            curve_sign: if curve_sign < 0.0 { -1.0 } else { 1.0 },
            has_hit_target: false,
            hit_targets: BTreeSet::new(),
        }
    }

    pub fn curve_sign(&self) -> f32 {
        self.curve_sign
    }

    /// Было ли хоть одно попадание (false → true, обратно никогда)
    pub fn has_hit_target(&self) -> bool {
        self.has_hit_target
    }

    pub fn hit_targets(&self) -> &BTreeSet<TargetId> {
        &self.hit_targets
    }

    fn steer_outward(&mut self, position: Vec3, tuning: &BoomerangTuning, ctx: &EffectContext<'_>) {
        let dt = ctx.dt;
        let forward = direction_or(horizontal(self.velocity), Vec3::Z);

        // Curve: боковое ускорение поворачивает направление, модуль скорости постоянный
        let curved = forward * tuning.speed + lateral_axis(forward) * tuning.curve_acceleration * self.curve_sign * dt;
        let mut dir = direction_or(curved, forward);

        if !self.has_hit_target {
            if let Some(target) = nearest(position, ctx.targets, Some(tuning.seek_range)) {
                let desired = direction_or(horizontal(target.position - position), dir);
                dir = turn_direction(dir, desired, blend_factor(tuning.seek_turn_rate, dt));
            }
        }

        self.velocity = dir * tuning.speed;
    }

    fn steer_return(&mut self, common: &mut EffectCommon, tuning: &BoomerangTuning, ctx: &EffectContext<'_>) {
        let dt = ctx.dt;
        let caster = ctx.caster_position;
        let forward = direction_or(horizontal(self.velocity), Vec3::Z);

        let to_caster = horizontal(caster - common.position);
        let distance = to_caster.length();
        let desired = direction_or(to_caster, forward);

        // Ближе к кастеру → резче поворот
        let closeness = (distance / tuning.max_distance).max(0.05);
        let blend = blend_factor(tuning.return_turn_rate / closeness, dt);
        let dir = turn_direction(forward, desired, blend);

        self.velocity = dir * tuning.speed;

        // Высота выравнивается к кастеру (отдельно от горизонтального движения)
        let ease = blend_factor(tuning.height_ease_rate, dt);
        common.position.y += (caster.y - common.position.y) * ease;
    }
}

impl EffectHandler for BoomerangState {
    fn update(&mut self, common: &mut EffectCommon, ctx: &mut EffectContext<'_>) -> EffectStatus {
        let all_tuning = ctx.tuning;
        let tuning = &all_tuning.boomerang;

        match self.phase {
            BoomerangPhase::Outward => self.steer_outward(common.position, tuning, ctx),
            BoomerangPhase::Return => self.steer_return(common, tuning, ctx),
        }

        common.position += self.velocity * ctx.dt;

        let targets = ctx.targets;
        let source = HitSource::new(common.id, EffectKind::Boomerang);
        let falloff = Falloff::new(tuning.falloff, tuning.min_damage_multiplier);
        let hit = resolve_point_hit(
            source,
            common.position,
            common.radius,
            common.damage,
            falloff,
            targets,
            Some(&mut self.hit_targets),
            |hit| ctx.apply_damage(hit),
        );
        if hit {
            self.has_hit_target = true;
        }

        match self.phase {
            BoomerangPhase::Outward => {
                if common.position.distance(self.spawn_origin) > tuning.max_distance {
                    self.phase = BoomerangPhase::Return;
                }
                EffectStatus::Alive
            }
            BoomerangPhase::Return => {
                if horizontal_distance(common.position, ctx.caster_position) <= tuning.return_radius {
                    EffectStatus::Remove(RemovalReason::Returned)
                } else {
                    EffectStatus::Alive
                }
            }
        }
    }

    fn velocity(&self) -> Option<Vec3> {
        Some(self.velocity)
    }

    fn phase_name(&self) -> &'static str {
        self.phase.as_str()
    }
}
