//! Magic Missile: самонаводящийся снаряд
//!
//! Фазы:
//! - Rising: полная гравитация, баллистический подъём после запуска
//! - Seeking: ослабленная гравитация, наведение на ближайшую цель с упреждением,
//!   разгон + clamp скорости в [min_speed, max_speed]. Без цели: удержание высоты,
//!   после lost_target_grace секунд → Falling
//! - Falling: полная гравитация, без управления
//!
//! Попадание (distance ≤ hit radius) в любой фазе → урон с falloff + удаление.
//! Ниже ground_height без попадания → удаление без урона.

use bevy::prelude::*;

use super::collision::{resolve_point_hit, Falloff, HitSource};
use super::steering::{blend_factor, clamp_speed, direction_or, height_hold_acceleration, turn_direction};
use super::{EffectCommon, EffectContext, EffectHandler, EffectKind, EffectStatus, RemovalReason};
use crate::config::MissileTuning;
use crate::targeting::{nearest, TargetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissilePhase {
    Rising,
    Seeking,
    Falling,
}

impl MissilePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissilePhase::Rising => "rising",
            MissilePhase::Seeking => "seeking",
            MissilePhase::Falling => "falling",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissileState {
    pub phase: MissilePhase,
    pub velocity: Vec3,
    /// Цель, на которую наводились в последнем тике (для рендера/отладки)
    pub locked_target: Option<TargetId>,
    /// Секунд подряд в Seeking без цели
    pub time_without_target: f32,
}

impl MissileState {
    /// Только что запущенная ракета (всегда Rising)
    pub fn launch(velocity: Vec3) -> Self {
        Self {
            phase: MissilePhase::Rising,
            velocity,
            locked_target: None,
            time_without_target: 0.0,
        }
    }

    fn update_rising(&mut self, position: Vec3, tuning: &MissileTuning, ctx: &EffectContext<'_>) {
        self.velocity.y -= tuning.gravity * ctx.dt;

        if position.y < tuning.min_seek_height {
            return;
        }

        let apex_reached = self.velocity.y <= 0.0;
        let target_in_range = nearest(position, ctx.targets, Some(tuning.seek_range)).is_some();
        if apex_reached || target_in_range {
            self.phase = MissilePhase::Seeking;
            // Вход в Seeking сразу нормализует скорость
            self.velocity = clamp_speed(self.velocity, tuning.min_speed, tuning.max_speed, Vec3::Y);
        }
    }

    fn update_seeking(&mut self, position: Vec3, tuning: &MissileTuning, ctx: &EffectContext<'_>) {
        let dt = ctx.dt;
        self.velocity.y -= tuning.gravity * tuning.seek_gravity_scale * dt;

        match nearest(position, ctx.targets, Some(tuning.seek_range)) {
            Some(target) => {
                self.locked_target = Some(target.id);
                self.time_without_target = 0.0;

                let current_dir = direction_or(self.velocity, Vec3::Y);
                let aim_point = target.predicted_position(tuning.prediction_lead);
                let desired_dir = direction_or(aim_point - position, current_dir);
                let dir = turn_direction(current_dir, desired_dir, blend_factor(tuning.turn_rate, dt));

                let speed = self.velocity.length() + tuning.acceleration * dt;
                self.velocity = dir * speed;
            }
            None => {
                self.locked_target = None;
                self.time_without_target += dt;
                self.velocity.y += height_hold_acceleration(
                    position.y,
                    self.velocity.y,
                    tuning.cruise_height,
                    tuning.height_hold_gain,
                ) * dt;

                if self.time_without_target >= tuning.lost_target_grace {
                    self.phase = MissilePhase::Falling;
                }
            }
        }

        // Clamp: последний шаг, после steering и разгона
        self.velocity = clamp_speed(self.velocity, tuning.min_speed, tuning.max_speed, Vec3::Y);
    }
}

impl EffectHandler for MissileState {
    fn update(&mut self, common: &mut EffectCommon, ctx: &mut EffectContext<'_>) -> EffectStatus {
        let all_tuning = ctx.tuning;
        let tuning = &all_tuning.missile;

        match self.phase {
            MissilePhase::Rising => self.update_rising(common.position, tuning, ctx),
            MissilePhase::Seeking => self.update_seeking(common.position, tuning, ctx),
            MissilePhase::Falling => self.velocity.y -= tuning.gravity * ctx.dt,
        }

        common.position += self.velocity * ctx.dt;

        let targets = ctx.targets;
        let source = HitSource::new(common.id, EffectKind::Missile);
        let falloff = Falloff::new(tuning.falloff, tuning.min_damage_multiplier);
        let hit = resolve_point_hit(
            source,
            common.position,
            common.radius,
            common.damage,
            falloff,
            targets,
            None,
            |hit| ctx.apply_damage(hit),
        );
        if hit {
            return EffectStatus::Remove(RemovalReason::HitTerminal);
        }

        if common.position.y < tuning.ground_height {
            return EffectStatus::Remove(RemovalReason::Grounded);
        }

        EffectStatus::Alive
    }

    fn velocity(&self) -> Option<Vec3> {
        Some(self.velocity)
    }

    fn phase_name(&self) -> &'static str {
        self.phase.as_str()
    }
}
