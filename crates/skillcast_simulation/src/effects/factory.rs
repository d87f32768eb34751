//! EffectFactory: каст скилла → набор новых эффектов
//!
//! Параметры берутся из SkillTable (по уровню) + EffectTuning (физика).
//! Factory не знает про registry: возвращает `NewEffect`, id выдаёт registry.

use bevy::prelude::*;
use thiserror::Error;

use super::{
    BoomerangState, ChainState, EffectBody, Lifespan, MissileState, NewEffect, NovaState, StormState,
};
use crate::config::{EffectTuning, SkillId, SkillTable, MAX_SKILL_LEVEL};
use crate::logger;

/// Запрос каста (позиция/направление кастера: на момент каста)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastRequest {
    pub skill: SkillId,
    pub level: u32,
    pub caster_position: Vec3,
    /// Направление броска (нормализуется в XZ; ноль → +Z)
    pub direction: Vec3,
    pub now: f32,
}

impl CastRequest {
    pub fn new(skill: SkillId, level: u32, caster_position: Vec3, direction: Vec3, now: f32) -> Self {
        Self {
            skill,
            level,
            caster_position,
            direction,
            now,
        }
    }
}

/// Каст отклонён (ничего не заспавнено)
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CastError {
    #[error("caster position is not finite: {0:?}")]
    InvalidOrigin(Vec3),

    #[error("cast direction is not finite: {0:?}")]
    InvalidDirection(Vec3),

    #[error("skill level {0} is outside 1..={max}", max = MAX_SKILL_LEVEL)]
    InvalidLevel(u32),

    #[error("cast time is not finite: {0}")]
    InvalidTime(f32),
}

/// Фабрика эффектов (Bevy Resource, Default = боевые таблицы)
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct EffectFactory {
    pub skills: SkillTable,
    pub tuning: EffectTuning,
}

impl EffectFactory {
    /// Невалидные таблицы заменяются defaults (с warning'ом)
    pub fn new(skills: SkillTable, tuning: EffectTuning) -> Self {
        Self {
            skills: skills.validated_or_default(),
            tuning: tuning.validated_or_default(),
        }
    }

    /// Перепроверка после ручной сборки (поля публичные)
    pub fn validated(self) -> Self {
        Self::new(self.skills, self.tuning)
    }

    /// Валидирует запрос и строит эффекты скилла
    pub fn build(&self, request: &CastRequest) -> Result<Vec<NewEffect>, CastError> {
        if !request.caster_position.is_finite() {
            return Err(CastError::InvalidOrigin(request.caster_position));
        }
        if !request.direction.is_finite() {
            return Err(CastError::InvalidDirection(request.direction));
        }
        if !request.now.is_finite() {
            return Err(CastError::InvalidTime(request.now));
        }
        if request.level == 0 || request.level > MAX_SKILL_LEVEL {
            return Err(CastError::InvalidLevel(request.level));
        }

        let effects = match request.skill {
            SkillId::MagicMissile => self.magic_missiles(request),
            SkillId::Boomerang => self.boomerangs(request),
            SkillId::Nova => vec![self.nova(request)],
            SkillId::ChainLightning => vec![self.chain_lightning(request)],
            SkillId::LightningStorm => vec![self.lightning_storm(request)],
        };
        Ok(effects)
    }

    /// Веер ракет: count(level) штук, разнесены по spread_degrees, все в Rising
    pub fn magic_missiles(&self, request: &CastRequest) -> Vec<NewEffect> {
        let skill = &self.skills.magic_missile;
        let tuning = &self.tuning.missile;
        let count = skill.count.count_at(request.level);
        let damage = skill.damage.at(request.level);
        let forward = cast_direction(request.direction);

        (0..count)
            .map(|i| {
                let angle = fan_angle(i, count, tuning.spread_degrees.to_radians());
                let dir = Quat::from_rotation_y(angle) * forward;
                let velocity = dir * tuning.launch_horizontal_speed + Vec3::Y * tuning.launch_vertical_speed;

                NewEffect {
                    spawn_time: request.now,
                    lifespan: Lifespan::Finite(tuning.lifetime),
                    position: request.caster_position,
                    damage,
                    radius: tuning.hit_radius,
                    body: EffectBody::Missile(MissileState::launch(velocity)),
                }
            })
            .collect()
    }

    /// Бумеранги: чередуют curve_sign (+, −, +, ...), пары разведены на 15°
    pub fn boomerangs(&self, request: &CastRequest) -> Vec<NewEffect> {
        let skill = &self.skills.boomerang;
        let tuning = &self.tuning.boomerang;
        let count = skill.count.count_at(request.level);
        let damage = skill.damage.at(request.level);
        let forward = cast_direction(request.direction);

        (0..count)
            .map(|i| {
                let curve_sign = if i % 2 == 0 { 1.0 } else { -1.0 };
                let pair = (i / 2) as f32;
                let dir = Quat::from_rotation_y(pair * 15f32.to_radians() * curve_sign) * forward;
                let origin = request.caster_position + dir * tuning.spawn_offset;

                NewEffect {
                    spawn_time: request.now,
                    lifespan: Lifespan::Finite(tuning.lifetime),
                    position: origin,
                    damage,
                    radius: tuning.hit_radius,
                    body: EffectBody::Boomerang(BoomerangState::launch(origin, dir * tuning.speed, curve_sign)),
                }
            })
            .collect()
    }

    pub fn nova(&self, request: &CastRequest) -> NewEffect {
        let skill = &self.skills.nova;
        NewEffect {
            spawn_time: request.now,
            lifespan: Lifespan::Finite(skill.duration * self.tuning.nova.fade_fraction),
            position: request.caster_position,
            damage: skill.damage.at(request.level),
            radius: skill.radius.at(request.level),
            body: EffectBody::Nova(NovaState::new(skill.duration)),
        }
    }

    /// Первый удар: на первом тике после каста
    pub fn chain_lightning(&self, request: &CastRequest) -> NewEffect {
        let skill = &self.skills.chain_lightning;
        let chains = skill.chains.count_at(request.level);
        let delay = self.tuning.chain.chain_delay;

        // Запас по времени: хопы идут не чаще раза в тик
        let lifespan = delay * (chains + 2) as f32 + 2.0;

        NewEffect {
            spawn_time: request.now,
            lifespan: Lifespan::Finite(lifespan),
            position: request.caster_position,
            damage: skill.damage.at(request.level),
            radius: self.tuning.chain.cast_range,
            body: EffectBody::ChainLightning(ChainState::new(chains, request.now)),
        }
    }

    pub fn lightning_storm(&self, request: &CastRequest) -> NewEffect {
        let skill = &self.skills.lightning_storm;
        let tuning = &self.tuning.storm;

        NewEffect {
            spawn_time: request.now,
            lifespan: Lifespan::Finite(skill.lifetime),
            position: request.caster_position,
            damage: skill.damage.at(request.level),
            radius: skill.radius.at(request.level),
            body: EffectBody::LightningStorm(StormState::new(
                skill.strikes.count_at(request.level),
                tuning.strike_interval,
                request.now,
                tuning.ambient_count,
                tuning.ambient_interval,
            )),
        }
    }
}

/// Направление каста в плоскости XZ; вырожденное → +Z
fn cast_direction(direction: Vec3) -> Vec3 {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    match flat.try_normalize() {
        Some(dir) => dir,
        None => {
            logger::log(&format!("EffectFactory: degenerate cast direction {:?}, using +Z", direction));
            Vec3::Z
        }
    }
}

/// Угол i-го снаряда в веере шириной `spread` (радианы), центрирован на 0
fn fan_angle(index: u32, count: u32, spread: f32) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    -spread * 0.5 + spread * index as f32 / (count - 1) as f32
}
