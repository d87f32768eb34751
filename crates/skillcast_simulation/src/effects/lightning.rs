//! Lightning: косметическая вспышка молнии
//!
//! Спавнится chain/storm'ом через side buffer. Урона не наносит,
//! живёт lightning_flash_duration и удаляется по expiry.

use bevy::prelude::*;

use super::{EffectBody, EffectCommon, EffectContext, EffectHandler, EffectId, EffectStatus, Lifespan, NewEffect};

#[derive(Debug, Clone, PartialEq)]
pub struct LightningBolt {
    pub from: Vec3,
    pub to: Vec3,
    /// Эффект, породивший вспышку
    pub source: EffectId,
}

impl LightningBolt {
    pub fn new_effect(from: Vec3, to: Vec3, source: EffectId, now: f32, flash_duration: f32) -> NewEffect {
        NewEffect {
            spawn_time: now,
            lifespan: Lifespan::Finite(flash_duration),
            position: to,
            damage: 0.0,
            radius: 0.0,
            body: EffectBody::Lightning(LightningBolt { from, to, source }),
        }
    }
}

impl EffectHandler for LightningBolt {
    fn update(&mut self, _common: &mut EffectCommon, _ctx: &mut EffectContext<'_>) -> EffectStatus {
        EffectStatus::Alive
    }

    fn phase_name(&self) -> &'static str {
        "flash"
    }
}
