//! Lightning Storm: периодические удары по случайной цели в радиусе
//!
//! Каждые strike_interval секунд (первое окно: сразу при спавне):
//! - есть цели строго внутри радиуса → случайная (детерминированный RNG) получает
//!   полный урон, remaining_strikes − 1, вспышка с неба в цель
//! - целей нет → окно сгорает (remaining не меняется), вспышка в случайную точку
//!
//! Ambient flicker'ы: внутренняя косметика, урона не наносят никогда.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

use super::collision::HitSource;
use super::{EffectCommon, EffectContext, EffectHandler, EffectKind, EffectStatus};
use crate::targeting::{within_radius, Target};

/// Ambient вспышка внутри облака (только визуал)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientFlicker {
    /// Смещение от центра шторма в плоскости XZ
    pub offset: Vec3,
    pub next_trigger_time: f32,
    pub last_triggered: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StormState {
    pub strike_interval: f32,
    pub next_strike_time: f32,
    pub remaining_strikes: u32,
    /// Удары, которые нанесли урон
    pub strikes_landed: u32,
    pub ambient: Vec<AmbientFlicker>,
}

impl StormState {
    /// Первое окно удара: в момент спавна; flicker'ы разнесены по ambient_interval
    pub fn new(remaining_strikes: u32, strike_interval: f32, spawn_time: f32, ambient_count: usize, ambient_interval: f32) -> Self {
        let ambient = (0..ambient_count)
            .map(|i| AmbientFlicker {
                offset: Vec3::ZERO,
                next_trigger_time: spawn_time + ambient_interval * i as f32 / ambient_count as f32,
                last_triggered: None,
            })
            .collect();

        Self {
            strike_interval,
            next_strike_time: spawn_time,
            remaining_strikes,
            strikes_landed: 0,
            ambient,
        }
    }

    fn update_ambient(&mut self, radius: f32, ctx: &mut EffectContext<'_>) {
        let interval = ctx.tuning.storm.ambient_interval;
        for flicker in self.ambient.iter_mut() {
            if ctx.now >= flicker.next_trigger_time {
                flicker.offset = random_offset(ctx.rng, radius);
                flicker.last_triggered = Some(ctx.now);
                flicker.next_trigger_time = ctx.now + interval;
            }
        }
    }
}

/// Случайная точка в круге радиуса `radius` (XZ, равномерно по площади)
fn random_offset(rng: &mut ChaCha8Rng, radius: f32) -> Vec3 {
    if !(radius > 0.0) {
        return Vec3::ZERO;
    }
    let angle = rng.gen_range(0.0..TAU);
    let distance = radius * rng.gen::<f32>().sqrt();
    Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
}

impl EffectHandler for StormState {
    fn update(&mut self, common: &mut EffectCommon, ctx: &mut EffectContext<'_>) -> EffectStatus {
        if self.remaining_strikes > 0 && ctx.now >= self.next_strike_time {
            let targets = ctx.targets;
            let sky = common.position + Vec3::Y * ctx.tuning.storm.cloud_height;
            let candidates: Vec<&Target> = within_radius(common.position, targets, common.radius).collect();

            if candidates.is_empty() {
                // Окно сгорело: удар в пустоту
                let ground = common.position + random_offset(ctx.rng, common.radius);
                ctx.spawn_bolt(sky, ground, common.id);
            } else {
                let target = candidates[ctx.rng.gen_range(0..candidates.len())];
                let source = HitSource::new(common.id, EffectKind::LightningStorm);
                ctx.apply_damage(source.hit(target.id, common.damage));
                ctx.spawn_bolt(sky, target.position, common.id);
                self.remaining_strikes -= 1;
                self.strikes_landed += 1;
            }

            self.next_strike_time = ctx.now + self.strike_interval;
        }

        self.update_ambient(common.radius, ctx);

        EffectStatus::Alive
    }

    fn phase_name(&self) -> &'static str {
        if self.remaining_strikes > 0 {
            "active"
        } else {
            "spent"
        }
    }
}
