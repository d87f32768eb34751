//! Nova: расширяющееся кольцо урона вокруг точки каста
//!
//! progress = age / expand_duration
//! live radius = max_radius × min(progress / expansion_fraction, 1)
//! Урон плоский, только пока progress < expansion_fraction, один раз на цель.
//! После этого эффект живёт до fade_fraction × duration (визуальный fade).

use bevy::prelude::*;
use std::collections::BTreeSet;

use super::collision::{resolve_area, HitSource};
use super::{EffectCommon, EffectContext, EffectHandler, EffectKind, EffectStatus};
use crate::targeting::TargetId;

#[derive(Debug, Clone, PartialEq)]
pub struct NovaState {
    /// Базовая длительность (секунды)
    pub expand_duration: f32,
    /// Текущий радиус кольца (для рендера, обновляется каждый тик)
    pub current_radius: f32,
    /// progress ≥ expansion_fraction: урона больше не будет
    pub fading: bool,
    hit_targets: BTreeSet<TargetId>,
}

impl NovaState {
    pub fn new(expand_duration: f32) -> Self {
        Self {
            expand_duration,
            current_radius: 0.0,
            fading: false,
            hit_targets: BTreeSet::new(),
        }
    }

    pub fn progress(&self, age: f32) -> f32 {
        if self.expand_duration > 0.0 {
            age / self.expand_duration
        } else {
            f32::INFINITY
        }
    }

    /// Радиус кольца при данном progress
    pub fn radius_at(progress: f32, max_radius: f32, expansion_fraction: f32) -> f32 {
        if !(expansion_fraction > 0.0) {
            return max_radius;
        }
        max_radius * (progress / expansion_fraction).clamp(0.0, 1.0)
    }

    pub fn hit_targets(&self) -> &BTreeSet<TargetId> {
        &self.hit_targets
    }
}

impl EffectHandler for NovaState {
    fn update(&mut self, common: &mut EffectCommon, ctx: &mut EffectContext<'_>) -> EffectStatus {
        let expansion_fraction = ctx.tuning.nova.expansion_fraction;
        let progress = self.progress(common.age(ctx.now));

        self.current_radius = Self::radius_at(progress, common.radius, expansion_fraction);

        self.fading = progress >= expansion_fraction;

        if !self.fading {
            let targets = ctx.targets;
            let source = HitSource::new(common.id, EffectKind::Nova);
            resolve_area(
                source,
                common.position,
                self.current_radius,
                common.damage,
                targets,
                &mut self.hit_targets,
                |hit| ctx.apply_damage(hit),
            );
        }

        EffectStatus::Alive
    }

    fn phase_name(&self) -> &'static str {
        if self.fading {
            "fading"
        } else {
            "expanding"
        }
    }
}
