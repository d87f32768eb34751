//! Chain Lightning: последовательные хопы между целями
//!
//! Первый тик: удар по ближайшей цели в cast_range от точки каста
//! (нет цели → эффект удаляется без урона).
//! Дальше каждые chain_delay секунд: ближайшая ещё не поражённая цель
//! в chain_range от последнего хопа, урон × decay, remaining_chains − 1.
//! Хопы кончились или прыгать некуда → удаление.
//!
//! Каждый хоп спавнит косметическую молнию (from → to).

use bevy::prelude::*;
use std::collections::BTreeSet;

use super::collision::HitSource;
use super::{EffectCommon, EffectContext, EffectHandler, EffectKind, EffectStatus, RemovalReason};
use crate::logger;
use crate::targeting::{nearest, nearest_unvisited, Target, TargetId};

/// Один совершённый хоп (история для рендера)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainHop {
    pub target: TargetId,
    pub position: Vec3,
    pub damage: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainState {
    /// Сколько хопов осталось после первого удара
    pub remaining_chains: u32,
    /// Время следующего действия (первый удар: сразу)
    pub next_action_time: f32,
    hit_targets: BTreeSet<TargetId>,
    hops: Vec<ChainHop>,
}

impl ChainState {
    pub fn new(remaining_chains: u32, first_action_time: f32) -> Self {
        Self {
            remaining_chains,
            next_action_time: first_action_time,
            hit_targets: BTreeSet::new(),
            hops: Vec::new(),
        }
    }

    pub fn hit_targets(&self) -> &BTreeSet<TargetId> {
        &self.hit_targets
    }

    pub fn hops(&self) -> &[ChainHop] {
        &self.hops
    }

    /// Урон последнего хопа (None до первого удара)
    pub fn last_hop_damage(&self) -> Option<f32> {
        self.hops.last().map(|hop| hop.damage)
    }

    fn strike(&mut self, common: &mut EffectCommon, ctx: &mut EffectContext<'_>, from: Vec3, target: &Target, damage: f32) {
        let source = HitSource::new(common.id, EffectKind::ChainLightning);
        ctx.apply_damage(source.hit(target.id, damage));
        ctx.spawn_bolt(from, target.position, common.id);

        self.hit_targets.insert(target.id);
        self.hops.push(ChainHop {
            target: target.id,
            position: target.position,
            damage,
        });
        common.position = target.position;
        self.next_action_time = ctx.now + ctx.tuning.chain.chain_delay;
    }
}

impl EffectHandler for ChainState {
    fn update(&mut self, common: &mut EffectCommon, ctx: &mut EffectContext<'_>) -> EffectStatus {
        if ctx.now < self.next_action_time {
            return EffectStatus::Alive;
        }

        let targets = ctx.targets;
        let all_tuning = ctx.tuning;
        let tuning = &all_tuning.chain;

        let last_hop = self.hops.last().copied();
        match last_hop {
            None => {
                let Some(target) = nearest(common.position, targets, Some(tuning.cast_range)) else {
                    logger::log(&format!("ChainLightning {:?}: no target in range, fizzled", common.id));
                    return EffectStatus::Remove(RemovalReason::Fizzled);
                };
                let origin = common.position;
                let damage = common.damage;
                self.strike(common, ctx, origin, target, damage);
            }
            Some(previous) => {
                if self.remaining_chains == 0 {
                    return EffectStatus::Remove(RemovalReason::Exhausted);
                }
                let Some(target) =
                    nearest_unvisited(previous.position, targets, Some(tuning.chain_range), &self.hit_targets)
                else {
                    return EffectStatus::Remove(RemovalReason::Exhausted);
                };
                let damage = previous.damage * tuning.decay;
                self.remaining_chains -= 1;
                self.strike(common, ctx, previous.position, target, damage);
            }
        }

        if self.remaining_chains == 0 {
            EffectStatus::Remove(RemovalReason::Exhausted)
        } else {
            EffectStatus::Alive
        }
    }

    fn phase_name(&self) -> &'static str {
        if self.hops.is_empty() {
            "charging"
        } else {
            "chaining"
        }
    }
}
