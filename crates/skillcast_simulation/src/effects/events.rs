//! Skill effect events + входные ресурсы (Bevy слой)

use bevy::prelude::*;

use super::{CastError, DamageHit, EffectId, EffectKind};
use crate::config::SkillId;
use crate::targeting::{Target, TargetId};

/// Intent: игрок/AI кастует скилл
///
/// Позиция/направление: на момент каста (input layer).
#[derive(Event, Debug, Clone, Copy)]
pub struct CastSkillIntent {
    pub skill: SkillId,
    pub level: u32,
    pub caster_position: Vec3,
    pub direction: Vec3,
}

/// Каст отклонён factory (невалидный запрос)
#[derive(Event, Debug, Clone, Copy)]
pub struct CastRejected {
    pub skill: SkillId,
    pub reason: CastError,
}

/// Событие: эффект нанёс урон цели
///
/// Game state (здоровье врагов) живёт снаружи: применяет урон по этому событию.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EffectDamage {
    pub effect: EffectId,
    pub kind: EffectKind,
    pub target: TargetId,
    pub amount: f32,
}

impl From<&DamageHit> for EffectDamage {
    fn from(hit: &DamageHit) -> Self {
        Self {
            effect: hit.effect,
            kind: hit.kind,
            target: hit.target,
            amount: hit.amount,
        }
    }
}

/// Событие: изменилось количество активных эффектов (HUD)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEffectsChanged {
    pub previous: usize,
    pub current: usize,
}

/// Snapshot целей на текущий тик (обновляется снаружи до FixedUpdate)
#[derive(Resource, Debug, Clone, Default)]
pub struct TargetSnapshot {
    pub targets: Vec<Target>,
}

/// Текущее положение кастера (boomerang возвращается сюда)
///
/// Направление каста приходит в CastSkillIntent, здесь только позиция.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CasterState {
    pub position: Vec3,
}
