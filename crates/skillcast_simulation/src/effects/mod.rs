//! Skill effects: симуляция эффектов скиллов
//!
//! Один тип эффекта = один вариант `EffectBody` + свой state struct с `EffectHandler`.
//! Dispatch таблица (`EffectBody::handler_mut`) живёт рядом с определением вариантов.
//!
//! Поток за тик:
//! 1. EffectFactory → EffectRegistry::spawn (каст, между тиками)
//! 2. EffectRegistry::tick → expiry → handler (phase/steering/collision/chain)
//! 3. Side buffer (косметические молнии) → merge после итерации
//! 4. TrailBuffer ← post-update позиции движущихся эффектов
//! 5. Render читает EffectRegistry::snapshot()
//!
//! Bevy слой (SkillEffectsPlugin) только прокидывает Time/targets/events в registry.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::config::EffectTuning;
use crate::targeting::{Target, TargetId};

pub mod boomerang;
pub mod chain;
pub mod collision;
pub mod events;
pub mod factory;
pub mod lightning;
pub mod missile;
pub mod nova;
pub mod registry;
pub mod steering;
pub mod storm;
pub mod systems;
pub mod trail;

#[cfg(test)]
mod chain_tests;
#[cfg(test)]
mod nova_tests;
#[cfg(test)]
mod registry_tests;
#[cfg(test)]
mod test_support;

pub use boomerang::{BoomerangPhase, BoomerangState};
pub use chain::{ChainHop, ChainState};
pub use collision::{Falloff, HitSource};
pub use events::{ActiveEffectsChanged, CastRejected, CastSkillIntent, CasterState, EffectDamage, TargetSnapshot};
pub use factory::{CastError, CastRequest, EffectFactory};
pub use lightning::LightningBolt;
pub use missile::{MissilePhase, MissileState};
pub use nova::NovaState;
pub use registry::{ActiveCountChange, EffectRegistry, TickInput, TickReport};
pub use storm::{AmbientFlicker, StormState};
pub use trail::TrailBuffer;

/// Stable ID эффекта (монотонный, не переиспользуется)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u64);

/// Дискриминант типа эффекта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Missile,
    Boomerang,
    Nova,
    Lightning,
    LightningStorm,
    ChainLightning,
}

impl EffectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::Missile => "missile",
            EffectKind::Boomerang => "boomerang",
            EffectKind::Nova => "nova",
            EffectKind::Lightning => "lightning",
            EffectKind::LightningStorm => "lightning_storm",
            EffectKind::ChainLightning => "chain_lightning",
        }
    }

    /// Пишет ли эффект позиции в TrailBuffer (только движущиеся)
    pub fn leaves_trail(&self) -> bool {
        matches!(self, EffectKind::Missile | EffectKind::Boomerang)
    }
}

/// Время жизни эффекта
///
/// Infinite: явный маркер; без него любой эффект обязан истечь.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lifespan {
    Finite(f32),
    Infinite,
}

impl Lifespan {
    /// Истёк: age > duration (строго)
    pub fn is_expired(&self, age: f32) -> bool {
        match self {
            Lifespan::Finite(duration) => age > *duration,
            Lifespan::Infinite => false,
        }
    }
}

/// Общие поля всех эффектов
#[derive(Debug, Clone, PartialEq)]
pub struct EffectCommon {
    pub id: EffectId,
    pub spawn_time: f32,
    pub lifespan: Lifespan,
    pub position: Vec3,
    /// Базовый урон (0 для косметики)
    pub damage: f32,
    /// Hit radius (снаряды) или area radius (nova/storm)
    pub radius: f32,
}

impl EffectCommon {
    pub fn age(&self, now: f32) -> f32 {
        now - self.spawn_time
    }
}

/// Состояние, специфичное для типа эффекта
#[derive(Debug, Clone, PartialEq)]
pub enum EffectBody {
    Missile(MissileState),
    Boomerang(BoomerangState),
    Nova(NovaState),
    Lightning(LightningBolt),
    LightningStorm(StormState),
    ChainLightning(ChainState),
}

impl EffectBody {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectBody::Missile(_) => EffectKind::Missile,
            EffectBody::Boomerang(_) => EffectKind::Boomerang,
            EffectBody::Nova(_) => EffectKind::Nova,
            EffectBody::Lightning(_) => EffectKind::Lightning,
            EffectBody::LightningStorm(_) => EffectKind::LightningStorm,
            EffectBody::ChainLightning(_) => EffectKind::ChainLightning,
        }
    }

    /// Dispatch таблица: discriminant → handler
    pub fn handler_mut(&mut self) -> &mut dyn EffectHandler {
        match self {
            EffectBody::Missile(state) => state,
            EffectBody::Boomerang(state) => state,
            EffectBody::Nova(state) => state,
            EffectBody::Lightning(state) => state,
            EffectBody::LightningStorm(state) => state,
            EffectBody::ChainLightning(state) => state,
        }
    }

    pub fn handler(&self) -> &dyn EffectHandler {
        match self {
            EffectBody::Missile(state) => state,
            EffectBody::Boomerang(state) => state,
            EffectBody::Nova(state) => state,
            EffectBody::Lightning(state) => state,
            EffectBody::LightningStorm(state) => state,
            EffectBody::ChainLightning(state) => state,
        }
    }
}

/// Активный эффект (владеет им только EffectRegistry)
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub common: EffectCommon,
    pub body: EffectBody,
}

impl Effect {
    pub fn id(&self) -> EffectId {
        self.common.id
    }

    pub fn kind(&self) -> EffectKind {
        self.body.kind()
    }

    pub fn position(&self) -> Vec3 {
        self.common.position
    }

    /// Скорость (только у движущихся эффектов)
    pub fn velocity(&self) -> Option<Vec3> {
        self.body.handler().velocity()
    }

    pub fn phase_name(&self) -> &'static str {
        self.body.handler().phase_name()
    }

    pub fn age(&self, now: f32) -> f32 {
        self.common.age(now)
    }

    pub fn is_expired(&self, now: f32) -> bool {
        self.common.lifespan.is_expired(self.common.age(now))
    }

    /// Позиция/скорость конечны (NaN/inf → эффект удаляется на первом тике)
    pub fn is_kinematically_valid(&self) -> bool {
        self.common.position.is_finite() && self.velocity().map_or(true, |v| v.is_finite())
    }

    pub fn update(&mut self, ctx: &mut EffectContext<'_>) -> EffectStatus {
        let Effect { common, body } = self;
        body.handler_mut().update(common, ctx)
    }

    pub fn missile(&self) -> Option<&MissileState> {
        match &self.body {
            EffectBody::Missile(state) => Some(state),
            _ => None,
        }
    }

    pub fn boomerang(&self) -> Option<&BoomerangState> {
        match &self.body {
            EffectBody::Boomerang(state) => Some(state),
            _ => None,
        }
    }

    pub fn nova(&self) -> Option<&NovaState> {
        match &self.body {
            EffectBody::Nova(state) => Some(state),
            _ => None,
        }
    }

    pub fn chain(&self) -> Option<&ChainState> {
        match &self.body {
            EffectBody::ChainLightning(state) => Some(state),
            _ => None,
        }
    }

    pub fn storm(&self) -> Option<&StormState> {
        match &self.body {
            EffectBody::LightningStorm(state) => Some(state),
            _ => None,
        }
    }

    pub fn lightning(&self) -> Option<&LightningBolt> {
        match &self.body {
            EffectBody::Lightning(state) => Some(state),
            _ => None,
        }
    }
}

/// Эффект от factory / side buffer (id выдаёт registry)
#[derive(Debug, Clone, PartialEq)]
pub struct NewEffect {
    pub spawn_time: f32,
    pub lifespan: Lifespan,
    pub position: Vec3,
    pub damage: f32,
    pub radius: f32,
    pub body: EffectBody,
}

impl NewEffect {
    pub fn kind(&self) -> EffectKind {
        self.body.kind()
    }

    pub(crate) fn into_effect(self, id: EffectId) -> Effect {
        Effect {
            common: EffectCommon {
                id,
                spawn_time: self.spawn_time,
                lifespan: self.lifespan,
                position: self.position,
                damage: self.damage,
                radius: self.radius,
            },
            body: self.body,
        }
    }
}

/// Почему эффект удалён из registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// age > duration
    Expired,
    /// Снаряд попал (missile)
    HitTerminal,
    /// Упал ниже земли без попадания
    Grounded,
    /// Boomerang вернулся к кастеру
    Returned,
    /// Chain: хопы кончились / некуда прыгать
    Exhausted,
    /// Chain: нет цели для первого удара
    Fizzled,
    /// NaN/inf в позиции или скорости
    Invalid,
    /// Вытеснен лимитом активных эффектов
    Evicted,
}

/// Результат handler'а за тик
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectStatus {
    Alive,
    Remove(RemovalReason),
}

/// Одно попадание (то, что получает damage callback)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageHit {
    pub effect: EffectId,
    pub kind: EffectKind,
    pub target: TargetId,
    pub amount: f32,
}

/// Всё, что handler видит за тик
pub struct EffectContext<'a> {
    pub now: f32,
    pub dt: f32,
    pub targets: &'a [Target],
    /// Текущая позиция кастера (boomerang return)
    pub caster_position: Vec3,
    pub tuning: &'a EffectTuning,
    pub rng: &'a mut ChaCha8Rng,
    spawned: &'a mut Vec<NewEffect>,
    damage: &'a mut dyn FnMut(&DamageHit),
}

impl<'a> EffectContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        now: f32,
        dt: f32,
        targets: &'a [Target],
        caster_position: Vec3,
        tuning: &'a EffectTuning,
        rng: &'a mut ChaCha8Rng,
        spawned: &'a mut Vec<NewEffect>,
        damage: &'a mut dyn FnMut(&DamageHit),
    ) -> Self {
        Self {
            now,
            dt,
            targets,
            caster_position,
            tuning,
            rng,
            spawned,
            damage,
        }
    }

    /// Синхронный вызов во внешнее game state (один вызов = одно попадание)
    pub fn apply_damage(&mut self, hit: DamageHit) {
        (self.damage)(&hit);
    }

    /// Новый эффект в side buffer (попадёт в registry после итерации)
    pub fn spawn(&mut self, effect: NewEffect) {
        self.spawned.push(effect);
    }

    /// Косметическая молния from → to (без урона)
    pub fn spawn_bolt(&mut self, from: Vec3, to: Vec3, source: EffectId) {
        let effect = LightningBolt::new_effect(from, to, source, self.now, self.tuning.lightning_flash_duration);
        self.spawn(effect);
    }
}

/// Поведение одного типа эффекта (phase machine + steering + collision)
pub trait EffectHandler {
    /// Один тик. Вызывается ровно один раз за EffectRegistry::tick.
    fn update(&mut self, common: &mut EffectCommon, ctx: &mut EffectContext<'_>) -> EffectStatus;

    fn velocity(&self) -> Option<Vec3> {
        None
    }

    fn phase_name(&self) -> &'static str;
}

/// Bevy plugin: registry/factory ресурсы + cast/tick системы
///
/// Порядок выполнения (FixedUpdate, chain):
/// 1. process_cast_intents: CastSkillIntent → EffectFactory → registry.spawn
/// 2. tick_skill_effects: registry.tick → EffectDamage / ActiveEffectsChanged
pub struct SkillEffectsPlugin;

impl Plugin for SkillEffectsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EffectFactory>()
            .init_resource::<TargetSnapshot>()
            .init_resource::<CasterState>();

        // Factory мог быть вставлен литералом в обход EffectFactory::new
        if let Some(factory) = app.world_mut().remove_resource::<EffectFactory>() {
            app.insert_resource(factory.validated());
        }

        // Registry использует тот же tuning, что и factory; seed: из DeterministicRng
        if !app.world().contains_resource::<EffectRegistry>() {
            let tuning = app.world().resource::<EffectFactory>().tuning.clone();
            let seed = app
                .world_mut()
                .get_resource_mut::<crate::DeterministicRng>()
                .map(|mut rng| rng.next_seed())
                .unwrap_or(crate::DEFAULT_SEED);
            app.insert_resource(EffectRegistry::new(tuning, seed));
        }

        app.add_event::<CastSkillIntent>()
            .add_event::<CastRejected>()
            .add_event::<EffectDamage>()
            .add_event::<ActiveEffectsChanged>();

        app.add_systems(
            FixedUpdate,
            (systems::process_cast_intents, systems::tick_skill_effects).chain(),
        );
    }
}
