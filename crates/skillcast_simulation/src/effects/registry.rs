//! EffectRegistry: единственный владелец активных эффектов
//!
//! Архитектура тика (snapshot-then-replace):
//! 1. mem::take активного списка
//! 2. для каждого эффекта: expiry → валидность → handler (ровно один update)
//! 3. выжившие + side buffer (новые эффекты из handler'ов) → новый активный список
//!
//! Эффекты, созданные во время тика, впервые обновляются в СЛЕДУЮЩЕМ тике.
//! Порядок списка = порядок спавна (старейший первым).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::factory::{CastError, CastRequest, EffectFactory};
use super::trail::{TrailBuffer, TrailStore};
use super::{DamageHit, Effect, EffectContext, EffectId, EffectStatus, NewEffect, RemovalReason};
use crate::config::EffectTuning;
use crate::logger;
use crate::targeting::Target;

/// Вход одного тика (всё внешнее состояние: read-only)
#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    /// Шаг симуляции (секунды)
    pub dt: f32,
    /// Текущее время (секунды, монотонно)
    pub now: f32,
    pub targets: &'a [Target],
    pub caster_position: Vec3,
}

/// Итог тика (для логов/тестов/Bevy events)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub removed: Vec<(EffectId, RemovalReason)>,
    pub spawned: Vec<EffectId>,
    pub damage_events: usize,
}

/// Изменение количества активных эффектов
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveCountChange {
    pub previous: usize,
    pub current: usize,
}

type CountObserver = Box<dyn FnMut(ActiveCountChange) + Send + Sync>;

#[derive(Resource)]
pub struct EffectRegistry {
    effects: Vec<Effect>,
    trails: TrailStore,
    tuning: EffectTuning,
    rng: ChaCha8Rng,
    seed: u64,
    next_id: u64,
    last_tick_time: Option<f32>,
    observers: Vec<CountObserver>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new(EffectTuning::default(), crate::DEFAULT_SEED)
    }
}

impl EffectRegistry {
    /// Невалидный tuning заменяется defaults (см. `EffectTuning::validated_or_default`)
    pub fn new(tuning: EffectTuning, seed: u64) -> Self {
        let tuning = tuning.validated_or_default();
        Self {
            effects: Vec::new(),
            trails: TrailStore::new(tuning.trail_capacity),
            tuning,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            next_id: 1,
            last_tick_time: None,
            observers: Vec::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(EffectTuning::default(), seed)
    }

    pub fn tuning(&self) -> &EffectTuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Read-only список активных эффектов (порядок спавна)
    pub fn snapshot(&self) -> &[Effect] {
        &self.effects
    }

    pub fn get(&self, id: EffectId) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id() == id)
    }

    pub fn trail(&self, id: EffectId) -> Option<&TrailBuffer> {
        self.trails.get(id)
    }

    /// Подписка на изменение количества активных эффектов (HUD и т.п.)
    pub fn on_active_count_changed<F>(&mut self, observer: F)
    where
        F: FnMut(ActiveCountChange) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Новый эффект сразу попадает в snapshot (update: со следующего тика)
    pub fn spawn(&mut self, effect: NewEffect) -> EffectId {
        let previous = self.effects.len();
        let id = self.push_new(effect);
        self.enforce_cap();
        self.notify_if_changed(previous);
        id
    }

    /// Пакетный спавн (одно уведомление на весь пакет)
    ///
    /// Возвращает только живые id: пакет больше лимита вытесняет и свои же старшие эффекты.
    pub fn spawn_batch(&mut self, effects: Vec<NewEffect>) -> Vec<EffectId> {
        let previous = self.effects.len();
        let mut ids: Vec<EffectId> = effects.into_iter().map(|effect| self.push_new(effect)).collect();
        let evicted = self.enforce_cap();
        ids.retain(|id| !evicted.contains(id));
        self.notify_if_changed(previous);
        ids
    }

    /// Каст скилла: factory → spawn_batch
    pub fn cast(&mut self, factory: &EffectFactory, request: &CastRequest) -> Result<Vec<EffectId>, CastError> {
        let effects = factory.build(request)?;
        let ids = self.spawn_batch(effects);
        logger::log(&format!(
            "EffectRegistry: cast {} L{} → {} effect(s), active {}",
            request.skill.as_str(),
            request.level,
            ids.len(),
            self.effects.len()
        ));
        Ok(ids)
    }

    /// Один шаг симуляции всех эффектов
    ///
    /// `damage` вызывается синхронно, один раз на каждое попадание.
    pub fn tick<F>(&mut self, input: TickInput<'_>, mut damage: F) -> TickReport
    where
        F: FnMut(&DamageHit),
    {
        let dt = if input.dt.is_finite() && input.dt >= 0.0 {
            input.dt
        } else {
            logger::log_warning(&format!("EffectRegistry: invalid dt {}, using 0", input.dt));
            0.0
        };
        if let Some(last) = self.last_tick_time {
            if input.now < last {
                logger::log_warning(&format!("EffectRegistry: time went backwards ({} → {})", last, input.now));
            }
        }
        self.last_tick_time = Some(input.now);

        let previous = self.effects.len();
        let current = std::mem::take(&mut self.effects);
        let mut survivors = Vec::with_capacity(current.len());
        let mut side_buffer: Vec<NewEffect> = Vec::new();
        let mut report = TickReport::default();
        let mut damage_events = 0usize;

        {
            let mut counting_damage = |hit: &DamageHit| {
                damage_events += 1;
                damage(hit);
            };
            let mut ctx = EffectContext::new(
                input.now,
                dt,
                input.targets,
                input.caster_position,
                &self.tuning,
                &mut self.rng,
                &mut side_buffer,
                &mut counting_damage,
            );

            for mut effect in current {
                let status = if effect.is_expired(input.now) {
                    EffectStatus::Remove(RemovalReason::Expired)
                } else if !effect.is_kinematically_valid() {
                    logger::log_warning(&format!(
                        "EffectRegistry: {:?} ({}) has non-finite state, removing",
                        effect.id(),
                        effect.kind().as_str()
                    ));
                    EffectStatus::Remove(RemovalReason::Invalid)
                } else {
                    effect.update(&mut ctx)
                };

                match status {
                    EffectStatus::Alive => {
                        if effect.kind().leaves_trail() {
                            self.trails.record(effect.id(), effect.position());
                        }
                        survivors.push(effect);
                    }
                    EffectStatus::Remove(reason) => {
                        self.trails.remove(effect.id());
                        report.removed.push((effect.id(), reason));
                    }
                }
            }
        }

        // Side buffer → после итерации (новые эффекты не обновляются в этом тике)
        for new_effect in side_buffer {
            let id = self.allocate_id();
            report.spawned.push(id);
            survivors.push(new_effect.into_effect(id));
        }

        self.effects = survivors;
        for id in self.enforce_cap() {
            report.removed.push((id, RemovalReason::Evicted));
        }
        report.damage_events = damage_events;
        self.notify_if_changed(previous);
        report
    }

    /// Удаляет все эффекты и trails (id counter не сбрасывается)
    pub fn reset(&mut self) {
        let previous = self.effects.len();
        self.effects.clear();
        self.trails.clear();
        self.last_tick_time = None;
        self.notify_if_changed(previous);
    }

    fn allocate_id(&mut self) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_new(&mut self, effect: NewEffect) -> EffectId {
        let id = self.allocate_id();
        self.effects.push(effect.into_effect(id));
        id
    }

    /// Лимит активных эффектов: вытесняются старейшие. Возвращает id вытесненных.
    fn enforce_cap(&mut self) -> Vec<EffectId> {
        let Some(cap) = self.tuning.max_active_effects else {
            return Vec::new();
        };
        if self.effects.len() <= cap {
            return Vec::new();
        }

        let excess = self.effects.len() - cap;
        let evicted: Vec<EffectId> = self.effects.drain(..excess).map(|e| e.id()).collect();
        for id in &evicted {
            self.trails.remove(*id);
        }
        logger::log_warning(&format!(
            "EffectRegistry: active effect cap {} reached, evicted {} oldest {:?}",
            cap, excess, evicted
        ));
        evicted
    }

    fn notify_if_changed(&mut self, previous: usize) {
        let current = self.effects.len();
        if current == previous {
            return;
        }
        let change = ActiveCountChange { previous, current };
        for observer in self.observers.iter_mut() {
            observer(change);
        }
    }
}
