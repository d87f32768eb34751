//! Test harness: registry + factory + ручные часы

use bevy::prelude::*;

use super::*;
use crate::config::{EffectTuning, SkillId, SkillTable};
use crate::targeting::Target;

pub const DT: f32 = 1.0 / 60.0;

pub struct Harness {
    pub registry: EffectRegistry,
    pub factory: EffectFactory,
    pub targets: Vec<Target>,
    pub caster: Vec3,
    pub now: f32,
    pub dt: f32,
    pub hits: Vec<DamageHit>,
    pub reports: Vec<TickReport>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_tables(SkillTable::default(), EffectTuning::default())
    }

    pub fn with_tuning(tuning: EffectTuning) -> Self {
        Self::with_tables(SkillTable::default(), tuning)
    }

    pub fn with_tables(skills: SkillTable, tuning: EffectTuning) -> Self {
        Self {
            registry: EffectRegistry::new(tuning.clone(), 7),
            factory: EffectFactory::new(skills, tuning),
            targets: Vec::new(),
            caster: Vec3::ZERO,
            now: 0.0,
            dt: DT,
            hits: Vec::new(),
            reports: Vec::new(),
        }
    }

    pub fn cast(&mut self, skill: SkillId, direction: Vec3) -> Vec<EffectId> {
        let request = CastRequest::new(skill, 1, self.caster, direction, self.now);
        self.registry.cast(&self.factory, &request).expect("valid cast")
    }

    pub fn spawn(&mut self, effect: NewEffect) -> EffectId {
        self.registry.spawn(effect)
    }

    pub fn step(&mut self) {
        self.now += self.dt;
        let input = TickInput {
            dt: self.dt,
            now: self.now,
            targets: &self.targets,
            caster_position: self.caster,
        };
        let hits = &mut self.hits;
        let report = self.registry.tick(input, |hit| hits.push(*hit));
        self.reports.push(report);
    }

    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.step();
        }
    }

    pub fn run_for(&mut self, seconds: f32) {
        self.run((seconds / self.dt).round() as usize);
    }

    /// Тикает, пока эффект не исчезнет (или пока не кончится лимит)
    pub fn run_until_removed(&mut self, id: EffectId, max_seconds: f32) -> Option<RemovalReason> {
        let max_ticks = (max_seconds / self.dt).ceil() as usize;
        for _ in 0..max_ticks {
            self.step();
            if let Some(reason) = self.removal_reason(id) {
                return Some(reason);
            }
        }
        None
    }

    pub fn removal_reason(&self, id: EffectId) -> Option<RemovalReason> {
        self.reports
            .iter()
            .flat_map(|r| r.removed.iter())
            .find(|(removed, _)| *removed == id)
            .map(|(_, reason)| *reason)
    }

    pub fn hits_from(&self, id: EffectId) -> Vec<DamageHit> {
        self.hits.iter().filter(|h| h.effect == id).copied().collect()
    }

    pub fn hits_on(&self, target: u64) -> Vec<DamageHit> {
        self.hits.iter().filter(|h| h.target.0 == target).copied().collect()
    }

    pub fn count_kind(&self, kind: EffectKind) -> usize {
        self.registry.snapshot().iter().filter(|e| e.kind() == kind).count()
    }
}

/// Одиночная ракета (без веера factory)
pub fn missile(position: Vec3, velocity: Vec3, damage: f32, tuning: &EffectTuning) -> NewEffect {
    NewEffect {
        spawn_time: 0.0,
        lifespan: Lifespan::Finite(tuning.missile.lifetime),
        position,
        damage,
        radius: tuning.missile.hit_radius,
        body: EffectBody::Missile(MissileState::launch(velocity)),
    }
}

/// Одиночный бумеранг
pub fn boomerang(position: Vec3, direction: Vec3, damage: f32, tuning: &EffectTuning) -> NewEffect {
    NewEffect {
        spawn_time: 0.0,
        lifespan: Lifespan::Finite(tuning.boomerang.lifetime),
        position,
        damage,
        radius: tuning.boomerang.hit_radius,
        body: EffectBody::Boomerang(BoomerangState::launch(
            position,
            direction.normalize() * tuning.boomerang.speed,
            1.0,
        )),
    }
}

/// Бездействующий эффект с заданным lifespan (проверки registry)
pub fn inert(spawn_time: f32, lifespan: Lifespan) -> NewEffect {
    NewEffect {
        spawn_time,
        lifespan,
        position: Vec3::ZERO,
        damage: 0.0,
        radius: 0.0,
        body: EffectBody::Lightning(LightningBolt {
            from: Vec3::Y,
            to: Vec3::ZERO,
            source: EffectId(0),
        }),
    }
}
