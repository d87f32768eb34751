//! SKILLCAST Simulation Core
//!
//! Headless симуляция эффектов скиллов (missile, boomerang, nova,
//! chain lightning, lightning storm) на Bevy 0.16.
//!
//! Слои:
//! - effects: EffectRegistry + handlers (чистая логика, без ECS)
//! - effects::systems: тонкий Bevy слой (FixedUpdate, events)
//! - config: EffectTuning / SkillTable (RON)
//! - targeting: запросы к snapshot'у внешних целей
//!
//! Рендер, здоровье врагов, кулдауны и input живут снаружи:
//! они читают `EffectRegistry::snapshot()` и события `EffectDamage`.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod config;
pub mod effects;
pub mod logger;
pub mod targeting;

// Re-export для удобства
pub use config::{ConfigError, EffectTuning, LevelScaled, SkillId, SkillTable};
pub use effects::{
    ActiveCountChange, ActiveEffectsChanged, CastError, CastRejected, CastRequest, CastSkillIntent, CasterState,
    DamageHit, Effect, EffectBody, EffectDamage, EffectFactory, EffectId, EffectKind, EffectRegistry, EffectStatus,
    Lifespan, NewEffect, RemovalReason, SkillEffectsPlugin, TargetSnapshot, TickInput, TickReport,
};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use targeting::{Target, TargetId};

/// Seed по умолчанию (headless demo, Default registry)
pub const DEFAULT_SEED: u64 = 42;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Fixed timestep 60Hz для simulation tick
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        // Детерминистичный RNG (seed от create_headless_app имеет приоритет)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(DEFAULT_SEED));
        }

        app.add_plugins(SkillEffectsPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Производный seed для подсистемы (тот же seed → та же последовательность)
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot активных эффектов для сравнения детерминизма
///
/// Порядок = порядок registry (спавн), id пишутся явно.
pub fn effects_snapshot(registry: &EffectRegistry) -> Vec<u8> {
    let mut snapshot = Vec::new();

    // Сериализуем в байты через Debug (простейший способ)
    for effect in registry.snapshot() {
        snapshot.extend_from_slice(&effect.id().0.to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", effect).as_bytes());
    }

    snapshot
}
