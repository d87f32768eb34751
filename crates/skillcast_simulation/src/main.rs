//! Headless симуляция SKILLCAST
//!
//! Кастует все скиллы в кольцо статичных целей и печатает сводку урона.
//! Первый аргумент (опционально): путь к RON файлу EffectTuning.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use skillcast_simulation::{
    create_headless_app, log_info, CastSkillIntent, CasterState, EffectDamage, EffectFactory, EffectRegistry,
    EffectTuning, SimulationPlugin, SkillId, SkillTable, Target, TargetSnapshot,
};

/// Накопленный урон (для сводки)
#[derive(Resource, Default)]
struct DamageTotals {
    hits: usize,
    total: f32,
}

fn collect_damage(mut events: EventReader<EffectDamage>, mut totals: ResMut<DamageTotals>) {
    for event in events.read() {
        totals.hits += 1;
        totals.total += event.amount;
    }
}

fn main() {
    let seed = skillcast_simulation::DEFAULT_SEED;
    println!("Starting SKILLCAST headless simulation (seed: {})", seed);

    let tuning = match std::env::args().nth(1) {
        Some(path) => EffectTuning::load_or_default(path),
        None => EffectTuning::default(),
    };

    let mut app = create_headless_app(seed);
    app.insert_resource(EffectFactory::new(SkillTable::default(), tuning))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)))
        .add_plugins(SimulationPlugin)
        .init_resource::<DamageTotals>()
        .add_systems(Update, collect_damage);

    // Кольцо целей радиусом 8 вокруг кастера
    let targets = (0..12)
        .map(|i| {
            let angle = i as f32 / 12.0 * std::f32::consts::TAU;
            Target::new(i, Vec3::new(angle.cos() * 8.0, 1.0, angle.sin() * 8.0))
        })
        .collect();
    app.insert_resource(TargetSnapshot { targets });
    app.insert_resource(CasterState {
        position: Vec3::new(0.0, 1.0, 0.0),
    });

    for (tick, skill) in SkillId::ALL.iter().enumerate() {
        app.world_mut().send_event(CastSkillIntent {
            skill: *skill,
            level: 1,
            caster_position: Vec3::new(0.0, 1.0, 0.0),
            direction: Vec3::Z,
        });

        // Немного тиков между кастами
        for _ in 0..(30 + tick) {
            app.update();
        }
    }

    for tick in 0..600 {
        app.update();

        if tick % 100 == 0 {
            let active = app.world().resource::<EffectRegistry>().len();
            println!("Tick {}: {} active effects", tick, active);
        }
    }

    let totals = app.world().resource::<DamageTotals>();
    log_info(&format!("Damage events: {}, total damage: {:.1}", totals.hits, totals.total));
    println!("Simulation complete! {} hits, {:.1} damage", totals.hits, totals.total);
}
