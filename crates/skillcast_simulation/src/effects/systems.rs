//! Skill effect systems (FixedUpdate)

use bevy::prelude::*;

use super::{
    ActiveEffectsChanged, CastRejected, CastRequest, CastSkillIntent, CasterState, EffectDamage, EffectFactory,
    EffectRegistry, TargetSnapshot, TickInput,
};
use crate::logger;

/// Система: CastSkillIntent → EffectFactory → registry
///
/// Невалидный каст → CastRejected, ничего не спавнится.
pub fn process_cast_intents(
    mut intents: EventReader<CastSkillIntent>,
    factory: Res<EffectFactory>,
    mut registry: ResMut<EffectRegistry>,
    time: Res<Time>,
    mut rejected: EventWriter<CastRejected>,
    mut count_changed: EventWriter<ActiveEffectsChanged>,
) {
    let previous = registry.len();
    let now = time.elapsed_secs();

    for intent in intents.read() {
        let request = CastRequest::new(intent.skill, intent.level, intent.caster_position, intent.direction, now);
        if let Err(reason) = registry.cast(&factory, &request) {
            logger::log_warning(&format!("Cast {} rejected: {}", intent.skill.as_str(), reason));
            rejected.write(CastRejected {
                skill: intent.skill,
                reason,
            });
        }
    }

    let current = registry.len();
    if current != previous {
        count_changed.write(ActiveEffectsChanged { previous, current });
    }
}

/// Система: один тик registry → EffectDamage события
pub fn tick_skill_effects(
    time: Res<Time>,
    targets: Res<TargetSnapshot>,
    caster: Res<CasterState>,
    mut registry: ResMut<EffectRegistry>,
    mut damage_events: EventWriter<EffectDamage>,
    mut count_changed: EventWriter<ActiveEffectsChanged>,
) {
    let previous = registry.len();
    let input = TickInput {
        dt: time.delta_secs(),
        now: time.elapsed_secs(),
        targets: &targets.targets,
        caster_position: caster.position,
    };

    let report = registry.tick(input, |hit| {
        damage_events.write(EffectDamage::from(hit));
    });

    for (id, reason) in &report.removed {
        logger::log(&format!("Effect {:?} removed: {:?}", id, reason));
    }

    let current = registry.len();
    if current != previous {
        count_changed.write(ActiveEffectsChanged { previous, current });
    }
}
