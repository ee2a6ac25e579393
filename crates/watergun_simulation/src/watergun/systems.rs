//! WaterGun system implementations
//!
//! # Systems (FixedUpdate, chained)
//!
//! - `build_nozzle_pools`: pool для новых водомётов
//! - `process_change_nozzle`: ChangeNozzleIntent / NozzleBlendInput
//! - `update_trigger_pressure`: analog → pressure, nozzle movement
//! - `advance_water_gun`: aim, turbo, blend/commit, clamp
//! - `refill_water`: набор воды в воде
//! - `resolve_emit_positions`: joint transforms → emit positions
//! - `emit_water`: gate + emit + effects
//! - `tick_effect_gates`: отправка EffectStarted, cooldowns

use bevy::prelude::*;

use super::collaborators::{
    EffectGates, MountLink, NoMount, NozzleSkeleton, OwnerSurroundings, RiderLink, TriggerInput,
};
use super::events::*;
use super::params::WaterGunParams;
use super::state::WaterGun;
use crate::error::fatal;
use crate::nozzle::{NozzlePool, NozzleRegistry, NozzleTuning};
use crate::log_error;

fn rider_of(mount: Option<&MountLink>) -> &dyn RiderLink {
    match mount {
        Some(link) => link,
        None => &NoMount,
    }
}

// ============================================================================
// Pool build
// ============================================================================

/// Собрать NozzlePool для водомётов без pool'а
pub fn build_nozzle_pools(
    mut commands: Commands,
    registry: Res<NozzleRegistry>,
    tuning: Res<NozzleTuning>,
    guns: Query<Entity, (With<WaterGun>, Without<NozzlePool>)>,
) {
    for entity in guns.iter() {
        commands
            .entity(entity)
            .insert(NozzlePool::build(entity, &registry, &tuning));
    }
}

// ============================================================================
// Switch intents
// ============================================================================

/// Process ChangeNozzleIntent + NozzleBlendInput
pub fn process_change_nozzle(
    mut intents: EventReader<ChangeNozzleIntent>,
    mut blend_inputs: EventReader<NozzleBlendInput>,
    mut guns: Query<(&mut WaterGun, &mut NozzlePool, Option<&MountLink>)>,
    params: Res<WaterGunParams>,
    mut changed: EventWriter<NozzleChanged>,
) {
    for intent in intents.read() {
        let Ok((mut gun, mut pool, mount)) = guns.get_mut(intent.entity) else {
            log_error(&format!("Entity {:?} missing WaterGun/NozzlePool", intent.entity));
            continue;
        };

        let from = gun.current_nozzle;
        if let Err(err) =
            gun.request_switch(&mut pool, intent.nozzle, intent.replenish, rider_of(mount), &params)
        {
            log_error(&format!("⚠️ Nozzle switch rejected for {:?}: {}", intent.entity, err));
            continue;
        }

        if gun.current_nozzle != from {
            changed.write(NozzleChanged {
                owner: intent.entity,
                from,
                to: gun.current_nozzle,
            });
        }
    }

    for input in blend_inputs.read() {
        if let Ok((mut gun, _, _)) = guns.get_mut(input.entity) {
            gun.drive_blend(input.rate);
        }
    }
}

// ============================================================================
// Per-tick pipeline
// ============================================================================

/// Analog trigger → pressure, movement текущей насадки, envelope
pub fn update_trigger_pressure(
    mut guns: Query<(Entity, &mut WaterGun, &mut NozzlePool, Option<&TriggerInput>)>,
) {
    for (entity, mut gun, mut pool, input) in guns.iter_mut() {
        let analog = input.map(|i| i.analog).unwrap_or(0.0);
        if let Err(err) = gun.update_trigger(&mut pool, analog) {
            log_error(&format!("⚠️ Trigger update failed for {:?}: {}", entity, err));
        }
    }
}

/// Aim, turbo, mount tank, blend advance + commit
pub fn advance_water_gun(
    mut guns: Query<(
        Entity,
        &mut WaterGun,
        &mut NozzlePool,
        Option<&TriggerInput>,
        Option<&MountLink>,
        Option<&OwnerSurroundings>,
    )>,
    params: Res<WaterGunParams>,
    mut changed: EventWriter<NozzleChanged>,
) {
    for (entity, mut gun, mut pool, input, mount, surroundings) in guns.iter_mut() {
        let from = gun.current_nozzle;
        let aim = input.map(|i| i.aim).unwrap_or(Vec2::ZERO);
        let paused = surroundings.is_some_and(|s| s.paused);

        if let Err(err) = gun.movement(&mut pool, rider_of(mount), aim, paused, &params) {
            log_error(&format!("⚠️ WaterGun movement failed for {:?}: {}", entity, err));
            continue;
        }

        if gun.current_nozzle != from {
            changed.write(NozzleChanged {
                owner: entity,
                from,
                to: gun.current_nozzle,
            });
        }
    }
}

/// Набор воды: владелец в воде и trigger нажат
pub fn refill_water(
    mut guns: Query<(Entity, &mut WaterGun, &NozzlePool, &OwnerSurroundings)>,
    mut gates: ResMut<EffectGates>,
) {
    for (entity, mut gun, pool, surroundings) in guns.iter_mut() {
        if !surroundings.submerged || gun.pressure == 0 {
            continue;
        }

        if let Err(err) = gun.suck(pool, &mut gates.for_owner(entity)) {
            log_error(&format!("⚠️ Refill failed for {:?}: {}", entity, err));
        }
    }
}

/// Emit positions из joint transforms
///
/// Рассинхрон stream table ↔ descriptor фатален.
pub fn resolve_emit_positions(
    mut guns: Query<(&mut WaterGun, &NozzlePool, Option<&NozzleSkeleton>, Option<&MountLink>)>,
) {
    let no_skeleton = NozzleSkeleton::default();

    for (mut gun, pool, skeleton, mount) in guns.iter_mut() {
        let joints = skeleton.unwrap_or(&no_skeleton);
        if let Err(err) = gun.update_emit_positions(pool, joints, rider_of(mount)) {
            fatal(&err);
        }
    }
}

/// Gate + emit + effect channel
pub fn emit_water(
    mut guns: Query<(
        Entity,
        &mut WaterGun,
        &mut NozzlePool,
        Option<&NozzleSkeleton>,
        Option<&MountLink>,
        Option<&OwnerSurroundings>,
    )>,
    params: Res<WaterGunParams>,
    mut gates: ResMut<EffectGates>,
    mut emitted: EventWriter<WaterEmitted>,
) {
    let no_skeleton = NozzleSkeleton::default();
    let open_air = OwnerSurroundings::default();

    for (entity, mut gun, mut pool, skeleton, mount, surroundings) in guns.iter_mut() {
        let surroundings = surroundings.unwrap_or(&open_air);

        if !gun.is_emitting(&pool, surroundings.paused) {
            gun.emitted_this_tick = false;
            continue;
        }

        let result = gun.emit(
            &mut pool,
            skeleton.unwrap_or(&no_skeleton),
            rider_of(mount),
            surroundings,
            &params,
            &mut gates.for_owner(entity),
        );

        match result {
            Ok(shots) => {
                for shot in shots {
                    emitted.write(WaterEmitted {
                        owner: entity,
                        stream: shot.stream,
                        position: shot.position,
                        amount: shot.amount,
                    });
                }
            }
            Err(err) => fatal(&err),
        }
    }
}

/// Отправить накопленные EffectStarted и уменьшить cooldowns
pub fn tick_effect_gates(mut gates: ResMut<EffectGates>, mut started: EventWriter<EffectStarted>) {
    let pending: Vec<_> = gates.drain_pending().collect();
    for event in pending {
        started.write(event);
    }
    gates.tick();
}
