//! WaterGun module — per-owner водомёт
//!
//! # Architecture
//!
//! **Core (plain methods на `WaterGun`):**
//! - pressure envelope, switch state machine, emission resolver, trigger gate
//! - collaborators только через traits (`JointTransforms`, `RiderLink`, `EffectGate`)
//!
//! **ECS glue (systems):**
//! - хост пишет `TriggerInput`, `NozzleSkeleton`, `MountLink`, `OwnerSurroundings`
//! - симуляция отвечает `NozzleChanged`, `WaterEmitted`, `EffectStarted`
//!
//! **Порядок за tick (детерминизм):**
//! pressure → blend/commit → emit positions → emission + effects

use bevy::prelude::*;

pub mod collaborators;
pub mod emit;
pub mod events;
pub mod params;
pub mod state;
pub mod switch;
pub mod systems;

#[cfg(test)]
mod switch_tests;

pub use collaborators::*;
pub use emit::{effect_cue, StreamShot};
pub use events::*;
pub use params::WaterGunParams;
pub use state::WaterGun;
pub use systems::*;

use crate::nozzle::{NozzleRegistry, NozzleTuning};

/// WaterGun plugin
///
/// Регистрирует resources, events и per-tick pipeline в FixedUpdate.
/// Registry не перезаписывается: насадки, зарегистрированные до plugin'а, сохраняются.
pub struct WaterGunPlugin;

impl Plugin for WaterGunPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NozzleRegistry>()
            .init_resource::<NozzleTuning>()
            .init_resource::<WaterGunParams>()
            .init_resource::<EffectGates>()
            // Events
            .add_event::<ChangeNozzleIntent>()
            .add_event::<NozzleBlendInput>()
            .add_event::<NozzleChanged>()
            .add_event::<WaterEmitted>()
            .add_event::<EffectStarted>()
            .add_systems(
                FixedUpdate,
                (
                    build_nozzle_pools,
                    process_change_nozzle,
                    update_trigger_pressure,
                    advance_water_gun,
                    refill_water,
                    resolve_emit_positions,
                    emit_water,
                    tick_effect_gates,
                )
                    .chain(), // Последовательное выполнение для детерминизма
            );
    }
}
