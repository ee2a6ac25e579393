//! WaterGun events
//!
//! **Intents (host → ECS):**
//! - `ChangeNozzleIntent`: сменить насадку (blend или мгновенно с replenish)
//! - `NozzleBlendInput`: continuous blend input (held direction/gesture)
//!
//! **Outputs (ECS → host):**
//! - `NozzleChanged`: commit смены насадки (рендер меняет модель)
//! - `WaterEmitted`: stream выбросил воду (particles)
//! - `EffectStarted`: effect channel сработал (звук)

use bevy::prelude::*;

use crate::nozzle::{EffectChannel, NozzleId};

/// Сменить насадку
///
/// # Flow
/// 1. `nozzle == PRIMARY` → blend вниз
/// 2. иначе → `second_nozzle = nozzle`, blend вверх
/// 3. `replenish` → бак полный, blend сразу settled, commit в этом же tick'е
#[derive(Event, Clone, Debug)]
pub struct ChangeNozzleIntent {
    pub entity: Entity,
    pub nozzle: NozzleId,
    pub replenish: bool,
}

/// Continuous blend input (rate за tick, clamp в [-1, 1])
#[derive(Event, Clone, Debug)]
pub struct NozzleBlendInput {
    pub entity: Entity,
    pub rate: f32,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct NozzleChanged {
    pub owner: Entity,
    pub from: NozzleId,
    pub to: NozzleId,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct WaterEmitted {
    pub owner: Entity,
    pub stream: usize,
    pub position: Vec3,
    pub amount: f32,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct EffectStarted {
    pub owner: Entity,
    pub channel: EffectChannel,
    pub position: Vec3,
    pub intensity: Option<f32>,
}
