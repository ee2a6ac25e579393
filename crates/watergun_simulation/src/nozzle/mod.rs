//! Nozzle module — сменные насадки водомёта
//!
//! # Architecture
//!
//! **Nozzle**: trait (capability set): init / movement / animation / emit / kind.
//! Kind-specific поведение достаётся через `trigger()` (safe downcast), без
//! reinterpret по integer tag.
//!
//! **Built-in vs custom:**
//! - Built-in kinds (ids 0..BUILTIN_COUNT) создаются из `NozzleTuning`
//! - Custom kinds регистрируются в `NozzleRegistry` (name + factory + streams + joints)
//! - `NozzlePool` собирает оба источника в один dense Vec, index == `NozzleId`
//!
//! **Streams:** 1 или 2 точки выброса воды, каждая привязана к joint'у модели.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod builtin;
pub mod pool;
pub mod registry;


pub use builtin::*;
pub use pool::{NozzlePool, NozzleSlot};
pub use registry::{NozzleDescriptor, NozzleFactory, NozzleRegistry, RegisterNozzleExt};

/// Максимум streams на одну насадку
pub const MAX_EMITTERS: usize = 2;

/// Pressure шкала (analog 0..1 → 0..150)
pub const PRESSURE_MAX: u8 = 150;

// ============================================================================
// NozzleId
// ============================================================================

/// Index насадки в `NozzlePool` (0 = primary / spray)
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect, Serialize, Deserialize,
)]
pub struct NozzleId(pub u8);

impl NozzleId {
    /// Neutral/primary насадка, цель "downward" blend
    pub const PRIMARY: NozzleId = NozzleId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_primary(self) -> bool {
        self == Self::PRIMARY
    }
}

impl fmt::Display for NozzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// NozzleKind
// ============================================================================

/// Вид насадки (определяет effect channel и особые случаи в WaterGun)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum NozzleKind {
    /// Default spray
    Spray,
    /// Trigger-activated burst (silent)
    Rocket,
    /// Wide 2-stream spray
    Underwater,
    /// Mount/rider: tank и transform берутся у companion'а (silent)
    Yoshi,
    /// Trigger-activated hover (2 streams)
    Hover,
    /// Forward thrust, копит angular speed
    Turbo,
    /// Внешне зарегистрированная насадка
    Custom,
}

impl NozzleKind {
    pub fn is_mount(self) -> bool {
        matches!(self, NozzleKind::Yoshi)
    }

    pub fn is_turbo(self) -> bool {
        matches!(self, NozzleKind::Turbo)
    }
}

// ============================================================================
// Params
// ============================================================================

/// Emit параметры насадки (immutable после создания)
#[derive(Clone, Copy, Debug, PartialEq, Reflect, Serialize, Deserialize)]
pub struct EmitParams {
    /// Capacity бака пока насадка активна
    pub amount_max: f32,
    /// Water за tick на единицу pressure при refill
    pub suck_rate: f32,
    /// Максимум trigger fill (только trigger kinds)
    pub inside_pressure_max: f32,
    /// Water за tick на stream при полном нажатии
    pub emit_rate: f32,
}

impl Default for EmitParams {
    fn default() -> Self {
        Self {
            amount_max: 100.0,
            suck_rate: 0.1,
            inside_pressure_max: 0.0,
            emit_rate: 1.0,
        }
    }
}

/// Per-tick вход для `Nozzle::movement`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NozzleInput {
    pub pressure: u8,
    pub previous_pressure: u8,
}

impl NozzleInput {
    /// Pressure в [0, 1]
    pub fn pressure_ratio(&self) -> f32 {
        self.pressure as f32 / PRESSURE_MAX as f32
    }

    /// Fast-attack/slow-release envelope в [0, 1]
    pub fn envelope_ratio(&self) -> f32 {
        self.previous_pressure as f32 / PRESSURE_MAX as f32
    }
}

// ============================================================================
// Trigger state
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum SprayState {
    #[default]
    Inactive,
    Active,
}

/// Состояние trigger-type насадки: fill level + active/inactive
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect, Serialize, Deserialize)]
pub struct TriggerState {
    pub fill: f32,
    pub spray_state: SprayState,
    /// Сколько tick'ов ещё длится burst
    pub burst_timer: u32,
}

impl TriggerState {
    pub fn is_active(&self) -> bool {
        self.spray_state == SprayState::Active
    }
}

// ============================================================================
// Effect channel
// ============================================================================

/// Rate-limited effect slot (звук/частицы), максимум один на kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum EffectChannel {
    Spray,
    WideSpray,
    TurboJet,
    Refill,
    Custom(u32),
}

// ============================================================================
// Nozzle trait
// ============================================================================

/// Context для factory (built-in и custom)
pub struct NozzleContext<'a> {
    /// Владелец водомёта
    pub owner: Entity,
    /// Id, который получит созданная насадка
    pub id: NozzleId,
    /// Tuning built-in насадок (custom могут брать за основу)
    pub tuning: &'a NozzleTuning,
}

/// Capability set насадки
///
/// Pool эксклюзивно владеет instances, indices стабильны после build.
pub trait Nozzle: Send + Sync + 'static {
    fn kind(&self) -> NozzleKind;

    fn emit_params(&self) -> &EmitParams;

    /// Сброс внутреннего состояния (вызывается при commit смены насадки)
    fn init(&mut self);

    /// Per-tick update от trigger pressure
    fn movement(&mut self, input: &NozzleInput);

    /// Per-tick animation advance
    fn animation(&mut self) {}

    /// Выброс воды из stream'а, возвращает сколько воды ушло
    fn emit(&mut self, stream: usize) -> f32;

    /// Текущая интенсивность spray (0 = не льёт)
    fn spray_amount(&self) -> f32;

    /// Downcast к trigger-type состоянию
    fn trigger(&self) -> Option<&TriggerState> {
        None
    }

    /// Effect channel для `NozzleKind::Custom`
    fn effect_channel(&self) -> Option<EffectChannel> {
        None
    }
}
