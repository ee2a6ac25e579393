//! Внешние collaborators водомёта (узкие интерфейсы)
//!
//! Хост (рендер, input, звук, companion) владеет реальными данными и пишет
//! их в компоненты ниже каждый tick. Симуляция читает только через traits:
//! - `JointTransforms`: world matrix joint'а модели насадки
//! - `RiderLink`: ridden companion (active, juice, base transform)
//! - `EffectGate`: rate-limited effect channels (звук/частицы)

use bevy::prelude::*;
use std::collections::HashMap;

use super::events::EffectStarted;
use crate::nozzle::{EffectChannel, NozzleId};

// ============================================================================
// Traits
// ============================================================================

/// Transform provider: joint matrix live модели насадки
pub trait JointTransforms {
    /// None если у насадки нет live модели (transient, не ошибка)
    fn joint_transform(&self, nozzle: NozzleId, joint: u32) -> Option<Mat4>;
}

/// Ridden companion
pub trait RiderLink {
    fn is_riding(&self) -> bool;
    /// Resource companion'а (его собственный бак)
    fn juice(&self) -> f32;
    fn base_transform(&self) -> Option<Mat4>;
}

/// Effect запрос: channel + опциональная intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectCue {
    pub channel: EffectChannel,
    pub intensity: Option<f32>,
}

impl EffectCue {
    pub fn plain(channel: EffectChannel) -> Self {
        Self {
            channel,
            intensity: None,
        }
    }
}

/// Rate-limited effect system
pub trait EffectGate {
    /// Может ли channel сработать снова
    fn channel_ready(&self, channel: EffectChannel) -> bool;
    fn start_effect(&mut self, cue: EffectCue, position: Vec3);
}

// ============================================================================
// Host-side components
// ============================================================================

/// Analog trigger + aim stick (пишет input layer)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct TriggerInput {
    /// 0.0..=1.0
    pub analog: f32,
    pub aim: Vec2,
}

/// Joint matrices live моделей насадок (пишет animation layer)
#[derive(Component, Debug, Clone, Default)]
pub struct NozzleSkeleton {
    models: HashMap<NozzleId, Vec<Mat4>>,
}

impl NozzleSkeleton {
    pub fn attach(&mut self, nozzle: NozzleId, joints: Vec<Mat4>) {
        self.models.insert(nozzle, joints);
    }

    pub fn detach(&mut self, nozzle: NozzleId) {
        self.models.remove(&nozzle);
    }

    pub fn has_model(&self, nozzle: NozzleId) -> bool {
        self.models.contains_key(&nozzle)
    }
}

impl JointTransforms for NozzleSkeleton {
    fn joint_transform(&self, nozzle: NozzleId, joint: u32) -> Option<Mat4> {
        self.models.get(&nozzle)?.get(joint as usize).copied()
    }
}

/// Companion (Yoshi-like mount) владельца
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MountLink {
    pub riding: bool,
    pub juice: f32,
    pub base: Option<Mat4>,
}

impl RiderLink for MountLink {
    fn is_riding(&self) -> bool {
        self.riding
    }

    fn juice(&self) -> f32 {
        self.juice
    }

    fn base_transform(&self) -> Option<Mat4> {
        self.base
    }
}

/// Нет companion'а
pub struct NoMount;

impl RiderLink for NoMount {
    fn is_riding(&self) -> bool {
        false
    }

    fn juice(&self) -> f32 {
        0.0
    }

    fn base_transform(&self) -> Option<Mat4> {
        None
    }
}

/// Окружение владельца для emission gate
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct OwnerSurroundings {
    /// Override (helmet camera и т.п.): emission разрешён даже под водой
    pub surface_override: bool,
    /// В воде (shallow или deep)
    pub submerged: bool,
    /// Высота поверхности воды над владельцем
    pub water_surface_height: f32,
    /// Charge threshold хоста
    pub charge_ready: bool,
    /// Stage на паузе / в cutscene
    pub paused: bool,
}

impl Default for OwnerSurroundings {
    fn default() -> Self {
        Self {
            surface_override: false,
            submerged: false,
            water_surface_height: 0.0,
            charge_ready: true,
            paused: false,
        }
    }
}

// ============================================================================
// EffectGates resource
// ============================================================================

/// Rate limiter effect channels (один cooldown на channel)
///
/// `start` взводит cooldown и кладёт `EffectStarted` в очередь,
/// `tick_effect_gates` отправляет очередь и уменьшает cooldowns.
#[derive(Resource, Debug, Clone)]
pub struct EffectGates {
    pub cooldown_ticks: u32,
    cooldowns: HashMap<EffectChannel, u32>,
    pending: Vec<EffectStarted>,
}

impl Default for EffectGates {
    fn default() -> Self {
        Self::new(4)
    }
}

impl EffectGates {
    pub fn new(cooldown_ticks: u32) -> Self {
        Self {
            cooldown_ticks,
            cooldowns: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn is_ready(&self, channel: EffectChannel) -> bool {
        self.cooldowns.get(&channel).copied().unwrap_or(0) == 0
    }

    pub fn start(&mut self, owner: Entity, cue: EffectCue, position: Vec3) {
        self.cooldowns.insert(cue.channel, self.cooldown_ticks);
        self.pending.push(EffectStarted {
            owner,
            channel: cue.channel,
            position,
            intensity: cue.intensity,
        });
    }

    pub fn tick(&mut self) {
        for cooldown in self.cooldowns.values_mut() {
            *cooldown = cooldown.saturating_sub(1);
        }
    }

    pub fn drain_pending(&mut self) -> impl Iterator<Item = EffectStarted> + '_ {
        self.pending.drain(..)
    }

    /// Handle от имени конкретного владельца
    pub fn for_owner(&mut self, owner: Entity) -> OwnerEffects<'_> {
        OwnerEffects { gates: self, owner }
    }
}

/// `EffectGate` поверх `EffectGates` для одного владельца
pub struct OwnerEffects<'a> {
    gates: &'a mut EffectGates,
    owner: Entity,
}

impl EffectGate for OwnerEffects<'_> {
    fn channel_ready(&self, channel: EffectChannel) -> bool {
        self.gates.is_ready(channel)
    }

    fn start_effect(&mut self, cue: EffectCue, position: Vec3) {
        self.gates.start(self.owner, cue, position);
    }
}
