//! Built-in насадки (ids 0..BUILTIN_COUNT)
//!
//! | Id | Kind | Streams | Joints |
//! |----|------|---------|--------|
//! | 0 | Spray | 1 | 7 |
//! | 1 | Rocket (trigger) | 1 | 7 |
//! | 2 | Underwater | 2 | 2, 4 |
//! | 3 | Yoshi (mount) | 1 | 2 |
//! | 4 | Hover (trigger) | 2 | 2, 4 |
//! | 5 | Turbo | 1 | 5 |

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    EmitParams, Nozzle, NozzleContext, NozzleId, NozzleInput, NozzleKind, SprayState,
    TriggerState, MAX_EMITTERS,
};

pub const SPRAY: NozzleId = NozzleId(0);
pub const ROCKET: NozzleId = NozzleId(1);
pub const UNDERWATER: NozzleId = NozzleId(2);
pub const YOSHI: NozzleId = NozzleId(3);
pub const HOVER: NozzleId = NozzleId(4);
pub const TURBO: NozzleId = NozzleId(5);

pub const BUILTIN_COUNT: usize = 6;

/// Имена built-in насадок (зарезервированы, registry их не принимает)
pub const BUILTIN_NAMES: [&str; BUILTIN_COUNT] =
    ["spray", "rocket", "underwater", "yoshi", "hover", "turbo"];

/// Compiled-in stream counts
pub const BUILTIN_STREAMS: [usize; BUILTIN_COUNT] = [1, 1, 2, 1, 2, 1];

/// Compiled-in joint-emitter table (из какого joint'а модели идёт stream)
pub const BUILTIN_JOINTS: [[u32; MAX_EMITTERS]; BUILTIN_COUNT] =
    [[7, 0], [7, 0], [2, 4], [2, 0], [2, 4], [5, 0]];

// ============================================================================
// Tuning
// ============================================================================

/// Параметры trigger-type насадки
#[derive(Clone, Copy, Debug, PartialEq, Reflect, Serialize, Deserialize)]
pub struct TriggerParams {
    /// Fill за tick при полном envelope
    pub charge_rate: f32,
    /// Длительность burst после полного заряда (ticks)
    pub burst_ticks: u32,
    /// Отпущенный trigger обрывает burst
    pub release_cancels: bool,
}

/// Tuning built-in насадок
///
/// Hardcoded defaults, значения иллюстративные.
#[derive(Resource, Clone, Debug, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct NozzleTuning {
    pub spray: EmitParams,
    pub rocket: EmitParams,
    pub underwater: EmitParams,
    pub yoshi: EmitParams,
    pub hover: EmitParams,
    pub turbo: EmitParams,
    pub rocket_trigger: TriggerParams,
    pub hover_trigger: TriggerParams,
}

impl Default for NozzleTuning {
    fn default() -> Self {
        Self {
            spray: EmitParams {
                amount_max: 100.0,
                suck_rate: 0.1,
                inside_pressure_max: 0.0,
                emit_rate: 0.5,
            },
            rocket: EmitParams {
                amount_max: 100.0,
                suck_rate: 0.1,
                inside_pressure_max: 1.0,
                emit_rate: 10.0,
            },
            underwater: EmitParams {
                amount_max: 150.0,
                suck_rate: 0.1,
                inside_pressure_max: 0.0,
                emit_rate: 0.4,
            },
            yoshi: EmitParams {
                amount_max: 100.0,
                suck_rate: 0.0,
                inside_pressure_max: 0.0,
                emit_rate: 0.5,
            },
            hover: EmitParams {
                amount_max: 100.0,
                suck_rate: 0.1,
                inside_pressure_max: 1.0,
                emit_rate: 0.3,
            },
            turbo: EmitParams {
                amount_max: 200.0,
                suck_rate: 0.2,
                inside_pressure_max: 0.0,
                emit_rate: 0.8,
            },
            rocket_trigger: TriggerParams {
                charge_rate: 0.02,
                burst_ticks: 4,
                release_cancels: false,
            },
            hover_trigger: TriggerParams {
                charge_rate: 1.0,
                burst_ticks: 180,
                release_cancels: true,
            },
        }
    }
}

/// Создать built-in насадку для `ctx.id` (None если id не built-in)
pub fn spawn_builtin(ctx: &NozzleContext) -> Option<Box<dyn Nozzle>> {
    let tuning = ctx.tuning;
    let nozzle: Box<dyn Nozzle> = match ctx.id {
        SPRAY => Box::new(SprayNozzle::new(NozzleKind::Spray, tuning.spray)),
        ROCKET => Box::new(TriggerNozzle::new(
            NozzleKind::Rocket,
            tuning.rocket,
            tuning.rocket_trigger,
        )),
        UNDERWATER => Box::new(SprayNozzle::new(NozzleKind::Underwater, tuning.underwater)),
        YOSHI => Box::new(SprayNozzle::new(NozzleKind::Yoshi, tuning.yoshi)),
        HOVER => Box::new(TriggerNozzle::new(
            NozzleKind::Hover,
            tuning.hover,
            tuning.hover_trigger,
        )),
        TURBO => Box::new(SprayNozzle::new(NozzleKind::Turbo, tuning.turbo)),
        _ => return None,
    };
    Some(nozzle)
}

// ============================================================================
// SprayNozzle (Spray, Underwater, Yoshi, Turbo)
// ============================================================================

/// Continuous насадка: spray amount пропорционален pressure
#[derive(Debug, Clone)]
pub struct SprayNozzle {
    kind: NozzleKind,
    params: EmitParams,
    spray_amount: f32,
    anim_frame: f32,
}

impl SprayNozzle {
    pub fn new(kind: NozzleKind, params: EmitParams) -> Self {
        Self {
            kind,
            params,
            spray_amount: 0.0,
            anim_frame: 0.0,
        }
    }

    pub fn anim_frame(&self) -> f32 {
        self.anim_frame
    }
}

impl Nozzle for SprayNozzle {
    fn kind(&self) -> NozzleKind {
        self.kind
    }

    fn emit_params(&self) -> &EmitParams {
        &self.params
    }

    fn init(&mut self) {
        self.spray_amount = 0.0;
        self.anim_frame = 0.0;
    }

    fn movement(&mut self, input: &NozzleInput) {
        self.spray_amount = self.params.emit_rate * input.pressure_ratio();
    }

    fn animation(&mut self) {
        if self.spray_amount > 0.0 {
            self.anim_frame += 1.0;
        }
    }

    fn emit(&mut self, _stream: usize) -> f32 {
        self.spray_amount
    }

    fn spray_amount(&self) -> f32 {
        self.spray_amount
    }
}

// ============================================================================
// TriggerNozzle (Rocket, Hover)
// ============================================================================

/// Trigger-activated насадка
///
/// Fill копится от pressure envelope, на полном fill → burst на `burst_ticks`.
/// Envelope упал до 0 до полного заряда → fill сбрасывается.
#[derive(Debug, Clone)]
pub struct TriggerNozzle {
    kind: NozzleKind,
    params: EmitParams,
    trigger_params: TriggerParams,
    state: TriggerState,
}

impl TriggerNozzle {
    pub fn new(kind: NozzleKind, params: EmitParams, trigger_params: TriggerParams) -> Self {
        Self {
            kind,
            params,
            trigger_params,
            state: TriggerState::default(),
        }
    }

    pub fn state(&self) -> &TriggerState {
        &self.state
    }
}

impl Nozzle for TriggerNozzle {
    fn kind(&self) -> NozzleKind {
        self.kind
    }

    fn emit_params(&self) -> &EmitParams {
        &self.params
    }

    fn init(&mut self) {
        self.state = TriggerState::default();
    }

    fn movement(&mut self, input: &NozzleInput) {
        let state = &mut self.state;

        match state.spray_state {
            SprayState::Active => {
                state.burst_timer = state.burst_timer.saturating_sub(1);
                if self.trigger_params.release_cancels && input.pressure == 0 {
                    state.burst_timer = 0;
                }
                if state.burst_timer == 0 {
                    state.spray_state = SprayState::Inactive;
                    state.fill = 0.0;
                }
            }
            SprayState::Inactive => {
                if input.previous_pressure == 0 {
                    state.fill = 0.0;
                    return;
                }

                let max = self.params.inside_pressure_max;
                state.fill = (state.fill + self.trigger_params.charge_rate * input.envelope_ratio())
                    .min(max);

                if state.fill >= max && self.trigger_params.burst_ticks > 0 {
                    state.spray_state = SprayState::Active;
                    state.burst_timer = self.trigger_params.burst_ticks;
                }
            }
        }
    }

    fn emit(&mut self, _stream: usize) -> f32 {
        self.spray_amount()
    }

    fn spray_amount(&self) -> f32 {
        if self.state.is_active() {
            self.params.emit_rate
        } else {
            0.0
        }
    }

    fn trigger(&self) -> Option<&TriggerState> {
        Some(&self.state)
    }
}
