//! WaterGun component: per-owner состояние водомёта
//!
//! Инварианты (после каждой мутации):
//! - 0 ≤ water_amount ≤ capacity(current_nozzle)
//! - 0 ≤ blend_progress ≤ 1
//! - pressure ≤ 150, previous_pressure ≥ 0
//!
//! `second_nozzle` значим только пока switch pending.

use bevy::prelude::*;

use super::collaborators::{EffectCue, EffectGate, RiderLink};
use super::params::WaterGunParams;
use crate::error::NozzleError;
use crate::nozzle::{
    EffectChannel, NozzleId, NozzleInput, NozzlePool, MAX_EMITTERS, PRESSURE_MAX,
};

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WaterGun {
    /// Authoritative насадка (capacity, kind, effects)
    pub current_nozzle: NozzleId,
    /// Queued насадка для upward blend
    pub second_nozzle: NozzleId,
    /// 0 = primary, 1 = secondary, commit на пересечении 0.5
    pub blend_progress: f32,
    /// 0 = нет pending switch
    pub blend_rate: f32,
    pub water_amount: f32,
    /// round(analog * 150)
    pub pressure: u8,
    /// Fast-attack / slow-release envelope от pressure
    pub previous_pressure: u8,
    /// Last-resolved world positions; валидны только для stream < stream_count
    pub emit_positions: [Vec3; MAX_EMITTERS],
    /// Сглаженный aim
    pub nozzle_speed: Vec2,
    pub turbo_angular_speed: f32,
    pub turbo_angle: f32,
    /// One-shot suppression: блокирует emission до `clear_suppression`
    pub emit_suppressed: bool,
    /// Пока взведён, бак принудительно пуст
    pub tank_locked_empty: bool,
    /// Хоть один stream выбросил воду в этом tick'е
    pub emitted_this_tick: bool,
}

impl Default for WaterGun {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl WaterGun {
    /// Водомёт на primary насадке (water clamp'ится на первом tick'е)
    pub fn new(water_amount: f32) -> Self {
        Self {
            current_nozzle: NozzleId::PRIMARY,
            second_nozzle: NozzleId::PRIMARY,
            blend_progress: 0.0,
            blend_rate: 0.0,
            water_amount,
            pressure: 0,
            previous_pressure: 0,
            emit_positions: [Vec3::ZERO; MAX_EMITTERS],
            nozzle_speed: Vec2::ZERO,
            turbo_angular_speed: 0.0,
            turbo_angle: 0.0,
            emit_suppressed: false,
            tank_locked_empty: false,
            emitted_this_tick: false,
        }
    }

    // ========================================================================
    // Water
    // ========================================================================

    pub fn capacity(&self, pool: &NozzlePool) -> Result<f32, NozzleError> {
        pool.capacity_of(self.current_nozzle)
    }

    /// Fullness ratio текущего бака
    pub fn water_percent(&self, pool: &NozzlePool) -> Result<f32, NozzleError> {
        let capacity = self.capacity(pool)?;
        if capacity <= 0.0 {
            return Ok(0.0);
        }
        Ok(self.water_amount / capacity)
    }

    /// Clamp water в [0, capacity(current)]
    pub fn clamp_water(&mut self, pool: &NozzlePool) -> Result<(), NozzleError> {
        let capacity = self.capacity(pool)?.max(0.0);
        self.water_amount = if self.water_amount.is_finite() {
            self.water_amount.clamp(0.0, capacity)
        } else {
            0.0
        };
        Ok(())
    }

    /// water = rate * capacity (mount: всегда полный бак)
    pub fn set_amount_to_rate(&mut self, pool: &NozzlePool, rate: f32) -> Result<(), NozzleError> {
        let slot = pool.get(self.current_nozzle)?;
        self.water_amount = if slot.nozzle.kind().is_mount() {
            slot.capacity()
        } else {
            rate * slot.capacity()
        };
        self.clamp_water(pool)
    }

    // ========================================================================
    // Pressure
    // ========================================================================

    /// Pressure из analog trigger + envelope update
    pub fn update_pressure(&mut self, analog: f32) {
        self.sample_pressure(analog);
        self.update_envelope();
    }

    /// Pressure, movement текущей насадки, затем envelope
    ///
    /// Trigger насадка видит envelope прошлого tick'а.
    pub fn update_trigger(&mut self, pool: &mut NozzlePool, analog: f32) -> Result<(), NozzleError> {
        self.sample_pressure(analog);
        let input = self.nozzle_input();
        pool.get_mut(self.current_nozzle)?.nozzle.movement(&input);
        self.update_envelope();
        Ok(())
    }

    fn sample_pressure(&mut self, analog: f32) {
        let analog = if analog.is_finite() {
            analog.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.pressure = (analog * PRESSURE_MAX as f32).round() as u8;
    }

    /// Envelope: вверх мгновенно, вниз ровно на 1 за tick, не ниже 0
    fn update_envelope(&mut self) {
        if self.previous_pressure < self.pressure {
            self.previous_pressure = self.pressure;
        } else if self.previous_pressure > 0 {
            self.previous_pressure -= 1;
        }
    }

    pub fn nozzle_input(&self) -> NozzleInput {
        NozzleInput {
            pressure: self.pressure,
            previous_pressure: self.previous_pressure,
        }
    }

    /// Trigger kind: `inside_pressure_max`, иначе 0
    pub fn pressure_max(&self, pool: &NozzlePool) -> f32 {
        pool.get(self.current_nozzle)
            .ok()
            .filter(|slot| slot.nozzle.trigger().is_some())
            .map(|slot| slot.nozzle.emit_params().inside_pressure_max)
            .unwrap_or(0.0)
    }

    /// Trigger kind: fill level, иначе 0
    pub fn trigger_fill(&self, pool: &NozzlePool) -> f32 {
        pool.get(self.current_nozzle)
            .ok()
            .and_then(|slot| slot.nozzle.trigger().map(|t| t.fill))
            .unwrap_or(0.0)
    }

    pub fn is_pressure_on(&self, pool: &NozzlePool) -> bool {
        pool.get(self.current_nozzle)
            .ok()
            .and_then(|slot| slot.nozzle.trigger().map(|t| t.fill > 0.0))
            .unwrap_or(false)
    }

    // ========================================================================
    // Spray state
    // ========================================================================

    /// Льёт ли водомёт сейчас
    ///
    /// Trigger kinds льют только в Active, остальные пока spray amount > 0.
    pub fn can_spray(&self, pool: &NozzlePool, paused: bool) -> bool {
        if self.water_amount <= 0.0 || paused {
            return false;
        }

        let Ok(slot) = pool.get(self.current_nozzle) else {
            return false;
        };

        match slot.nozzle.trigger() {
            Some(trigger) => trigger.is_active(),
            None => slot.nozzle.spray_amount() > 0.0,
        }
    }

    pub fn is_emitting(&self, pool: &NozzlePool, paused: bool) -> bool {
        self.can_spray(pool, paused)
    }

    // ========================================================================
    // Movement (per-tick)
    // ========================================================================

    /// Per-tick update: aim, turbo, mount tank, blend/commit, animation
    pub fn movement(
        &mut self,
        pool: &mut NozzlePool,
        rider: &dyn RiderLink,
        aim: Vec2,
        paused: bool,
        params: &WaterGunParams,
    ) -> Result<(), NozzleError> {
        if self.tank_locked_empty {
            self.water_amount = 0.0;
        }

        let target = if self.can_spray(pool, paused) {
            aim
        } else {
            Vec2::ZERO
        };
        self.nozzle_speed += (target - self.nozzle_speed) * params.aim_change_speed;

        self.update_turbo(pool, params)?;

        // Mount kind держит бак полным, juice companion'а читается только в commit
        let slot = pool.get(self.current_nozzle)?;
        if slot.nozzle.kind().is_mount() {
            self.water_amount = slot.capacity();
        }

        self.advance_blend(pool, rider)?;

        pool.get_mut(self.current_nozzle)?.nozzle.animation();
        self.clamp_water(pool)
    }

    fn update_turbo(&mut self, pool: &NozzlePool, params: &WaterGunParams) -> Result<(), NozzleError> {
        let slot = pool.get(self.current_nozzle)?;
        if !slot.nozzle.kind().is_turbo() {
            self.turbo_angle = 0.0;
            self.turbo_angular_speed = 0.0;
            return Ok(());
        }

        // OPEN: применяется один раз за tick. Двойной прогон этого блока
        // (x2 разгон) не подтверждён, сверить с reference footage.
        self.turbo_angular_speed += slot.nozzle.spray_amount() * params.turbo_angle_speed;
        self.turbo_angular_speed *= params.turbo_brake;
        self.turbo_angular_speed = self.turbo_angular_speed.min(params.turbo_speed_max);
        self.turbo_angle += self.turbo_angular_speed;
        Ok(())
    }

    // ========================================================================
    // Refill
    // ========================================================================

    /// Набор воды (владелец в воде). Mount kind не набирает.
    pub fn suck(
        &mut self,
        pool: &NozzlePool,
        effects: &mut dyn EffectGate,
    ) -> Result<bool, NozzleError> {
        let slot = pool.get(self.current_nozzle)?;
        if slot.nozzle.kind().is_mount() {
            return Ok(false);
        }

        let power = (self.pressure as f32 * slot.nozzle.emit_params().suck_rate).trunc();
        if power <= 0.0 {
            return Ok(false);
        }

        let capacity = slot.capacity();
        self.water_amount = (self.water_amount + power).min(capacity);

        if self.water_amount < capacity && effects.channel_ready(EffectChannel::Refill) {
            effects.start_effect(EffectCue::plain(EffectChannel::Refill), self.emit_positions[0]);
        }
        Ok(true)
    }

    // ========================================================================
    // Suppression
    // ========================================================================

    pub fn suppress_emission(&mut self) {
        self.emit_suppressed = true;
    }

    pub fn clear_suppression(&mut self) {
        self.emit_suppressed = false;
    }
}
