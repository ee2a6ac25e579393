//! Emission: resolve transforms stream'ов, gate, emit, effect channels
//!
//! # Flow (per tick)
//! 1. `update_emit_positions`: translation joint'а каждого активного stream'а
//! 2. `emission_allowed`: composite gate (поверхность воды, rider/charge)
//! 3. `emit`: `Nozzle::emit(stream)` для каждого stream'а + один effect channel

use bevy::prelude::*;

use super::collaborators::{EffectCue, EffectGate, JointTransforms, OwnerSurroundings, RiderLink};
use super::params::WaterGunParams;
use super::state::WaterGun;
use crate::error::NozzleError;
use crate::nozzle::{EffectChannel, Nozzle, NozzleKind, NozzlePool};

/// Выброс воды одним stream'ом за tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamShot {
    pub stream: usize,
    pub position: Vec3,
    pub amount: f32,
}

impl WaterGun {
    /// World transform точки выброса stream'а
    ///
    /// - Верхом на companion'е или mount kind → base transform companion'а
    ///   (любая насадка, любой stream, без проверки stream_count)
    /// - `stream >= stream_count` → `Err(StreamOutOfRange)` (fatal для caller'а)
    /// - нет live модели → `Ok(None)`
    pub fn resolve_emit_transform(
        &self,
        pool: &NozzlePool,
        stream: usize,
        joints: &dyn JointTransforms,
        rider: &dyn RiderLink,
    ) -> Result<Option<Mat4>, NozzleError> {
        let slot = pool.get(self.current_nozzle)?;

        if rider.is_riding() || slot.nozzle.kind().is_mount() {
            return Ok(rider.base_transform());
        }

        let Some(joint) = slot.joint_for(stream) else {
            return Err(NozzleError::StreamOutOfRange {
                nozzle: self.current_nozzle,
                stream,
                max: slot.stream_count,
            });
        };

        Ok(joints.joint_transform(self.current_nozzle, joint))
    }

    /// Обновить `emit_positions[0..stream_count]`
    ///
    /// Stream без transform'а в этом tick'е оставляет прошлую позицию,
    /// slots за stream_count не трогаем.
    pub fn update_emit_positions(
        &mut self,
        pool: &NozzlePool,
        joints: &dyn JointTransforms,
        rider: &dyn RiderLink,
    ) -> Result<(), NozzleError> {
        let stream_count = pool.get(self.current_nozzle)?.stream_count;

        for stream in 0..stream_count {
            if let Some(mtx) = self.resolve_emit_transform(pool, stream, joints, rider)? {
                self.emit_positions[stream] = mtx.w_axis.truncate();
            }
        }
        Ok(())
    }

    /// Composite gate:
    /// `(override || !submerged || above_surface) && (riding || charge_ready)`
    pub fn emission_allowed(
        &self,
        pool: &NozzlePool,
        joints: &dyn JointTransforms,
        rider: &dyn RiderLink,
        surroundings: &OwnerSurroundings,
        params: &WaterGunParams,
    ) -> Result<bool, NozzleError> {
        let above_surface = self
            .resolve_emit_transform(pool, 0, joints, rider)?
            .map(|mtx| {
                surroundings.water_surface_height + params.surface_clearance <= mtx.w_axis.y
            })
            .unwrap_or(false);

        let surface_ok =
            surroundings.surface_override || !surroundings.submerged || above_surface;
        let charge_ok = rider.is_riding() || surroundings.charge_ready;

        Ok(surface_ok && charge_ok)
    }

    /// Emit всех активных stream'ов + effect channel текущего kind'а
    ///
    /// Возвращает shots (пустой Vec если gate закрыт или emission suppressed).
    pub fn emit(
        &mut self,
        pool: &mut NozzlePool,
        joints: &dyn JointTransforms,
        rider: &dyn RiderLink,
        surroundings: &OwnerSurroundings,
        params: &WaterGunParams,
        effects: &mut dyn EffectGate,
    ) -> Result<Vec<StreamShot>, NozzleError> {
        self.emitted_this_tick = false;

        if !self.emission_allowed(pool, joints, rider, surroundings, params)? {
            return Ok(Vec::new());
        }

        if self.emit_suppressed {
            return Ok(Vec::new());
        }

        let slot = pool.get_mut(self.current_nozzle)?;
        let mut shots = Vec::with_capacity(slot.stream_count);

        for stream in 0..slot.stream_count {
            let amount = slot.nozzle.emit(stream);
            if amount <= 0.0 {
                continue;
            }
            self.water_amount = (self.water_amount - amount).max(0.0);
            self.emitted_this_tick = true;
            shots.push(StreamShot {
                stream,
                position: self.emit_positions[stream],
                amount,
            });
        }

        if self.water_amount > 0.0 {
            if let Some(cue) = effect_cue(slot.nozzle.as_ref(), self.emitted_this_tick) {
                if effects.channel_ready(cue.channel) {
                    effects.start_effect(cue, self.emit_positions[0]);
                }
            }
        }

        Ok(shots)
    }
}

/// Effect channel по kind'у насадки (максимум один)
///
/// Rocket и Yoshi silent: emission визуальный, без звука.
pub fn effect_cue(nozzle: &dyn Nozzle, emitted_water: bool) -> Option<EffectCue> {
    match nozzle.kind() {
        NozzleKind::Spray => Some(EffectCue::plain(EffectChannel::Spray)),
        NozzleKind::Underwater => Some(EffectCue::plain(EffectChannel::WideSpray)),
        NozzleKind::Hover => emitted_water.then(|| EffectCue::plain(EffectChannel::WideSpray)),
        NozzleKind::Turbo => Some(EffectCue {
            channel: EffectChannel::TurboJet,
            intensity: Some(nozzle.spray_amount()),
        }),
        NozzleKind::Rocket | NozzleKind::Yoshi => None,
        NozzleKind::Custom => nozzle.effect_channel().map(EffectCue::plain),
    }
}
