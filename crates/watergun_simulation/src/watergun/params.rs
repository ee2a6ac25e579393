//! Tuning водомёта (не per-nozzle)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Глобальные параметры водомёта
#[derive(Resource, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct WaterGunParams {
    /// |blend_rate| при `ChangeNozzleIntent` (progress за tick)
    pub switch_speed: f32,
    /// Скорость сглаживания aim (0..1 за tick)
    pub aim_change_speed: f32,
    /// Turbo: прирост angular speed на единицу spray amount
    pub turbo_angle_speed: f32,
    /// Turbo: множитель торможения за tick
    pub turbo_brake: f32,
    /// Turbo: cap angular speed
    pub turbo_speed_max: f32,
    /// Запас над поверхностью воды для emission под водой
    pub surface_clearance: f32,
}

impl Default for WaterGunParams {
    fn default() -> Self {
        Self {
            switch_speed: 0.1, // 10 ticks на полный blend
            aim_change_speed: 0.2,
            turbo_angle_speed: 0.5,
            turbo_brake: 0.9,
            turbo_speed_max: 3.0,
            surface_clearance: 20.0,
        }
    }
}

impl WaterGunParams {
    /// Blend rate с clamp'ом: progress остаётся определён каждый tick
    pub fn clamped_rate(rate: f32) -> f32 {
        if rate.is_finite() {
            rate.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}
