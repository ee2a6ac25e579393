//! Watergun Simulation Core
//!
//! Расширяемый водомёт персонажа на Bevy 0.16 ECS:
//! - сменные насадки (built-in + внешне зарегистрированные)
//! - конечный бак воды, pressure от analog trigger
//! - плавный blend между primary и secondary насадкой
//! - resolve точек выброса из скелета модели, rate-limited effects
//!
//! Рендер, анимация, звук, input и companion живут снаружи,
//! симуляция видит их только через узкие traits (`watergun::collaborators`).

use bevy::prelude::*;

pub mod error;
pub mod logger;
pub mod nozzle;
pub mod watergun;

pub use error::{fatal, NozzleError};
pub use logger::{
    init_logger, log, log_error, log_info, set_log_level, set_logger,
    set_logger_if_needed, LogLevel, LogPrinter,
};
pub use nozzle::{
    EffectChannel, EmitParams, Nozzle, NozzleContext, NozzleId, NozzleInput, NozzleKind,
    NozzlePool, NozzleRegistry, NozzleTuning, RegisterNozzleExt,
};
pub use watergun::*;

/// Главный plugin симуляции
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz (frame-locked tick)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_plugins(WaterGunPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Один simulation tick (весь per-tick pipeline ровно один раз)
pub fn run_tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
