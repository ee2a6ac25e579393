//! Тесты детерминизма
//!
//! Одинаковый scripted input → идентичное состояние водомётов

use bevy::prelude::*;
use watergun_simulation::nozzle::{HOVER, TURBO, UNDERWATER};
use watergun_simulation::*;

const OWNER_COUNT: usize = 8;
const TICK_COUNT: usize = 300;

#[test]
fn test_determinism_same_script() {
    let snapshot1 = run_simulation(OWNER_COUNT, TICK_COUNT);
    let snapshot2 = run_simulation(OWNER_COUNT, TICK_COUNT);

    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым input дала разные результаты!"
    );
}

#[test]
fn test_determinism_multiple_runs() {
    let snapshots: Vec<_> = (0..3)
        .map(|_| run_simulation(OWNER_COUNT, TICK_COUNT))
        .collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

/// Analog trigger владельца `index` на tick'е `tick` (детерминированный паттерн)
fn scripted_analog(index: usize, tick: usize) -> f32 {
    let phase = (tick + index * 17) % 90;
    if phase < 60 {
        (phase as f32 / 60.0).min(1.0)
    } else {
        0.0
    }
}

/// Запускает симуляцию и возвращает snapshot всех WaterGun
fn run_simulation(owner_count: usize, tick_count: usize) -> Vec<u8> {
    let mut app = create_headless_app();
    app.add_plugins(SimulationPlugin);

    let owners: Vec<Entity> = (0..owner_count)
        .map(|i| {
            app.world_mut()
                .spawn((
                    WaterGun::new(20.0 + i as f32 * 10.0),
                    TriggerInput::default(),
                    OwnerSurroundings {
                        submerged: i % 3 == 0,
                        water_surface_height: 5.0,
                        ..Default::default()
                    },
                ))
                .id()
        })
        .collect();

    let targets = [UNDERWATER, TURBO, HOVER, NozzleId::PRIMARY];

    for tick in 0..tick_count {
        for (i, &owner) in owners.iter().enumerate() {
            if let Some(mut input) = app.world_mut().get_mut::<TriggerInput>(owner) {
                input.analog = scripted_analog(i, tick);
                input.aim = Vec2::new(i as f32, tick as f32 * 0.01);
            }

            if (tick + i * 11) % 75 == 0 {
                app.world_mut().send_event(ChangeNozzleIntent {
                    entity: owner,
                    nozzle: targets[(tick / 75 + i) % targets.len()],
                    replenish: i % 2 == 0,
                });
            }
        }

        run_tick(&mut app);
    }

    world_snapshot::<WaterGun>(app.world_mut())
}
