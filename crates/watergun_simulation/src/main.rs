//! Headless симуляция водомёта
//!
//! Прогоняет scripted input: spray → смена на underwater → обратно на primary

use bevy::prelude::*;
use watergun_simulation::nozzle::UNDERWATER;
use watergun_simulation::*;

fn main() {
    let mut app = create_headless_app();
    app.add_plugins(SimulationPlugin);

    log_info("Starting headless watergun simulation");

    let owner = app
        .world_mut()
        .spawn((
            WaterGun::new(100.0),
            TriggerInput {
                analog: 1.0,
                aim: Vec2::new(0.0, 1.0),
            },
            OwnerSurroundings::default(),
        ))
        .id();

    for tick in 0..600 {
        match tick {
            100 => {
                app.world_mut().send_event(ChangeNozzleIntent {
                    entity: owner,
                    nozzle: UNDERWATER,
                    replenish: false,
                });
            }
            400 => {
                app.world_mut().send_event(ChangeNozzleIntent {
                    entity: owner,
                    nozzle: NozzleId::PRIMARY,
                    replenish: false,
                });
            }
            _ => {}
        }

        run_tick(&mut app);

        if tick % 100 == 0 {
            if let Some(gun) = app.world().get::<WaterGun>(owner) {
                log_info(&format!(
                    "Tick {}: nozzle {} water {:.1} pressure {}",
                    tick, gun.current_nozzle, gun.water_amount, gun.pressure
                ));
            }
        }
    }

    log_info("Simulation complete!");
}
