//! Tests for the nozzle switch state machine.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::error::NozzleError;
    use crate::nozzle::*;
    use crate::watergun::collaborators::{MountLink, NoMount, RiderLink};
    use crate::watergun::{WaterGun, WaterGunParams};

    fn pool() -> NozzlePool {
        NozzlePool::build(
            Entity::PLACEHOLDER,
            &NozzleRegistry::default(),
            &NozzleTuning::default(),
        )
    }

    fn settle(gun: &mut WaterGun, pool: &mut NozzlePool, rider: &dyn RiderLink) {
        for _ in 0..30 {
            gun.advance_blend(pool, rider).expect("blend");
        }
    }

    fn assert_water_near(gun: &WaterGun, expected: f32) {
        assert!(
            (gun.water_amount - expected).abs() < 1e-3,
            "water {} != {}",
            gun.water_amount,
            expected
        );
    }

    #[test]
    fn test_commit_preserves_fill_ratio() {
        let mut pool = pool();
        let params = WaterGunParams::default();
        let mut gun = WaterGun::new(40.0);

        gun.request_switch(&mut pool, TURBO, false, &NoMount, &params)
            .expect("switch");
        assert!(gun.is_switching());
        assert_eq!(gun.second_nozzle, TURBO);
        assert_eq!(gun.current_nozzle, SPRAY);

        settle(&mut gun, &mut pool, &NoMount);

        // 40/100 → 80/200
        assert_eq!(gun.current_nozzle, TURBO);
        assert_water_near(&gun, 80.0);
        assert_eq!(gun.blend_progress, 1.0);
        assert!(!gun.is_switching());
    }

    #[test]
    fn test_commit_happens_at_midpoint_only() {
        let mut pool = pool();
        let params = WaterGunParams::default();
        let mut gun = WaterGun::new(50.0);

        gun.request_switch(&mut pool, UNDERWATER, false, &NoMount, &params)
            .expect("switch");

        let mut committed_at = None;
        for _ in 0..20 {
            gun.advance_blend(&mut pool, &NoMount).expect("blend");
            if committed_at.is_none() && gun.current_nozzle == UNDERWATER {
                committed_at = Some(gun.blend_progress);
            }
        }

        let progress = committed_at.expect("never committed");
        assert!(progress >= 0.5 && progress < 0.7, "committed at {}", progress);
    }

    #[test]
    fn test_replenish_switch_fills_and_commits_immediately() {
        let mut pool = pool();
        let params = WaterGunParams::default();
        let mut gun = WaterGun::new(100.0);

        gun.request_switch(&mut pool, UNDERWATER, true, &NoMount, &params)
            .expect("switch");

        assert_eq!(gun.current_nozzle, UNDERWATER);
        assert_water_near(&gun, 150.0);
        assert_eq!(gun.blend_progress, 1.0);
        assert!(!gun.is_switching());
    }

    #[test]
    fn test_replenish_to_primary_tops_up() {
        let mut pool = pool();
        let params = WaterGunParams::default();
        let mut gun = WaterGun::new(100.0);
        gun.request_switch(&mut pool, UNDERWATER, true, &NoMount, &params)
            .expect("switch");
        gun.water_amount = 75.0;

        gun.request_switch(&mut pool, NozzleId::PRIMARY, true, &NoMount, &params)
            .expect("switch");

        assert_eq!(gun.current_nozzle, SPRAY);
        assert_water_near(&gun, 100.0);
        assert_eq!(gun.blend_progress, 0.0);
    }

    #[test]
    fn test_downward_commit_to_primary() {
        let mut pool = pool();
        let params = WaterGunParams::default();
        let mut gun = WaterGun::new(100.0);
        gun.request_switch(&mut pool, TURBO, true, &NoMount, &params)
            .expect("switch");
        gun.water_amount = 100.0; // 50% от 200

        gun.request_switch(&mut pool, NozzleId::PRIMARY, false, &NoMount, &params)
            .expect("switch");
        assert!(gun.blend_rate < 0.0);

        settle(&mut gun, &mut pool, &NoMount);

        assert_eq!(gun.current_nozzle, SPRAY);
        assert_water_near(&gun, 50.0);
        assert_eq!(gun.blend_progress, 0.0);
        assert_eq!(gun.blend_rate, 0.0);
    }

    #[test]
    fn test_progress_pinned_at_edges() {
        let mut pool = pool();
        let mut gun = WaterGun::new(50.0);
        gun.second_nozzle = HOVER;

        gun.drive_blend(0.7);
        gun.advance_blend(&mut pool, &NoMount).expect("blend");
        assert_eq!(gun.current_nozzle, HOVER);

        gun.advance_blend(&mut pool, &NoMount).expect("blend");
        assert_eq!(gun.blend_progress, 1.0);
        assert_eq!(gun.blend_rate, 0.0);

        gun.drive_blend(-0.7);
        gun.advance_blend(&mut pool, &NoMount).expect("blend");
        assert_eq!(gun.current_nozzle, SPRAY);

        gun.advance_blend(&mut pool, &NoMount).expect("blend");
        assert_eq!(gun.blend_progress, 0.0);
        assert_eq!(gun.blend_rate, 0.0);
    }

    #[test]
    fn test_blend_rate_clamped() {
        let mut gun = WaterGun::new(0.0);

        gun.drive_blend(5.0);
        assert_eq!(gun.blend_rate, 1.0);

        gun.drive_blend(f32::INFINITY);
        assert_eq!(gun.blend_rate, 0.0);
    }

    #[test]
    fn test_no_commit_while_hovering_below_midpoint() {
        let mut pool = pool();
        let params = WaterGunParams::default();
        let mut gun = WaterGun::new(50.0);
        gun.request_switch(&mut pool, TURBO, false, &NoMount, &params)
            .expect("switch");

        for rate in [0.2, 0.2, -0.2, 0.2, -0.2, 0.2, -0.2] {
            gun.drive_blend(rate);
            gun.advance_blend(&mut pool, &NoMount).expect("blend");
            assert!(gun.blend_progress < 0.5);
            assert_eq!(gun.current_nozzle, SPRAY);
        }
        assert_eq!(gun.water_amount, 50.0);
    }

    #[test]
    fn test_mount_commit_takes_rider_juice() {
        let mut pool = pool();
        let params = WaterGunParams::default();
        let mount = MountLink {
            riding: true,
            juice: 33.0,
            base: None,
        };
        let mut gun = WaterGun::new(90.0);

        gun.request_switch(&mut pool, YOSHI, false, &mount, &params)
            .expect("switch");
        settle(&mut gun, &mut pool, &mount);

        assert_eq!(gun.current_nozzle, YOSHI);
        assert_eq!(gun.water_amount, 33.0);
    }

    #[test]
    fn test_direct_secondary_swap() {
        let mut pool = pool();
        let params = WaterGunParams::default();
        let mut gun = WaterGun::new(100.0);
        gun.request_switch(&mut pool, TURBO, true, &NoMount, &params)
            .expect("switch");
        assert_water_near(&gun, 200.0);

        gun.request_switch(&mut pool, UNDERWATER, false, &NoMount, &params)
            .expect("switch");

        assert_eq!(gun.current_nozzle, UNDERWATER);
        assert_eq!(gun.second_nozzle, UNDERWATER);
        assert_water_near(&gun, 150.0);
        assert!(!gun.is_switching());
    }

    #[test]
    fn test_unknown_target_rejected() {
        let mut pool = pool();
        let params = WaterGunParams::default();
        let mut gun = WaterGun::new(50.0);
        let before = gun.clone();

        let result = gun.request_switch(&mut pool, NozzleId(40), true, &NoMount, &params);

        assert_eq!(
            result,
            Err(NozzleError::UnknownNozzle {
                id: NozzleId(40),
                len: BUILTIN_COUNT
            })
        );
        assert_eq!(gun, before);
    }

    #[test]
    fn test_commit_reinitialises_nozzle() {
        let mut pool = pool();
        let params = WaterGunParams::default();
        let mut gun = WaterGun::new(50.0);
        gun.request_switch(&mut pool, HOVER, true, &NoMount, &params)
            .expect("switch");

        gun.update_pressure(1.0);
        let input = gun.nozzle_input();
        pool.get_mut(HOVER).expect("hover").nozzle.movement(&input);
        assert!(gun.is_pressure_on(&pool));

        gun.request_switch(&mut pool, NozzleId::PRIMARY, true, &NoMount, &params)
            .expect("switch");
        gun.request_switch(&mut pool, HOVER, true, &NoMount, &params)
            .expect("switch");

        assert_eq!(gun.trigger_fill(&pool), 0.0);
        assert!(!gun.can_spray(&pool, false));
    }

    #[test]
    fn test_water_stays_within_capacity_through_switches() {
        let mut pool = pool();
        let params = WaterGunParams::default();
        let mut gun = WaterGun::new(70.0);

        let script = [
            (Some((TURBO, false)), 0),
            (None, 8),
            (Some((NozzleId::PRIMARY, false)), 0),
            (None, 3),
            (Some((UNDERWATER, false)), 0),
            (None, 12),
            (Some((HOVER, false)), 0),
            (Some((NozzleId::PRIMARY, true)), 0),
            (Some((TURBO, true)), 0),
            (None, 5),
        ];

        for (request, ticks) in script {
            if let Some((target, replenish)) = request {
                gun.request_switch(&mut pool, target, replenish, &NoMount, &params)
                    .expect("switch");
            }
            for _ in 0..ticks {
                gun.advance_blend(&mut pool, &NoMount).expect("blend");

                let capacity = gun.capacity(&pool).expect("capacity");
                assert!(gun.water_amount >= 0.0 && gun.water_amount <= capacity);
                assert!((0.0..=1.0).contains(&gun.blend_progress));
            }
        }
        assert_eq!(gun.current_nozzle, TURBO);
    }
}
