//! Switch state machine: blend между primary и secondary насадкой
//!
//! States:
//! - **Steady**: `blend_rate == 0`
//! - **Switching**: `blend_rate != 0`, progress движется к 0 или 1
//!
//! Commit только на пересечении 0.5 (вверх → secondary, вниз → primary),
//! поэтому input, зависший у середины, не дребезжит.
//!
//! Commit сохраняет fullness ratio бака, не абсолютный amount.

use super::collaborators::RiderLink;
use super::params::WaterGunParams;
use super::state::WaterGun;
use crate::error::NozzleError;
use crate::log;
use crate::nozzle::{NozzleId, NozzlePool};

const BLEND_THRESHOLD: f32 = 0.5;

impl WaterGun {
    pub fn is_switching(&self) -> bool {
        self.blend_rate != 0.0
    }

    /// Запросить смену насадки
    ///
    /// - `target == PRIMARY` → blend вниз
    /// - иначе → `second_nozzle = target`, blend вверх
    /// - `replenish` → бак доливается до полного, progress snap'ается на край
    ///   и commit проходит сразу (та же conversion логика)
    /// - secondary сторона уже committed (progress ≥ 0.5) → прямой swap secondary
    pub fn request_switch(
        &mut self,
        pool: &mut NozzlePool,
        target: NozzleId,
        replenish: bool,
        rider: &dyn RiderLink,
        params: &WaterGunParams,
    ) -> Result<(), NozzleError> {
        pool.get(target)?;

        if replenish {
            self.water_amount = self.capacity(pool)?;
        }

        if target.is_primary() {
            if replenish {
                self.blend_progress = 0.0;
                self.blend_rate = 0.0;
                return self.commit(pool, target, rider);
            }
            self.blend_rate = -WaterGunParams::clamped_rate(params.switch_speed.abs());
            return Ok(());
        }

        self.second_nozzle = target;

        if replenish {
            self.blend_progress = 1.0;
            self.blend_rate = 0.0;
            return self.commit(pool, target, rider);
        }

        if self.blend_progress >= BLEND_THRESHOLD {
            self.blend_rate = 0.0;
            if self.current_nozzle != target {
                return self.commit(pool, target, rider);
            }
            return Ok(());
        }

        self.blend_rate = WaterGunParams::clamped_rate(params.switch_speed.abs());
        Ok(())
    }

    /// Continuous blend input (held direction / gesture)
    pub fn drive_blend(&mut self, rate: f32) {
        self.blend_rate = WaterGunParams::clamped_rate(rate);
    }

    /// Per-tick: progress += rate, commit на пересечении 0.5, clamp на краях
    pub fn advance_blend(
        &mut self,
        pool: &mut NozzlePool,
        rider: &dyn RiderLink,
    ) -> Result<(), NozzleError> {
        if self.blend_rate == 0.0 {
            return Ok(());
        }

        let prev = self.blend_progress;
        let next = prev + self.blend_rate;
        self.blend_progress = next;

        if prev < BLEND_THRESHOLD && BLEND_THRESHOLD <= next {
            self.commit(pool, self.second_nozzle, rider)?;
        }
        if next < BLEND_THRESHOLD && BLEND_THRESHOLD <= prev {
            self.commit(pool, NozzleId::PRIMARY, rider)?;
        }

        if self.blend_progress < 0.0 {
            self.blend_progress = 0.0;
            self.blend_rate = 0.0;
        }
        if self.blend_progress > 1.0 {
            self.blend_progress = 1.0;
            self.blend_rate = 0.0;
        }
        Ok(())
    }

    /// Commit: current = `to`, init, carry-over water
    ///
    /// Mount kind берёт water из бака companion'а (отдельный resource),
    /// остальные получают `percent(old) * capacity(new)`.
    pub fn commit(
        &mut self,
        pool: &mut NozzlePool,
        to: NozzleId,
        rider: &dyn RiderLink,
    ) -> Result<(), NozzleError> {
        let from = self.current_nozzle;
        let water_percent = self.water_percent(pool)?;

        let slot = pool.get_mut(to)?;
        slot.nozzle.init();
        let is_mount = slot.nozzle.kind().is_mount();
        let capacity = slot.capacity();

        self.current_nozzle = to;
        self.water_amount = if is_mount {
            rider.juice()
        } else {
            water_percent * capacity
        };
        self.clamp_water(pool)?;

        log(&format!(
            "🔄 Nozzle commit {} → {} (water {:.1}/{:.1})",
            from, to, self.water_amount, capacity
        ));
        Ok(())
    }
}
