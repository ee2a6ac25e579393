//! NozzlePool: dense arena live насадок владельца
//!
//! Build: built-in (ids 0..BUILTIN_COUNT) → custom из registry (в порядке
//! регистрации). После build порядок не меняется; rebuild = новый pool.

use bevy::prelude::*;

use super::builtin::{
    spawn_builtin, BUILTIN_COUNT, BUILTIN_JOINTS, BUILTIN_NAMES, BUILTIN_STREAMS,
};
use super::{Nozzle, NozzleContext, NozzleId, NozzleRegistry, NozzleTuning, MAX_EMITTERS};
use crate::error::NozzleError;
use crate::{log_error, log_info};

/// Live насадка + её stream table
pub struct NozzleSlot {
    pub name: String,
    pub nozzle: Box<dyn Nozzle>,
    pub stream_count: usize,
    pub joint_emitters: [u32; MAX_EMITTERS],
}

impl NozzleSlot {
    pub fn capacity(&self) -> f32 {
        self.nozzle.emit_params().amount_max
    }

    /// Joint для stream'а (None если stream >= stream_count)
    pub fn joint_for(&self, stream: usize) -> Option<u32> {
        (stream < self.stream_count).then(|| self.joint_emitters[stream])
    }
}

/// Pool насадок одного водомёта (index == `NozzleId`)
#[derive(Component, Default)]
pub struct NozzlePool {
    slots: Vec<NozzleSlot>,
}

impl NozzlePool {
    pub fn build(owner: Entity, registry: &NozzleRegistry, tuning: &NozzleTuning) -> Self {
        let mut slots = Vec::with_capacity(BUILTIN_COUNT + registry.len());

        for (index, name) in BUILTIN_NAMES.iter().enumerate() {
            let ctx = NozzleContext {
                owner,
                id: NozzleId(index as u8),
                tuning,
            };
            let Some(nozzle) = spawn_builtin(&ctx) else {
                continue;
            };
            slots.push(NozzleSlot {
                name: name.to_string(),
                nozzle,
                stream_count: BUILTIN_STREAMS[index],
                joint_emitters: BUILTIN_JOINTS[index],
            });
        }

        for descriptor in registry.iter() {
            let Ok(raw_id) = u8::try_from(slots.len()) else {
                log_error(&format!(
                    "⚠️ Nozzle pool full, '{}' skipped",
                    descriptor.name
                ));
                break;
            };

            let ctx = NozzleContext {
                owner,
                id: NozzleId(raw_id),
                tuning,
            };
            slots.push(NozzleSlot {
                name: descriptor.name.clone(),
                nozzle: (descriptor.factory)(&ctx),
                stream_count: descriptor.stream_count,
                joint_emitters: descriptor.joint_emitters,
            });
        }

        log_info(&format!(
            "✅ Nozzle pool built for {:?}: {} built-in + {} custom",
            owner,
            BUILTIN_COUNT,
            slots.len() - BUILTIN_COUNT
        ));

        Self { slots }
    }

    pub fn get(&self, id: NozzleId) -> Result<&NozzleSlot, NozzleError> {
        let len = self.slots.len();
        self.slots
            .get(id.index())
            .ok_or(NozzleError::UnknownNozzle { id, len })
    }

    pub fn get_mut(&mut self, id: NozzleId) -> Result<&mut NozzleSlot, NozzleError> {
        let len = self.slots.len();
        self.slots
            .get_mut(id.index())
            .ok_or(NozzleError::UnknownNozzle { id, len })
    }

    pub fn capacity_of(&self, id: NozzleId) -> Result<f32, NozzleError> {
        self.get(id).map(NozzleSlot::capacity)
    }

    /// Первый id, принадлежащий custom насадке
    pub fn first_custom_id(&self) -> NozzleId {
        NozzleId(BUILTIN_COUNT as u8)
    }

    pub fn find(&self, name: &str) -> Option<NozzleId> {
        self.slots
            .iter()
            .position(|slot| slot.name == name)
            .map(|index| NozzleId(index as u8))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NozzleId, &NozzleSlot)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (NozzleId(index as u8), slot))
    }
}
