//! NozzleRegistry: внешне зарегистрированные насадки
//!
//! Регистрации происходят один раз при загрузке (plugin build), до первого tick'а.
//! Порядок регистрации == порядок ids в `NozzlePool` (после built-in).

use bevy::prelude::*;
use std::fmt;
use std::sync::Arc;

use super::builtin::BUILTIN_NAMES;
use super::{Nozzle, NozzleContext, MAX_EMITTERS};
use crate::error::NozzleError;
use crate::{log, log_error};

/// Factory: context → новый instance насадки
pub type NozzleFactory = Arc<dyn Fn(&NozzleContext) -> Box<dyn Nozzle> + Send + Sync>;

/// Descriptor custom насадки (immutable после регистрации)
#[derive(Clone)]
pub struct NozzleDescriptor {
    pub name: String,
    pub factory: NozzleFactory,
    /// 1 или 2
    pub stream_count: usize,
    pub joint_emitters: [u32; MAX_EMITTERS],
}

impl fmt::Debug for NozzleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NozzleDescriptor")
            .field("name", &self.name)
            .field("stream_count", &self.stream_count)
            .field("joint_emitters", &self.joint_emitters)
            .finish_non_exhaustive()
    }
}

/// Process-wide registry custom насадок
#[derive(Resource, Default, Debug)]
pub struct NozzleRegistry {
    descriptors: Vec<NozzleDescriptor>,
}

impl NozzleRegistry {
    /// Зарегистрировать насадку
    ///
    /// `joint_emitters`: 4 слота, значимы только первые `MAX_EMITTERS`.
    /// Stream count вне 1..=2 отклоняется (не clamp). Имена built-in
    /// насадок зарезервированы.
    pub fn register<F>(
        &mut self,
        name: &str,
        factory: F,
        stream_count: u32,
        joint_emitters: [u32; 4],
    ) -> Result<(), NozzleError>
    where
        F: Fn(&NozzleContext) -> Box<dyn Nozzle> + Send + Sync + 'static,
    {
        if BUILTIN_NAMES.contains(&name) {
            return Err(NozzleError::ReservedName(name.to_string()));
        }

        if self.contains(name) {
            return Err(NozzleError::DuplicateName(name.to_string()));
        }

        if stream_count == 0 || stream_count as usize > MAX_EMITTERS {
            return Err(NozzleError::InvalidStreamCount {
                name: name.to_string(),
                count: stream_count,
            });
        }

        let mut joints = [0; MAX_EMITTERS];
        joints.copy_from_slice(&joint_emitters[..MAX_EMITTERS]);

        self.descriptors.push(NozzleDescriptor {
            name: name.to_string(),
            factory: Arc::new(factory),
            stream_count: stream_count as usize,
            joint_emitters: joints,
        });

        log(&format!(
            "🔧 Registered nozzle '{}' ({} streams, joints {:?})",
            name, stream_count, joints
        ));
        Ok(())
    }

    /// Registration entry point для extension кода: false + лог при ошибке
    pub fn register_nozzle<F>(
        &mut self,
        name: &str,
        factory: F,
        stream_count: u32,
        joint_emitters: [u32; 4],
    ) -> bool
    where
        F: Fn(&NozzleContext) -> Box<dyn Nozzle> + Send + Sync + 'static,
    {
        match self.register(name, factory, stream_count, joint_emitters) {
            Ok(()) => true,
            Err(err) => {
                log_error(&format!("⚠️ Nozzle registration rejected: {}", err));
                false
            }
        }
    }

    /// Удалить регистрацию (ids уже собранных pools не меняются)
    pub fn unregister(&mut self, name: &str) -> Result<NozzleDescriptor, NozzleError> {
        let Some(index) = self.descriptors.iter().position(|d| d.name == name) else {
            return Err(NozzleError::UnknownName(name.to_string()));
        };
        Ok(self.descriptors.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.iter().any(|d| d.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&NozzleDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Descriptors в порядке регистрации
    pub fn iter(&self) -> impl Iterator<Item = &NozzleDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// `App` extension: регистрация насадок из plugin'ов
pub trait RegisterNozzleExt {
    fn register_nozzle<F>(
        &mut self,
        name: &str,
        factory: F,
        stream_count: u32,
        joint_emitters: [u32; 4],
    ) -> bool
    where
        F: Fn(&NozzleContext) -> Box<dyn Nozzle> + Send + Sync + 'static;
}

impl RegisterNozzleExt for App {
    fn register_nozzle<F>(
        &mut self,
        name: &str,
        factory: F,
        stream_count: u32,
        joint_emitters: [u32; 4],
    ) -> bool
    where
        F: Fn(&NozzleContext) -> Box<dyn Nozzle> + Send + Sync + 'static,
    {
        self.init_resource::<NozzleRegistry>();
        self.world_mut()
            .resource_mut::<NozzleRegistry>()
            .register_nozzle(name, factory, stream_count, joint_emitters)
    }
}
