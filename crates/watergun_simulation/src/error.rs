//! Ошибки nozzle registry / pool / emission resolver
//!
//! Recoverable (регистрация): возвращаем `Err`, caller логирует.
//! Fatal (рассинхрон stream table ↔ descriptor): `fatal()` → panic с диагностикой.

use crate::nozzle::NozzleId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NozzleError {
    #[error("nozzle '{0}' is already registered")]
    DuplicateName(String),

    #[error("nozzle name '{0}' is reserved by a built-in nozzle")]
    ReservedName(String),

    #[error("nozzle '{name}' declares {count} streams (supported: 1..=2)")]
    InvalidStreamCount { name: String, count: u32 },

    #[error("nozzle '{0}' is not registered")]
    UnknownName(String),

    #[error("nozzle id {id} out of range (pool size {len})")]
    UnknownNozzle { id: NozzleId, len: usize },

    #[error(
        "tried to get emit transform for stream outside max number of streams: nozzle {nozzle}, max {max}, idx {stream}"
    )]
    StreamOutOfRange {
        nozzle: NozzleId,
        stream: usize,
        max: usize,
    },
}

/// Unrecoverable configuration error: лог + abort текущего run'а
#[track_caller]
pub fn fatal(err: &NozzleError) -> ! {
    let location = std::panic::Location::caller();
    crate::log_error(&format!("💀 FATAL at {}: {}", location, err));
    panic!("{} ({})", err, location);
}
