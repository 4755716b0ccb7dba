//! Pick a storage backend from configuration.
//!
//! `Auto` prefers localStorage and falls back to memory.

use std::rc::Rc;

use dipthinq_core::ports::StoragePort;
use dipthinq_types::{Result, config::StorageBackendType};

use super::{LocalStorage, MemoryStorage};

/// Open the configured backend. Only an explicit `LocalStorage` request can
/// fail; `Auto` always yields something usable.
pub fn open_storage(backend: &StorageBackendType) -> Result<Rc<dyn StoragePort>> {
    match backend {
        StorageBackendType::Memory => Ok(Rc::new(MemoryStorage::new())),
        StorageBackendType::LocalStorage => Ok(Rc::new(LocalStorage::open()?)),
        StorageBackendType::Auto => match LocalStorage::open() {
            Ok(storage) => {
                log::info!("Storage backend: localStorage");
                Ok(Rc::new(storage))
            }
            Err(e) => {
                log::warn!("localStorage unavailable ({}), falling back to memory", e);
                Ok(Rc::new(MemoryStorage::new()))
            }
        },
    }
}
