//! In-memory storage backend.
//!
//! Used when the browser refuses localStorage (private mode, sandboxed
//! iframes) and in tests. Nothing survives a reload.

use std::cell::RefCell;
use std::collections::BTreeMap;

use async_trait::async_trait;
use dipthinq_core::ports::StoragePort;
use dipthinq_types::Result;

#[derive(Default)]
pub struct MemoryStorage {
    data: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }
}

#[async_trait(?Send)]
impl StoragePort for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.borrow().get(key).map(|v| v.as_bytes().to_vec()))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        // Same contract as localStorage: values are text.
        let text = super::utf8_value(key, value)?;
        self.data.borrow_mut().insert(key.to_string(), text);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
