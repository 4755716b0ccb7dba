//! `window.localStorage` backend.
//!
//! Persistent across reloads, scoped to the origin. Calls are synchronous
//! under the hood; the async port signature is kept so the store does not
//! care which backend it talks to.

use async_trait::async_trait;
use wasm_bindgen::JsValue;
use web_sys::Storage;

use dipthinq_core::ports::StoragePort;
use dipthinq_types::{ChatError, Result};

pub struct LocalStorage {
    inner: Storage,
}

impl LocalStorage {
    /// Grab the origin's localStorage. Fails outside a window context or
    /// when the browser blocks storage access.
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::Storage("No window object".to_string()))?;
        let inner = window
            .local_storage()
            .map_err(js_err)?
            .ok_or_else(|| ChatError::Storage("localStorage not available".to_string()))?;
        Ok(Self { inner })
    }
}

fn js_err(e: JsValue) -> ChatError {
    ChatError::Storage(format!("{:?}", e))
}

#[async_trait(?Send)]
impl StoragePort for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.inner.get_item(key).map_err(js_err)?;
        Ok(value.map(String::into_bytes))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let text = super::utf8_value(key, value)?;
        // QuotaExceededError surfaces here
        self.inner.set_item(key, &text).map_err(js_err)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.remove_item(key).map_err(js_err)
    }

    fn backend_name(&self) -> &str {
        "localStorage"
    }
}
