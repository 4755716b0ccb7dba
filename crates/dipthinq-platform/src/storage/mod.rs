pub mod memory;
pub mod local_storage;
pub mod auto;

pub use memory::MemoryStorage;
pub use local_storage::LocalStorage;
pub use auto::open_storage;

use dipthinq_types::{ChatError, Result};

/// Both backends store text; reject bytes that are not UTF-8.
fn utf8_value(key: &str, value: &[u8]) -> Result<String> {
    String::from_utf8(value.to_vec())
        .map_err(|_| ChatError::Storage(format!("value for '{}' is not valid UTF-8", key)))
}
