use serde::{Deserialize, Serialize};

use crate::model::TITLE_MODEL_ID;

/// Storage key holding the JSON conversation collection.
pub const CONVERSATIONS_KEY: &str = "dipthinq-conversations";

/// Storage key holding the last-selected model key.
pub const SELECTED_MODEL_KEY: &str = "dipthinq-selected-model";

/// Browser-side client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint of the chat relay
    pub relay_url: String,
    /// Upstream model used to generate conversation titles
    pub title_model: String,
    pub storage: StorageConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "/api/chat".to_string(),
            title_model: TITLE_MODEL_ID.to_string(),
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackendType,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendType::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackendType {
    /// Auto-detect best available backend
    Auto,
    Memory,
    LocalStorage,
}

/// Fixed sampling parameters the relay sends upstream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4000,
            top_p: 0.9,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}
