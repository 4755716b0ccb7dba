//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `dipthinq-core` (pure Rust).
//! Implementations live in `dipthinq-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use dipthinq_types::{
    Result,
    relay::{RelayReply, RelayRequest},
};

// ─── Relay Port ──────────────────────────────────────────────

#[async_trait(?Send)]
pub trait RelayPort {
    /// Send one chat turn to the relay and wait for the normalized reply.
    async fn send(&self, req: RelayRequest) -> Result<RelayReply>;
}

// ─── Storage Port ────────────────────────────────────────────

#[async_trait(?Send)]
pub trait StoragePort {
    /// Get a value by key
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete a value
    async fn delete(&self, key: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Task Spawner Port ───────────────────────────────────────

pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Runs detached futures on the current (single) thread.
pub trait TaskSpawner {
    fn spawn(&self, task: LocalTask);
}
