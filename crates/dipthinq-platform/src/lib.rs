//! Browser implementations of the `dipthinq-core` ports.

pub mod storage;
pub mod relay_client;
pub mod spawner;

pub use relay_client::RelayClient;
pub use spawner::LocalSpawner;
