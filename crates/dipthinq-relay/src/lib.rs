//! DipThinq chat relay.
//!
//! Accepts `POST /api/chat` from the browser client, prepends the selected
//! agent's system prompt and forwards the turn to an OpenAI-compatible
//! upstream (OpenRouter). The upstream credential never leaves the server.

pub mod config;
pub mod error;
pub mod upstream;
pub mod relay;
pub mod server;

pub use config::RelayConfig;
pub use error::ApiError;
pub use relay::Relay;
pub use server::router;
