pub mod agent;
pub mod model;
pub mod message;
pub mod conversation;
pub mod relay;
pub mod event;
pub mod config;
pub mod error;
pub mod id;


pub use error::ChatError;
pub type Result<T> = std::result::Result<T, ChatError>;
