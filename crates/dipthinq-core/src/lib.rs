pub mod ports;
pub mod event_bus;
pub mod title;
pub mod store;
pub mod runtime;

#[cfg(test)]
mod tests;
