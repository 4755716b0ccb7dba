//! DipThinq App: WASM entry point.
//!
//! This crate is the composition root (DI wiring layer). It assembles the
//! browser adapters, the conversation store and the chat runtime, and exposes
//! them to the page as a single `ChatClient` object.

mod client;

pub use client::ChatClient;

use wasm_bindgen::prelude::*;

/// Runs once when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("DipThinq WASM client loaded");
}
