mod console_log;
mod location;
mod map_core;
mod region_loader;
mod relay;
mod storage;
mod viewport_sync;

use wasm_bindgen::prelude::*;

pub use crate::map_core::MapCore;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init();
    tracing::debug!("map core loaded");
}
