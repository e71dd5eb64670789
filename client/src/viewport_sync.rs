use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use nrftw_map_shared::config::VIEWPORT_UPDATE_INTERVAL_MS;
use nrftw_map_shared::{StateStorage, StateStore, Viewport};
use wasm_bindgen::JsValue;

use crate::relay::ListenerRelay;

/// Periodically asks the page for the current map view and records it in
/// the store. Sampling stops when this is dropped.
pub struct ViewportSync {
    _interval: Interval,
}

impl ViewportSync {
    pub fn start<S: StateStorage + 'static>(
        sampler: js_sys::Function,
        store: Rc<RefCell<StateStore<S>>>,
        relay: Rc<ListenerRelay>,
    ) -> Self {
        let interval = Interval::new(VIEWPORT_UPDATE_INTERVAL_MS, move || {
            let sample = match sampler.call0(&JsValue::NULL) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("viewport sampler threw: {e:?}");
                    return;
                }
            };
            let Some(viewport) = serde_wasm_bindgen::from_value::<Viewport>(sample)
                .ok()
                .and_then(usable_sample)
            else {
                tracing::debug!("ignoring malformed viewport sample");
                return;
            };
            store.borrow_mut().update_viewport(viewport);
            relay.flush();
        });
        Self {
            _interval: interval,
        }
    }
}

fn usable_sample(viewport: Viewport) -> Option<Viewport> {
    (viewport.is_finite() && viewport.scale > 0.0).then_some(viewport)
}
