use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use nrftw_map_shared::colors::hex_color;
use nrftw_map_shared::config::REGION_OFFSETS_URL;
use nrftw_map_shared::format::{format_guid, format_resource_title, format_world_pos};
use nrftw_map_shared::query::is_dev_mode;
use nrftw_map_shared::transform::{DEFAULT_REGION, region_from_asset_path};
use nrftw_map_shared::{
    CoordinateConverter, MapFilter, OpenedPopup, ResourceCatalog, StateStore, StoreConfig,
    Transform, Viewport, WorldPos,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::location;
use crate::region_loader::load_regions_from_url;
use crate::relay::ListenerRelay;
use crate::storage::BrowserStorage;
use crate::viewport_sync::ViewportSync;

/// Plain JS objects with `null` for absent values.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Coordinate conversion and persisted map state for the page.
#[wasm_bindgen]
pub struct MapCore {
    converter: Rc<RefCell<CoordinateConverter>>,
    store: Rc<RefCell<StateStore<BrowserStorage>>>,
    relay: Rc<ListenerRelay>,
    catalog: ResourceCatalog,
    viewport_sync: Option<ViewportSync>,
}

#[wasm_bindgen]
impl MapCore {
    /// Restore state from `localStorage` and the page URL. Nothing is
    /// written or announced until the first change.
    #[wasm_bindgen(constructor)]
    pub fn new() -> MapCore {
        let search = location::current_search();
        let mut store = StateStore::new(BrowserStorage::detect(), &search, StoreConfig::default());
        let relay = ListenerRelay::new();
        let queue = Rc::clone(&relay);
        store.subscribe(move |state| queue.enqueue(state));
        MapCore {
            converter: Rc::new(RefCell::new(CoordinateConverter::new())),
            store: Rc::new(RefCell::new(store)),
            relay,
            catalog: ResourceCatalog::builtin(),
            viewport_sync: None,
        }
    }

    #[wasm_bindgen(js_name = worldToImage)]
    pub fn world_to_image(
        &self,
        world_x: f64,
        world_z: f64,
        region: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let region = region.as_deref().unwrap_or(DEFAULT_REGION);
        to_js(&self.converter.borrow().world_to_image(world_x, world_z, region))
    }

    #[wasm_bindgen(js_name = imageToWorld)]
    pub fn image_to_world(
        &self,
        image_x: f64,
        image_y: f64,
        region: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let region = region.as_deref().unwrap_or(DEFAULT_REGION);
        to_js(&self.converter.borrow().image_to_world(image_x, image_y, region))
    }

    #[wasm_bindgen(js_name = setRegionTransform)]
    pub fn set_region_transform(
        &self,
        region: &str,
        scaling: f64,
        offset_x: i32,
        offset_y: i32,
        invert_x: bool,
        invert_z: bool,
    ) -> Result<(), JsValue> {
        let transform = Transform {
            scaling,
            offset_x,
            offset_y,
            invert_x,
            invert_z,
        };
        self.converter
            .borrow_mut()
            .set_region_transform(region, transform)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Returns `{ applied, skipped }`.
    #[wasm_bindgen(js_name = loadTransformsFromCsv)]
    pub fn load_transforms_from_csv(&self, text: &str) -> Result<JsValue, JsValue> {
        let report = self.converter.borrow_mut().load_transforms_from_csv(text);
        to_js(&report)
    }

    /// Fetch a region table in the background; failures are logged.
    #[wasm_bindgen(js_name = loadTransformsFromUrl)]
    pub fn load_transforms_from_url(&self, url: Option<String>) {
        let url = url.unwrap_or_else(|| REGION_OFFSETS_URL.to_string());
        load_regions_from_url(Rc::clone(&self.converter), url);
    }

    #[wasm_bindgen(js_name = regionFromAssetPath)]
    pub fn region_from_asset_path(path: &str) -> String {
        region_from_asset_path(path).to_string()
    }

    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        to_js(self.store.borrow().state())
    }

    /// `listener` receives a state snapshot after every change. Returns an
    /// id for [`MapCore::unsubscribe`].
    pub fn subscribe(&self, listener: js_sys::Function) -> u32 {
        self.relay.add(move |state| {
            let snapshot = match to_js(state) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!("failed to convert state for listener: {e:?}");
                    return;
                }
            };
            if let Err(e) = listener.call1(&JsValue::NULL, &snapshot) {
                tracing::warn!("state listener threw: {e:?}");
            }
        })
    }

    pub fn unsubscribe(&self, id: u32) -> bool {
        self.relay.remove(id)
    }

    #[wasm_bindgen(js_name = updateViewport)]
    pub fn update_viewport(&self, x: f64, y: f64, scale: f64) {
        self.store
            .borrow_mut()
            .update_viewport(Viewport::new(x, y, scale));
        self.relay.flush();
    }

    #[wasm_bindgen(js_name = toggleResourceType)]
    pub fn toggle_resource_type(&self, name: &str) {
        self.store.borrow_mut().toggle_resource_type(name);
        self.relay.flush();
    }

    #[wasm_bindgen(js_name = setVisibleResources)]
    pub fn set_visible_resources(&self, types: Vec<String>) {
        let types: BTreeSet<String> = types.into_iter().collect();
        self.store.borrow_mut().set_visible_resources(types);
        self.relay.flush();
    }

    /// Pass `null` to close the popup.
    #[wasm_bindgen(js_name = setOpenedPopup)]
    pub fn set_opened_popup(&self, popup: JsValue) -> Result<(), JsValue> {
        let popup: Option<OpenedPopup> = if popup.is_null() || popup.is_undefined() {
            None
        } else {
            Some(
                serde_wasm_bindgen::from_value(popup)
                    .map_err(|e| JsValue::from_str(&format!("invalid popup: {e}")))?,
            )
        };
        self.store.borrow_mut().set_opened_popup(popup);
        self.relay.flush();
        Ok(())
    }

    #[wasm_bindgen(js_name = toggleGroupExpansion)]
    pub fn toggle_group_expansion(&self, name: &str) {
        self.store.borrow_mut().toggle_group_expansion(name);
        self.relay.flush();
    }

    #[wasm_bindgen(js_name = setMapFilter)]
    pub fn set_map_filter(&self, filter: &str) -> Result<(), JsValue> {
        let filter: MapFilter = filter.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.store.borrow_mut().set_map_filter(filter);
        self.relay.flush();
        Ok(())
    }

    /// CSS `filter` value for the current map filter.
    #[wasm_bindgen(js_name = mapFilterCss)]
    pub fn map_filter_css(&self) -> String {
        self.store.borrow().state().map_filter.css_filter().to_string()
    }

    #[wasm_bindgen(js_name = setExpertMode)]
    pub fn set_expert_mode(&self, enabled: bool) {
        self.store.borrow_mut().set_expert_mode(enabled);
        self.relay.flush();
    }

    #[wasm_bindgen(js_name = getShareableUrl)]
    pub fn get_shareable_url(&self) -> Result<String, JsValue> {
        self.store
            .borrow()
            .shareable_url(&location::current_href())
            .map_err(|e| JsValue::from_str(&e))
    }

    /// What the page URL asked for at startup: `{ viewport, openedPopup }`.
    #[wasm_bindgen(js_name = getUrlParams)]
    pub fn get_url_params(&self) -> Result<JsValue, JsValue> {
        to_js(self.store.borrow().url_overrides())
    }

    #[wasm_bindgen(js_name = isDevMode)]
    pub fn is_dev_mode(&self) -> bool {
        is_dev_mode(&location::current_search(), self.store.borrow().storage())
    }

    /// Show only the group of the selection a shared link points at.
    #[wasm_bindgen(js_name = focusSharedSelection)]
    pub fn focus_shared_selection(&self) -> bool {
        let changed = self
            .store
            .borrow_mut()
            .focus_shared_selection(&self.catalog);
        self.relay.flush();
        changed
    }

    /// Sample `sampler()` (returning `{ x, y, scale }`) once a second and
    /// record the view. Replaces any running sampler.
    #[wasm_bindgen(js_name = startViewportSync)]
    pub fn start_viewport_sync(&mut self, sampler: js_sys::Function) {
        self.viewport_sync = Some(ViewportSync::start(
            sampler,
            Rc::clone(&self.store),
            Rc::clone(&self.relay),
        ));
    }

    #[wasm_bindgen(js_name = stopViewportSync)]
    pub fn stop_viewport_sync(&mut self) {
        self.viewport_sync = None;
    }

    #[wasm_bindgen(js_name = resourceColor)]
    pub fn resource_color(&self, type_key: &str) -> String {
        hex_color(self.catalog.color(type_key))
    }

    #[wasm_bindgen(js_name = resourceTitle)]
    pub fn resource_title(&self, group: &str, subtype: &str) -> String {
        format_resource_title(&self.catalog, group, subtype)
    }

    #[wasm_bindgen(js_name = formatWorldPos)]
    pub fn format_world_pos(x: f64, y: f64, z: f64) -> String {
        format_world_pos(WorldPos::new(x, y, z))
    }

    /// GUID of the open popup for the developer panel, if any.
    #[wasm_bindgen(js_name = openedPopupGuid)]
    pub fn opened_popup_guid(&self) -> Option<String> {
        self.store.borrow().state().opened_popup.as_ref().map(format_guid)
    }
}

impl Default for MapCore {
    fn default() -> Self {
        Self::new()
    }
}
