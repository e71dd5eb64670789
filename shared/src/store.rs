use std::collections::BTreeSet;

use crate::catalog::ResourceCatalog;
use crate::config::StoreConfig;
use crate::query::shareable_url;
use crate::state::{AppState, MapFilter, OpenedPopup, UrlOverrides, decode_persisted, merge};
use crate::storage::StateStorage;
use crate::viewport::Viewport;

/// Handle returned by [`StateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&AppState)>;

/// Single source of truth for the map state.
///
/// Every mutation writes the whole snapshot to storage and then calls each
/// listener once, in subscription order, before returning.
pub struct StateStore<S: StateStorage> {
    storage: S,
    storage_key: String,
    state: AppState,
    url_overrides: UrlOverrides,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl<S: StateStorage> std::fmt::Debug for StateStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("storage_key", &self.storage_key)
            .field("state", &self.state)
            .field("url_overrides", &self.url_overrides)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S: StateStorage> StateStore<S> {
    /// Build the initial state from `config.defaults`, the snapshot stored
    /// under `config.storage_key`, and the page's `query` string.
    pub fn new(storage: S, query: &str, config: StoreConfig) -> Self {
        let StoreConfig {
            storage_key,
            defaults,
        } = config;

        let persisted = match storage.read(&storage_key) {
            Ok(Some(json)) => decode_persisted(&json, &defaults),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %storage_key, "failed to read persisted state: {e}");
                None
            }
        };
        let url_overrides = UrlOverrides::from_query(query);
        if !url_overrides.is_empty() {
            tracing::debug!(
                viewport = url_overrides.viewport.is_some(),
                popup = url_overrides.opened_popup.is_some(),
                "applying shared link overrides"
            );
        }
        let state = merge(defaults, persisted, &url_overrides);

        Self {
            storage,
            storage_key,
            state,
            url_overrides,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// What the page URL asked for at startup.
    pub fn url_overrides(&self) -> &UrlOverrides {
        &self.url_overrides
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&AppState) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Skipped entirely when the view has not changed, so periodic sampling
    /// of a still map costs nothing. Non-finite views are ignored.
    pub fn update_viewport(&mut self, viewport: Viewport) {
        if !viewport.is_finite() {
            tracing::debug!(?viewport, "ignoring non-finite viewport");
            return;
        }
        if self.state.viewport == viewport {
            return;
        }
        self.state.viewport = viewport;
        self.commit();
    }

    pub fn toggle_resource_type(&mut self, name: &str) {
        toggle(&mut self.state.visible_resources, name);
        self.commit();
    }

    pub fn set_visible_resources(&mut self, types: BTreeSet<String>) {
        self.state.visible_resources = types;
        self.commit();
    }

    pub fn set_opened_popup(&mut self, popup: Option<OpenedPopup>) {
        self.state.opened_popup = popup;
        self.commit();
    }

    pub fn toggle_group_expansion(&mut self, name: &str) {
        toggle(&mut self.state.expanded_groups, name);
        self.commit();
    }

    pub fn set_map_filter(&mut self, filter: MapFilter) {
        self.state.map_filter = filter;
        self.commit();
    }

    pub fn set_expert_mode(&mut self, enabled: bool) {
        self.state.expert_mode = enabled;
        self.commit();
    }

    pub fn shareable_url(&self, base_href: &str) -> Result<String, String> {
        shareable_url(base_href, &self.state)
    }

    /// When the page was opened from a shared link with a selection, show
    /// only the group that selection belongs to. Returns whether the visible
    /// set changed hands.
    pub fn focus_shared_selection(&mut self, catalog: &ResourceCatalog) -> bool {
        let Some(popup) = &self.url_overrides.opened_popup else {
            return false;
        };
        let Some(group) = catalog.group_of(&popup.resource_type) else {
            tracing::debug!(resource_type = %popup.resource_type, "shared selection has no group");
            return false;
        };
        let types: BTreeSet<String> = catalog
            .types_in_group(group)
            .map(|def| def.key.clone())
            .collect();
        self.set_visible_resources(types);
        true
    }

    fn commit(&mut self) {
        self.persist();
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
    }

    fn persist(&mut self) {
        let json = match self.state.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to encode state: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.write(&self.storage_key, &json) {
            tracing::warn!(key = %self.storage_key, "failed to persist state: {e}");
        }
    }
}

fn toggle(set: &mut BTreeSet<String>, name: &str) {
    if !set.remove(name) {
        set.insert(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::STORAGE_KEY;
    use crate::storage::MemoryStorage;

    fn store_with(storage: MemoryStorage, query: &str) -> StateStore<MemoryStorage> {
        StateStore::new(storage, query, StoreConfig::default())
    }

    fn recorder(store: &mut StateStore<MemoryStorage>) -> Rc<RefCell<Vec<AppState>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |state| sink.borrow_mut().push(state.clone()));
        seen
    }

    fn popup() -> OpenedPopup {
        OpenedPopup {
            resource_type: "copper".to_string(),
            world_x: 1.0,
            world_y: 2.0,
            world_z: 3.0,
            id_a: 5,
            id_b: 6,
            id_c: 7,
            id_d: 8,
        }
    }

    #[test]
    fn starts_from_defaults_without_writing() {
        let store = store_with(MemoryStorage::new(), "");
        assert_eq!(store.state(), &AppState::default());
        assert_eq!(store.storage().writes(), 0);
        assert!(store.url_overrides().is_empty());
    }

    #[test]
    fn url_viewport_overrides_persisted_but_filter_survives() {
        let persisted = AppState {
            map_filter: MapFilter::Sepia,
            ..AppState::default()
        };
        let storage = MemoryStorage::with_entry(
            STORAGE_KEY,
            &persisted.to_json().expect("state should serialize"),
        );
        let store = store_with(storage, "?x=1&y=2&scale=3");
        assert_eq!(store.state().map_filter, MapFilter::Sepia);
        assert_eq!(store.state().viewport, Viewport::new(1.0, 2.0, 3.0));
        assert_eq!(
            store.url_overrides().viewport,
            Some(Viewport::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn unreadable_storage_falls_back_to_defaults() {
        let mut storage = MemoryStorage::with_entry(STORAGE_KEY, "{\"mapFilter\":\"dark\"}");
        storage.set_unavailable(true);
        let store = store_with(storage, "");
        assert_eq!(store.state(), &AppState::default());
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_defaults() {
        let store = store_with(MemoryStorage::with_entry(STORAGE_KEY, "{not json"), "");
        assert_eq!(store.state(), &AppState::default());
    }

    #[test]
    fn custom_config_changes_key_and_defaults() {
        let config = StoreConfig {
            storage_key: "other_key".to_string(),
            defaults: AppState {
                expert_mode: true,
                ..AppState::default()
            },
        };
        let mut store = StateStore::new(MemoryStorage::new(), "", config);
        assert!(store.state().expert_mode);
        store.set_map_filter(MapFilter::Dark);
        assert!(store.storage().get("other_key").is_some());
        assert!(store.storage().get(STORAGE_KEY).is_none());
    }

    #[test]
    fn unchanged_viewport_is_a_no_op() {
        let mut store = store_with(MemoryStorage::new(), "");
        let seen = recorder(&mut store);
        store.update_viewport(Viewport::default());
        assert_eq!(store.storage().writes(), 0);
        assert!(seen.borrow().is_empty());

        store.update_viewport(Viewport::new(1.0, 1.0, 1.0));
        store.update_viewport(Viewport::new(1.0, 1.0, 1.0));
        assert_eq!(store.storage().writes(), 1);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn non_finite_viewport_is_ignored() {
        let mut store = store_with(MemoryStorage::new(), "");
        let seen = recorder(&mut store);
        store.update_viewport(Viewport::new(f64::NAN, 1.0, 1.0));
        store.update_viewport(Viewport::new(f64::NAN, 1.0, 1.0));
        store.update_viewport(Viewport::new(1.0, 1.0, f64::INFINITY));
        assert_eq!(store.state().viewport, Viewport::default());
        assert_eq!(store.storage().writes(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn toggling_twice_restores_membership() {
        let mut store = store_with(MemoryStorage::new(), "");
        let seen = recorder(&mut store);
        let before = store.state().visible_resources.clone();

        store.toggle_resource_type("iron");
        assert!(!store.state().visible_resources.contains("iron"));
        store.toggle_resource_type("iron");

        assert_eq!(store.state().visible_resources, before);
        assert_eq!(seen.borrow().len(), 2);
        assert!(!seen.borrow()[0].visible_resources.contains("iron"));
        assert!(seen.borrow()[1].visible_resources.contains("iron"));
    }

    #[test]
    fn every_mutation_writes_then_notifies() {
        let mut store = store_with(MemoryStorage::new(), "");
        let seen = recorder(&mut store);

        store.set_visible_resources(BTreeSet::from(["birch".to_string()]));
        store.set_opened_popup(Some(popup()));
        store.toggle_group_expansion("wood");
        store.set_map_filter(MapFilter::Grayscale);
        store.set_expert_mode(true);
        store.set_opened_popup(None);

        assert_eq!(store.storage().writes(), 6);
        assert_eq!(seen.borrow().len(), 6);
        assert_eq!(seen.borrow()[1].opened_popup, Some(popup()));
        assert!(seen.borrow()[2].expanded_groups.contains("wood"));

        let stored = store.storage().get(STORAGE_KEY).expect("state persisted");
        let reloaded = decode_persisted(stored, &AppState::default()).expect("decodes");
        assert_eq!(&reloaded, store.state());
    }

    #[test]
    fn persisted_state_reloads_in_a_new_store() {
        let mut store = store_with(MemoryStorage::new(), "");
        store.set_map_filter(MapFilter::Contrast);
        store.toggle_resource_type("pine");
        let storage = store.storage().clone();

        let reopened = store_with(storage, "");
        assert_eq!(reopened.state().map_filter, MapFilter::Contrast);
        assert!(reopened.state().visible_resources.contains("pine"));
    }

    #[test]
    fn write_failure_keeps_in_memory_change() {
        let mut storage = MemoryStorage::new();
        storage.set_unavailable(true);
        let mut store = store_with(storage, "");
        let seen = recorder(&mut store);

        store.set_expert_mode(true);
        assert!(store.state().expert_mode);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let mut store = store_with(MemoryStorage::new(), "");
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            store.subscribe(move |_| order.borrow_mut().push(tag));
        }
        store.set_expert_mode(true);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let mut store = store_with(MemoryStorage::new(), "");
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let id = store.subscribe(move |_| *counter.borrow_mut() += 1);

        store.set_expert_mode(true);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set_expert_mode(false);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn shareable_url_reflects_current_state() {
        let mut store = store_with(MemoryStorage::new(), "");
        store.update_viewport(Viewport::new(10.04, 20.0, 2.0));
        assert_eq!(
            store.shareable_url("https://maps.example/"),
            Ok("https://maps.example/?x=10.0&y=20.0&scale=2.0".to_string())
        );
        store.set_opened_popup(Some(popup()));
        let url = store
            .shareable_url("https://maps.example/")
            .expect("absolute base");
        assert!(url.contains("&type=copper&"));
    }

    #[test]
    fn shared_selection_narrows_visible_types_to_its_group() {
        let query = "?type=copper&wx=1&wy=2&wz=3&ida=5&idb=6&idc=7&idd=8";
        let mut store = store_with(MemoryStorage::new(), query);
        assert_eq!(store.state().opened_popup, Some(popup()));

        let catalog = ResourceCatalog::builtin();
        assert!(store.focus_shared_selection(&catalog));
        let expected: BTreeSet<String> = ["copper", "iron", "silver"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(store.state().visible_resources, expected);
        assert_eq!(store.storage().writes(), 1);
    }

    #[test]
    fn focus_without_shared_selection_does_nothing() {
        let mut store = store_with(MemoryStorage::new(), "?x=1&y=2&scale=3");
        assert!(!store.focus_shared_selection(&ResourceCatalog::builtin()));
        assert_eq!(store.storage().writes(), 0);
    }
}
