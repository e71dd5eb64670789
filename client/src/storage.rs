use gloo_storage::{LocalStorage, Storage};
use nrftw_map_shared::StateStorage;

/// `localStorage`-backed state storage. Reads and writes fail instead of
/// panicking when the browser has storage disabled.
#[derive(Debug, Clone, Copy)]
pub struct BrowserStorage {
    available: bool,
}

impl BrowserStorage {
    pub fn detect() -> Self {
        let available = web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .is_some();
        if !available {
            tracing::warn!("localStorage unavailable; state will not persist");
        }
        Self { available }
    }
}

impl StateStorage for BrowserStorage {
    fn read(&self, key: &str) -> Result<Option<String>, String> {
        if !self.available {
            return Err("localStorage unavailable".to_string());
        }
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| format!("localStorage read failed: {e:?}"))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), String> {
        if !self.available {
            return Err("localStorage unavailable".to_string());
        }
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| format!("localStorage write failed: {e:?}"))
    }
}
