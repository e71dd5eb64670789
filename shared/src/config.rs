use crate::state::AppState;

/// localStorage key holding the persisted state record.
pub const STORAGE_KEY: &str = "nrftw_map_state";

/// localStorage flag and query key that switch on developer extras.
pub const DEV_MODE_STORAGE_KEY: &str = "nrftw_dev_mode";
pub const DEV_MODE_QUERY_KEY: &str = "dev";

/// Region transform table served next to the map tiles.
pub const REGION_OFFSETS_URL: &str = "assets/region_offsets.csv";

/// How often the shell samples the map view into the store.
pub const VIEWPORT_UPDATE_INTERVAL_MS: u32 = 1_000;

/// Decimal places kept for the viewport in shared links.
pub const SHARE_DECIMALS: u32 = 1;

/// Decimal places shown for world coordinates.
pub const COORD_PRECISION: usize = 1;

/// Construction-time settings for the state store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub storage_key: String,
    pub defaults: AppState,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            defaults: AppState::default(),
        }
    }
}
