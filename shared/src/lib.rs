pub mod catalog;
pub mod colors;
pub mod config;
pub mod converter;
pub mod coords;
pub mod format;
pub mod query;
pub mod state;
pub mod storage;
pub mod store;
pub mod transform;
pub mod viewport;

pub use catalog::{ResourceCatalog, ResourceGroupDef, ResourceTypeDef};
pub use config::StoreConfig;
pub use converter::{CoordinateConverter, CsvLoadReport};
pub use coords::*;
pub use state::{AppState, MapFilter, OpenedPopup, UrlOverrides};
pub use storage::{MemoryStorage, StateStorage};
pub use store::{ListenerId, StateStore};
pub use transform::{Transform, TransformError, TransformRegistry, TransformRowError};
pub use viewport::Viewport;
