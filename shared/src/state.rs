use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::viewport::Viewport;

/// Color treatment applied to the map tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapFilter {
    #[default]
    None,
    Grayscale,
    Sepia,
    Contrast,
    Brightness,
    Dark,
}

impl MapFilter {
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Grayscale,
        Self::Sepia,
        Self::Contrast,
        Self::Brightness,
        Self::Dark,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Contrast => "contrast",
            Self::Brightness => "brightness",
            Self::Dark => "dark",
        }
    }

    /// CSS `filter` value for the tile layer.
    pub const fn css_filter(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale(100%)",
            Self::Sepia => "sepia(100%)",
            Self::Contrast => "contrast(150%) saturate(120%)",
            Self::Brightness => "brightness(130%) saturate(110%)",
            Self::Dark => "brightness(70%) contrast(110%)",
        }
    }
}

impl fmt::Display for MapFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s)
            .ok_or_else(|| format!("unknown map filter: {s}"))
    }
}

/// The object whose popup is open. `id_a..id_d` are the four words of the
/// object's GUID; the world position lets the map re-select the marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedPopup {
    pub resource_type: String,
    pub world_x: f64,
    pub world_y: f64,
    pub world_z: f64,
    pub id_a: i64,
    pub id_b: i64,
    pub id_c: i64,
    pub id_d: i64,
}

impl OpenedPopup {
    pub const fn guid(&self) -> [i64; 4] {
        [self.id_a, self.id_b, self.id_c, self.id_d]
    }
}

/// Everything the map remembers between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub viewport: Viewport,
    pub visible_resources: BTreeSet<String>,
    pub opened_popup: Option<OpenedPopup>,
    pub expanded_groups: BTreeSet<String>,
    pub map_filter: MapFilter,
    pub expert_mode: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            visible_resources: ["iron", "copper", "silver"]
                .into_iter()
                .map(String::from)
                .collect(),
            opened_popup: None,
            expanded_groups: BTreeSet::from(["ore".to_string()]),
            map_filter: MapFilter::None,
            expert_mode: false,
        }
    }
}

impl AppState {
    /// Persisted record. Sets are written as sorted arrays.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("serialize error: {e}"))
    }
}

/// Decode a persisted record. Returns `None` when the text is not a JSON
/// object; otherwise each field falls back to `defaults` on its own when it
/// is missing or malformed.
pub fn decode_persisted(json: &str, defaults: &AppState) -> Option<AppState> {
    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("persisted state is not valid JSON: {e}");
            return None;
        }
    };
    let Value::Object(fields) = value else {
        tracing::warn!("persisted state is not a JSON object");
        return None;
    };

    Some(AppState {
        viewport: field(&fields, "viewport").unwrap_or(defaults.viewport),
        visible_resources: field(&fields, "visibleResources")
            .unwrap_or_else(|| defaults.visible_resources.clone()),
        opened_popup: field(&fields, "openedPopup")
            .unwrap_or_else(|| defaults.opened_popup.clone()),
        expanded_groups: field(&fields, "expandedGroups")
            .unwrap_or_else(|| defaults.expanded_groups.clone()),
        map_filter: field(&fields, "mapFilter").unwrap_or(defaults.map_filter),
        expert_mode: field(&fields, "expertMode").unwrap_or(defaults.expert_mode),
    })
}

fn field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key)?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(field = key, "ignoring persisted field: {e}");
            None
        }
    }
}

/// The parts of the state a shared link may carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlOverrides {
    pub viewport: Option<Viewport>,
    pub opened_popup: Option<OpenedPopup>,
}

impl UrlOverrides {
    pub fn is_empty(&self) -> bool {
        self.viewport.is_none() && self.opened_popup.is_none()
    }
}

/// Combine the three state sources.
///
/// The persisted snapshot, when present, replaces the defaults. The URL may
/// then replace the viewport and the opened popup, each wholesale; it never
/// touches visibility, groups, filter or expert mode.
pub fn merge(defaults: AppState, persisted: Option<AppState>, overrides: &UrlOverrides) -> AppState {
    let mut state = persisted.unwrap_or(defaults);
    if let Some(viewport) = overrides.viewport {
        state.viewport = viewport;
    }
    if let Some(popup) = &overrides.opened_popup {
        state.opened_popup = Some(popup.clone());
    }
    state
}
