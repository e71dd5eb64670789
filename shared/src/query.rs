use url::{Url, form_urlencoded};

use crate::config::{DEV_MODE_QUERY_KEY, DEV_MODE_STORAGE_KEY, SHARE_DECIMALS};
use crate::state::{AppState, OpenedPopup, UrlOverrides};
use crate::storage::StateStorage;
use crate::viewport::Viewport;

const VIEWPORT_KEYS: [&str; 3] = ["x", "y", "scale"];
const POPUP_KEYS: [&str; 8] = ["type", "wx", "wy", "wz", "ida", "idb", "idc", "idd"];

/// Decoded `key=value` pairs of a query string, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse `?a=1&b=2` (the leading `?` is optional). A key without `=`
    /// has an empty value; `+` decodes to a space.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Self { pairs }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    fn finite(&self, key: &str) -> Option<f64> {
        self.get(key)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    fn integer(&self, key: &str) -> Option<i64> {
        self.get(key)?.trim().parse::<i64>().ok()
    }
}

impl UrlOverrides {
    /// Read the shared-link parameters. Each group is all-or-nothing: a
    /// missing or unparseable member drops the whole group.
    pub fn from_query(query: &str) -> Self {
        let params = QueryParams::parse(query);
        Self {
            viewport: viewport_from(&params),
            opened_popup: popup_from(&params),
        }
    }
}

fn viewport_from(params: &QueryParams) -> Option<Viewport> {
    Some(Viewport {
        x: params.finite("x")?,
        y: params.finite("y")?,
        scale: params.finite("scale")?,
    })
}

fn popup_from(params: &QueryParams) -> Option<OpenedPopup> {
    let resource_type = params.get("type")?.trim();
    if resource_type.is_empty() {
        return None;
    }
    Some(OpenedPopup {
        resource_type: resource_type.to_string(),
        world_x: params.finite("wx")?,
        world_y: params.finite("wy")?,
        world_z: params.finite("wz")?,
        id_a: params.integer("ida")?,
        id_b: params.integer("idb")?,
        id_c: params.integer("idc")?,
        id_d: params.integer("idd")?,
    })
}

/// Link that reopens the current view. Keeps the base URL's path, fragment
/// and unrelated query parameters; the selection keys appear only when a
/// popup is open. Fails when `base_href` is not an absolute URL.
pub fn shareable_url(base_href: &str, state: &AppState) -> Result<String, String> {
    let mut url =
        Url::parse(base_href).map_err(|e| format!("invalid base url {base_href:?}: {e}"))?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_link_key(key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let vp = state.viewport.rounded(SHARE_DECIMALS);
    let precision = SHARE_DECIMALS as usize;
    {
        let mut query = url.query_pairs_mut();
        query
            .clear()
            .extend_pairs(&kept)
            .append_pair("x", &format!("{:.precision$}", vp.x))
            .append_pair("y", &format!("{:.precision$}", vp.y))
            .append_pair("scale", &format!("{:.precision$}", vp.scale));

        if let Some(popup) = &state.opened_popup {
            query
                .append_pair("type", &popup.resource_type)
                .append_pair("wx", &popup.world_x.to_string())
                .append_pair("wy", &popup.world_y.to_string())
                .append_pair("wz", &popup.world_z.to_string())
                .append_pair("ida", &popup.id_a.to_string())
                .append_pair("idb", &popup.id_b.to_string())
                .append_pair("idc", &popup.id_c.to_string())
                .append_pair("idd", &popup.id_d.to_string());
        }
    }
    Ok(url.into())
}

fn is_link_key(key: &str) -> bool {
    VIEWPORT_KEYS.contains(&key) || POPUP_KEYS.contains(&key)
}

/// Developer extras are on when the page was opened with `?dev` or the
/// browser has the dev flag stored.
pub fn is_dev_mode<S: StateStorage>(query: &str, storage: &S) -> bool {
    if QueryParams::parse(query).contains(DEV_MODE_QUERY_KEY) {
        return true;
    }
    matches!(storage.read(DEV_MODE_STORAGE_KEY), Ok(Some(value)) if value == "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn popup() -> OpenedPopup {
        OpenedPopup {
            resource_type: "small_chest".to_string(),
            world_x: 12.5,
            world_y: 3.0,
            world_z: -40.75,
            id_a: 0,
            id_b: -17,
            id_c: 99,
            id_d: 123456789,
        }
    }

    #[test]
    fn parses_pairs_with_and_without_prefix() {
        let params = QueryParams::parse("?a=1&b=two%20words&flag&a=3");
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("b"), Some("two words"));
        assert_eq!(params.get("flag"), Some(""));
        assert!(params.contains("flag"));
        assert_eq!(QueryParams::parse("c=4").get("c"), Some("4"));
        assert_eq!(QueryParams::parse("").get("c"), None);
    }

    #[test]
    fn viewport_override_needs_all_three_fields() {
        let full = UrlOverrides::from_query("?x=1&y=2&scale=3");
        assert_eq!(full.viewport, Some(Viewport::new(1.0, 2.0, 3.0)));

        assert!(UrlOverrides::from_query("?x=1&y=2").viewport.is_none());
        assert!(UrlOverrides::from_query("?x=1&y=abc&scale=3").viewport.is_none());
        assert!(UrlOverrides::from_query("?x=1&y=2&scale=inf").viewport.is_none());
        assert!(UrlOverrides::from_query("?x=NaN&y=2&scale=3").viewport.is_none());
    }

    #[test]
    fn popup_override_needs_every_field() {
        let query = "?type=small_chest&wx=12.5&wy=3&wz=-40.75&ida=0&idb=-17&idc=99&idd=123456789";
        assert_eq!(UrlOverrides::from_query(query).opened_popup, Some(popup()));

        let missing = "?type=small_chest&wx=12.5&wy=3&wz=-40.75&ida=0&idb=-17&idc=99";
        assert!(UrlOverrides::from_query(missing).opened_popup.is_none());

        let bad_id = "?type=iron&wx=1&wy=1&wz=1&ida=0.5&idb=0&idc=0&idd=0";
        assert!(UrlOverrides::from_query(bad_id).opened_popup.is_none());

        let empty_type = "?type=&wx=1&wy=1&wz=1&ida=0&idb=0&idc=0&idd=0";
        assert!(UrlOverrides::from_query(empty_type).opened_popup.is_none());
    }

    #[test]
    fn groups_are_independent() {
        let overrides = UrlOverrides::from_query("?x=1&y=2&scale=3&type=iron");
        assert!(overrides.viewport.is_some());
        assert!(overrides.opened_popup.is_none());
        assert!(UrlOverrides::from_query("?dev").is_empty());
    }

    #[test]
    fn shareable_url_without_popup_has_no_selection_keys() {
        let state = AppState::default();
        let url = shareable_url("https://maps.example/nrftw/", &state).expect("absolute base");
        assert_eq!(url, "https://maps.example/nrftw/?x=6144.0&y=6144.0&scale=0.1");
        for key in POPUP_KEYS {
            assert!(!url.contains(&format!("{key}=")), "unexpected {key} in {url}");
        }
    }

    #[test]
    fn shareable_url_rounds_viewport_and_carries_popup() {
        let state = AppState {
            viewport: Viewport::new(8191.96, 100.04, 2.75),
            opened_popup: Some(popup()),
            ..AppState::default()
        };
        let url = shareable_url("https://maps.example/", &state).expect("absolute base");
        assert!(url.starts_with("https://maps.example/?x=8192.0&y=100.0&scale="));
        assert!(url.contains("&type=small_chest&wx=12.5&wy=3&wz=-40.75"));
        assert!(url.ends_with("&ida=0&idb=-17&idc=99&idd=123456789"));
    }

    #[test]
    fn shareable_url_replaces_stale_keys_and_keeps_others() {
        let state = AppState::default();
        let url = shareable_url(
            "https://maps.example/?dev&x=1&type=iron&lang=fr#legend",
            &state,
        )
        .expect("absolute base");
        assert_eq!(
            url,
            "https://maps.example/?dev=&lang=fr&x=6144.0&y=6144.0&scale=0.1#legend"
        );
    }

    #[test]
    fn shareable_url_parses_back_into_overrides() {
        let state = AppState {
            viewport: Viewport::new(4000.0, 5000.5, 3.0),
            opened_popup: Some(popup()),
            ..AppState::default()
        };
        let url = shareable_url("https://maps.example/map", &state).expect("absolute base");
        let query = url.split_once('?').map(|(_, q)| q).expect("has query");
        let overrides = UrlOverrides::from_query(query);
        assert_eq!(overrides.viewport, Some(Viewport::new(4000.0, 5000.5, 3.0)));
        assert_eq!(overrides.opened_popup, Some(popup()));
    }

    #[test]
    fn reserved_characters_survive_a_shared_link() {
        let state = AppState {
            opened_popup: Some(OpenedPopup {
                resource_type: "loot spawn&more=1".to_string(),
                ..popup()
            }),
            ..AppState::default()
        };
        let url = shareable_url("https://maps.example/", &state).expect("absolute base");
        assert!(url.contains("type=loot+spawn%26more%3D1"), "{url}");
        let query = url.split_once('?').map(|(_, q)| q).expect("has query");
        let overrides = UrlOverrides::from_query(query);
        assert_eq!(
            overrides.opened_popup.map(|p| p.resource_type),
            Some("loot spawn&more=1".to_string())
        );
    }

    #[test]
    fn query_values_decode_plus_and_percent() {
        let params = QueryParams::parse("a=b+c&d=100%25&e=%zz");
        assert_eq!(params.get("a"), Some("b c"));
        assert_eq!(params.get("d"), Some("100%"));
        assert_eq!(params.get("e"), Some("%zz"));
    }

    #[test]
    fn relative_base_is_rejected() {
        assert!(shareable_url("/map?x=1", &AppState::default()).is_err());
    }

    #[test]
    fn dev_mode_from_query_or_storage() {
        let mut storage = MemoryStorage::new();
        assert!(!is_dev_mode("?x=1", &storage));
        assert!(is_dev_mode("?dev", &storage));
        storage
            .write(DEV_MODE_STORAGE_KEY, "true")
            .expect("memory storage writes");
        assert!(is_dev_mode("", &storage));
    }
}
