use std::cell::RefCell;
use std::rc::Rc;

use nrftw_map_shared::CoordinateConverter;
use wasm_bindgen_futures::spawn_local;

/// Fetch the region transform table as text.
pub async fn fetch_region_csv(url: &str) -> Result<String, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.text().await.map_err(|e| format!("read error: {e}"))
}

/// Load region transforms in the background. Until the table arrives every
/// region uses the default transform; a failed fetch leaves it that way.
pub fn load_regions_from_url(converter: Rc<RefCell<CoordinateConverter>>, url: String) {
    spawn_local(async move {
        match fetch_region_csv(&url).await {
            Ok(text) => {
                let report = converter.borrow_mut().load_transforms_from_csv(&text);
                tracing::info!(
                    %url,
                    applied = report.applied,
                    skipped = report.skipped,
                    "region transforms loaded"
                );
            }
            Err(e) => tracing::warn!(%url, "failed to load region transforms: {e}"),
        }
    });
}
