//! Window and WebView setup helpers.
//!
//! Icon loading, the init script and the start URL live here so main and
//! event handling stay focused on orchestration.

use tao::window::Icon;

use crate::config::{ENDPOINT_QUERY_PARAM, START_URL};

/// Loads the window icon from the embedded site (`icon.png`).
#[must_use]
pub fn window_icon() -> Option<Icon> {
    let bytes = crate::config::SITE.get_file("icon.png")?.contents();
    let img = image::load_from_memory(bytes)
        .inspect_err(|e| log::warn!("Window icon decode failed: {}", e))
        .ok()?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    Icon::from_rgba(rgba.into_raw(), w, h).ok()
}

/// Start URL, with the endpoint query parameter when `form_id` is set.
#[must_use]
pub fn start_url(form_id: Option<&str>) -> String {
    match form_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair(ENDPOINT_QUERY_PARAM, id)
                .finish();
            format!("{}?{}", START_URL, query)
        }
        None => START_URL.to_string(),
    }
}

/// Returns the init script: disables the context menu, exposes `window.native`
/// and buffers effect batches that arrive before `bridge.js` takes over.
#[must_use]
pub fn init_script() -> &'static str {
    r#"
        document.addEventListener('contextmenu', function(e) { e.preventDefault(); });
        window.native = {
            send: function(msg) {
                if (window.ipc && typeof window.ipc.postMessage === 'function') {
                    window.ipc.postMessage(JSON.stringify(msg));
                }
            }
        };
        window.__pendingEffects = window.__pendingEffects || [];
        window.__applyEffects = window.__applyEffects || function(batch) {
            window.__pendingEffects.push(batch);
        };
    "#
}
