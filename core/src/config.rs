//! Application configuration and compile-time constants.
//!
//! Centralizes window dimensions, effect queue limits, env vars, site timings
//! and the embedded site path so the rest of the crate stays decoupled from
//! concrete values.

use std::time::Duration;

use include_dir::include_dir;

/// Max pending effect batches before dropping new ones (backpressure).
/// Also bounds queue memory: at most this many serialized batches are queued at once.
pub const MAX_PENDING_EFFECTS: usize = 256;

/// Initial window size (logical).
pub const WINDOW_WIDTH: f64 = 1200.0;

/// Initial window height (logical).
pub const WINDOW_HEIGHT: f64 = 800.0;

/// Minimum window width (logical). Below the mobile breakpoint so the menu can be exercised.
pub const WINDOW_MIN_WIDTH: f64 = 360.0;

/// Minimum window height (logical).
pub const WINDOW_MIN_HEIGHT: f64 = 480.0;

/// Seconds to wait before showing the window if the first page load never fires.
pub const SHOW_WINDOW_FALLBACK_SECS: u64 = 3;

/// Env var: set to `"1"` to enable WebView DevTools.
pub const ENV_DEVTOOLS: &str = "SPARKWAVE_DEVTOOLS";

/// Env var: form id passed to the page as the `formspree` query parameter.
pub const ENV_FORMSPREE: &str = "SPARKWAVE_FORMSPREE";

/// Start page inside the embedded site.
pub const START_URL: &str = "app://localhost/index.html";

/// Embedded site directory (pages, styles, bridge script, `config.json`).
pub static SITE: include_dir::Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../site");

/// Base URL of the form relay; the form id is appended.
pub const RELAY_BASE_URL: &str = "https://formspree.io/f/";

/// Placeholder form id meaning "unconfigured"; submissions run in demo mode.
pub const UNCONFIGURED_ENDPOINT: &str = "YOUR_FORM_ID";

/// Query parameter consulted by the endpoint resolver.
pub const ENDPOINT_QUERY_PARAM: &str = "formspree";

/// Simulated processing time for demo-mode submissions.
pub const DEMO_SUBMIT_DELAY: Duration = Duration::from_millis(1500);

/// How long a toast stays visible.
pub const TOAST_TTL: Duration = Duration::from_millis(5000);

/// Viewport width (CSS px) at which the mobile menu is force-closed.
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

/// Label shown on the submit button while a submission is in flight.
pub const SUBMIT_PENDING_LABEL: &str = "Sending";
