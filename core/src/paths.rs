//! Where the host keeps per-user data: the WebView profile and preferences.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Directory name on macOS and Windows.
const APP_DIR: &str = "Sparkwave Site";
/// Directory name under the XDG data home.
#[cfg(target_os = "linux")]
const APP_DIR_XDG: &str = "sparkwave-site";
const PREFERENCES_FILE: &str = "config.json";

static USER_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

fn platform_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    return std::env::var("LOCALAPPDATA")
        .ok()
        .map(|local| PathBuf::from(local).join(APP_DIR).join("WebView2"));

    #[cfg(target_os = "macos")]
    return std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join("Library")
            .join("Application Support")
            .join(APP_DIR)
    });

    #[cfg(target_os = "linux")]
    return std::env::var("XDG_DATA_HOME")
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".local").join("share"))
        })
        .map(|p| p.join(APP_DIR_XDG));

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    return None;
}

fn create_user_data_dir() -> PathBuf {
    if let Some(dir) = platform_dir() {
        match std::fs::create_dir_all(&dir) {
            Ok(()) => return dir,
            Err(e) => log::warn!("Could not create {}: {}", dir.display(), e),
        }
    }
    let fallback = std::env::temp_dir().join(APP_DIR.replace(' ', "-"));
    if let Err(e) = std::fs::create_dir_all(&fallback) {
        log::warn!("Could not create {}: {}", fallback.display(), e);
    }
    fallback
}

/// User data directory, created on first use.
#[must_use]
pub fn user_data_dir() -> PathBuf {
    USER_DATA_DIR.get_or_init(create_user_data_dir).clone()
}

/// The preferences file inside [`user_data_dir`].
#[must_use]
pub fn preferences_path() -> PathBuf {
    user_data_dir().join(PREFERENCES_FILE)
}
