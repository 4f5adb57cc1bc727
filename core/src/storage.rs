//! Persistent preferences (JSON in user data dir).
//!
//! Loads and saves config.json; holds the theme choice and the window
//! geometry. The session reads the theme through [`PreferenceStore`] so it
//! never touches the filesystem directly.

use serde::{Deserialize, Serialize};
use std::fs;

use crate::paths::preferences_path;
use crate::session::Theme;

/// Window bounds for persistence (physical position and size).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Root preferences structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Where the last chosen theme is kept between runs.
pub trait PreferenceStore: Send + Sync {
    /// Saved theme, if any. Unknown values read as `None`.
    fn theme(&self) -> Option<Theme>;
    fn set_theme(&self, theme: Theme);
}

/// [`PreferenceStore`] backed by config.json in the user data dir.
pub struct JsonPreferences;

impl PreferenceStore for JsonPreferences {
    fn theme(&self) -> Option<Theme> {
        load_preferences().theme.as_deref().and_then(Theme::parse)
    }

    fn set_theme(&self, theme: Theme) {
        let mut prefs = load_preferences();
        prefs.theme = Some(theme.as_str().to_string());
        save_preferences(&prefs);
    }
}

/// Parses preferences; malformed content yields defaults.
#[must_use]
pub fn parse_preferences(content: &str) -> Preferences {
    serde_json::from_str(content).unwrap_or_default()
}

/// Loads preferences from user data dir. Returns default on missing or parse error.
#[must_use]
pub fn load_preferences() -> Preferences {
    let Ok(content) = fs::read_to_string(preferences_path()) else {
        return Preferences::default();
    };
    parse_preferences(&content)
}

/// Saves preferences to user data dir. Logs and ignores errors.
pub fn save_preferences(prefs: &Preferences) {
    let path = preferences_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match serde_json::to_string_pretty(prefs) {
        Ok(json) => {
            if let Err(e) = fs::write(&path, json) {
                log::warn!("Failed to write preferences to {}: {}", path.display(), e);
            }
        }
        Err(e) => log::warn!("Failed to serialize preferences: {}", e),
    }
}

/// Saves window bounds and persists.
pub fn save_window_bounds(x: i32, y: i32, width: u32, height: u32) {
    let mut prefs = load_preferences();
    prefs.window = Some(WindowBounds {
        x,
        y,
        width,
        height,
    });
    save_preferences(&prefs);
}

/// Returns saved window bounds if any.
#[must_use]
pub fn load_window_bounds() -> Option<WindowBounds> {
    load_preferences().window
}

#[cfg(test)]
pub(crate) mod testing {
    use super::PreferenceStore;
    use crate::session::Theme;
    use std::sync::Mutex;

    /// In-memory store for tests.
    #[derive(Default)]
    pub struct MemoryPreferences {
        pub theme: Mutex<Option<Theme>>,
    }

    impl MemoryPreferences {
        pub fn with_theme(theme: Theme) -> Self {
            Self {
                theme: Mutex::new(Some(theme)),
            }
        }
    }

    impl PreferenceStore for MemoryPreferences {
        fn theme(&self) -> Option<Theme> {
            *self.theme.lock().unwrap()
        }

        fn set_theme(&self, theme: Theme) {
            *self.theme.lock().unwrap() = Some(theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_preferences_reads_theme_and_window() {
        let prefs = parse_preferences(
            r#"{"theme":"dark","window":{"x":10,"y":20,"width":800,"height":600}}"#,
        );
        assert_eq!(prefs.theme.as_deref(), Some("dark"));
        let w = prefs.window.expect("window");
        assert_eq!((w.x, w.y, w.width, w.height), (10, 20, 800, 600));
    }

    #[test]
    fn parse_preferences_malformed_is_default() {
        let prefs = parse_preferences("{not json");
        assert!(prefs.theme.is_none());
        assert!(prefs.window.is_none());
    }

    #[test]
    fn unknown_theme_string_is_ignored() {
        let prefs = parse_preferences(r#"{"theme":"sepia"}"#);
        assert_eq!(prefs.theme.as_deref().and_then(Theme::parse), None);
    }
}
