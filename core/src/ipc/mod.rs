//! Typed IPC from page to host: JSON events, single entry point, no string dispatch.
//!
//! The page sends `{ name, ...args }`. Invalid messages are ignored (no panic).
//! Nothing is returned per message; the host answers with effect batches
//! whenever it has something to change.

use serde::Deserialize;

use crate::submit::FormSubmission;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Allowed URL schemes for links opened outside the app. Prevents file:// and
/// other opens from the page.
const ALLOWED_URL_SCHEMES: [&str; 3] = ["https://", "http://", "mailto:"];

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One element reported by the page's intersection observer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealEntry {
    /// Element id (the page assigns one when missing).
    pub target: String,
    pub intersecting: bool,
    /// `data-animate-delay` in ms, as written in the markup.
    #[serde(default)]
    pub delay_ms: Option<i64>,
    /// Element is a `.stat-item`.
    #[serde(default)]
    pub stat: bool,
}

impl RevealEntry {
    /// Transition delay in ms; missing or negative is 0.
    #[must_use]
    pub fn delay(&self) -> u32 {
        self.delay_ms
            .map_or(0, |ms| u32::try_from(ms.max(0)).unwrap_or(u32::MAX))
    }
}

/// Events the page can send. Tagged with `name` for deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "name", rename_all_fields = "camelCase")]
pub enum UiEvent {
    /// DOMContentLoaded: page-load inputs for endpoint resolution and theme.
    PageReady {
        #[serde(default)]
        meta_endpoint: Option<String>,
        #[serde(default)]
        search: String,
        #[serde(default)]
        prefers_dark: bool,
        #[serde(default)]
        viewport_width: u32,
    },
    ToggleTheme,
    ToggleMenu,
    DocumentClick {
        #[serde(default)]
        inside_menu: bool,
        #[serde(default)]
        on_menu_toggle: bool,
    },
    KeyDown {
        key: String,
    },
    Resize {
        width: u32,
    },
    ScrollTo {
        section: String,
    },
    Reveal {
        entries: Vec<RevealEntry>,
    },
    Submit {
        form: FormSubmission,
        button_label: String,
    },
    LearnMore {
        service: String,
    },
    SocialClick {
        platform: String,
    },
    LegalClick {
        kind: String,
    },
    DismissToast,
}

/// Discriminant of [`UiEvent`], used as the subscription table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PageReady,
    ToggleTheme,
    ToggleMenu,
    DocumentClick,
    KeyDown,
    Resize,
    ScrollTo,
    Reveal,
    Submit,
    LearnMore,
    SocialClick,
    LegalClick,
    DismissToast,
}

impl UiEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PageReady { .. } => EventKind::PageReady,
            Self::ToggleTheme => EventKind::ToggleTheme,
            Self::ToggleMenu => EventKind::ToggleMenu,
            Self::DocumentClick { .. } => EventKind::DocumentClick,
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::Resize { .. } => EventKind::Resize,
            Self::ScrollTo { .. } => EventKind::ScrollTo,
            Self::Reveal { .. } => EventKind::Reveal,
            Self::Submit { .. } => EventKind::Submit,
            Self::LearnMore { .. } => EventKind::LearnMore,
            Self::SocialClick { .. } => EventKind::SocialClick,
            Self::LegalClick { .. } => EventKind::LegalClick,
            Self::DismissToast => EventKind::DismissToast,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse and open
// ---------------------------------------------------------------------------

/// Parses a raw IPC message. Invalid JSON or missing required fields return `None` (ignored safely).
#[must_use]
pub fn parse_message(raw: &str) -> Option<UiEvent> {
    match serde_json::from_str(raw) {
        Ok(event) => Some(event),
        Err(e) => {
            log::debug!("Ignoring IPC message: {}", e);
            None
        }
    }
}

/// True if `url` may be handed to the system opener.
#[must_use]
pub fn is_external_url(url: &str) -> bool {
    ALLOWED_URL_SCHEMES.iter().any(|s| url.starts_with(s))
}

/// Opens `url` with the system handler. Blocking; call off the UI thread.
pub fn open_external(url: &str) -> Result<(), String> {
    if !is_external_url(url) {
        return Err("URL must be http://, https:// or mailto:".to_string());
    }
    opener::open(url).map_err(|e| e.to_string())
}
