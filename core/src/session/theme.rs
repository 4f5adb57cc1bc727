//! Light/dark theme.

use super::{Action, Ctx, SiteState, Transition};
use crate::effects::{Effect, Target};
use crate::ipc::UiEvent;

pub const THEME_ICON: &str = "theme-icon";
pub const THEME_ICON_MOBILE: &str = "theme-icon-mobile";
const DARK_CLASS: &str = "dark";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Saved preference first, then the system color scheme.
    #[must_use]
    pub fn initial(saved: Option<Theme>, prefers_dark: bool) -> Self {
        saved.unwrap_or(if prefers_dark { Self::Dark } else { Self::Light })
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Icon offered by the toggle: the theme you would switch to.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "moon",
            Self::Dark => "sun",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Effects that put `theme` on the page.
pub(super) fn apply(theme: Theme) -> Vec<Action> {
    vec![
        Action::Dom(Effect::SetClass {
            target: Target::Document,
            class: DARK_CLASS.to_string(),
            on: theme == Theme::Dark,
        }),
        Action::Dom(Effect::SetIcon {
            target: Target::id(THEME_ICON),
            icon: theme.icon(),
        }),
        Action::Dom(Effect::SetIcon {
            target: Target::id(THEME_ICON_MOBILE),
            icon: theme.icon(),
        }),
        Action::Dom(Effect::RefreshIcons),
    ]
}

pub(super) fn on_toggle(_ctx: &Ctx<'_>, mut state: SiteState, _event: &UiEvent) -> Transition {
    state.theme = state.theme.toggled();
    state.saved_theme = Some(state.theme);
    log::info!("Theme toggled to: {}", state.theme.as_str());
    let mut actions = vec![Action::PersistTheme(state.theme)];
    actions.extend(apply(state.theme));
    Transition { state, actions }
}
