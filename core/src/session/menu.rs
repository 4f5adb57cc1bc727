//! Mobile navigation menu and in-page scrolling.

use super::{Action, Ctx, SiteState, Transition};
use crate::config::MOBILE_BREAKPOINT_PX;
use crate::effects::{Effect, Target};
use crate::ipc::UiEvent;

pub const MOBILE_MENU: &str = "mobile-menu";
pub const MENU_ICON: &str = "menu-icon";
const OPEN_CLASS: &str = "open";

fn set_open(mut state: SiteState, open: bool) -> Transition {
    state.menu_open = open;
    log::debug!("Mobile menu open: {}", open);
    let actions = vec![
        Action::Dom(Effect::SetClass {
            target: Target::id(MOBILE_MENU),
            class: OPEN_CLASS.to_string(),
            on: open,
        }),
        Action::Dom(Effect::SetIcon {
            target: Target::id(MENU_ICON),
            icon: if open { "x" } else { "menu" },
        }),
        Action::Dom(Effect::RefreshIcons),
    ];
    Transition { state, actions }
}

fn close(state: SiteState) -> Transition {
    if state.menu_open {
        set_open(state, false)
    } else {
        Transition::idle(state)
    }
}

pub(super) fn on_toggle(_ctx: &Ctx<'_>, state: SiteState, _event: &UiEvent) -> Transition {
    let open = !state.menu_open;
    set_open(state, open)
}

pub(super) fn on_document_click(_ctx: &Ctx<'_>, state: SiteState, event: &UiEvent) -> Transition {
    match event {
        UiEvent::DocumentClick {
            inside_menu: false,
            on_menu_toggle: false,
        } => close(state),
        _ => Transition::idle(state),
    }
}

pub(super) fn on_key_down(_ctx: &Ctx<'_>, state: SiteState, event: &UiEvent) -> Transition {
    match event {
        UiEvent::KeyDown { key } if key == "Escape" => close(state),
        _ => Transition::idle(state),
    }
}

pub(super) fn on_resize(_ctx: &Ctx<'_>, mut state: SiteState, event: &UiEvent) -> Transition {
    let UiEvent::Resize { width } = event else {
        return Transition::idle(state);
    };
    state.viewport_width = *width;
    if state.viewport_width >= MOBILE_BREAKPOINT_PX {
        close(state)
    } else {
        Transition::idle(state)
    }
}

pub(super) fn on_scroll_to(_ctx: &Ctx<'_>, state: SiteState, event: &UiEvent) -> Transition {
    let UiEvent::ScrollTo { section } = event else {
        return Transition::idle(state);
    };
    log::debug!("Scrolling to: {}", section);
    let mut transition = close(state);
    transition.actions.insert(
        0,
        Action::Dom(Effect::ScrollIntoView {
            target: Target::id(section),
        }),
    );
    transition
}
