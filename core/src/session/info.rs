//! Informational toasts for links that have no page of their own yet.

use super::{Action, Ctx, SiteState, Transition};
use crate::ipc::UiEvent;
use crate::notify::{Notification, Severity};

pub(super) fn on_learn_more(_ctx: &Ctx<'_>, state: SiteState, event: &UiEvent) -> Transition {
    let UiEvent::LearnMore { service } = event else {
        return Transition::idle(state);
    };
    let notification = Notification::new(
        "Service Information",
        format!(
            "Learn more about {}. This would typically open a detailed service page.",
            service
        ),
        Severity::Info,
    );
    Transition {
        state,
        actions: vec![Action::Notify(notification)],
    }
}

/// Opens the configured profile URL, or explains where to configure it.
pub(super) fn on_social_click(ctx: &Ctx<'_>, state: SiteState, event: &UiEvent) -> Transition {
    let UiEvent::SocialClick { platform } = event else {
        return Transition::idle(state);
    };
    let action = match ctx.config.social.url_for(platform) {
        Some(url) => Action::OpenExternal(url.to_string()),
        None => Action::Notify(Notification::new(
            "Social Media",
            format!(
                "This would open our {} page. Links can be updated in the site configuration.",
                platform
            ),
            Severity::Info,
        )),
    };
    Transition {
        state,
        actions: vec![action],
    }
}

pub(super) fn on_legal_click(_ctx: &Ctx<'_>, state: SiteState, event: &UiEvent) -> Transition {
    let UiEvent::LegalClick { kind } = event else {
        return Transition::idle(state);
    };
    let page = if kind == "privacy" {
        "Privacy Policy"
    } else {
        "Terms of Service"
    };
    let notification = Notification::new(
        "Legal Pages",
        format!("This would open our {} page.", page),
        Severity::Info,
    );
    Transition {
        state,
        actions: vec![Action::Notify(notification)],
    }
}

pub(super) fn on_dismiss(_ctx: &Ctx<'_>, state: SiteState, _event: &UiEvent) -> Transition {
    Transition {
        state,
        actions: vec![Action::DismissToast],
    }
}
