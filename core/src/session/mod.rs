//! Page session: all mutable site state and the event table.
//!
//! Every page event goes through [`Session::dispatch`]: the subscription
//! table picks the handler for the event kind, the handler maps
//! (context, state, event) to a new state plus a list of actions, and the
//! session performs the actions (DOM effects, toasts, persistence, the
//! contact form submission, deferred effects).

mod info;
mod menu;
mod reveal;
mod theme;

pub use theme::Theme;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Datelike;
use tokio::runtime::Handle;

use crate::effects::{Effect, EffectSink, Target};
use crate::endpoint::{EndpointConfig, EndpointSources, query_endpoint};
use crate::ipc::{self, EventKind, UiEvent};
use crate::notify::{Notification, Notifier};
use crate::site_config::SiteConfig;
use crate::storage::PreferenceStore;
use crate::submit::{FormRelay, FormSubmission, SubmitController};

const CURRENT_YEAR: &str = "current-year";
const DEMO_NOTICE: &str = "demo-notice";

/// Mutable state of the loaded page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteState {
    pub theme: Theme,
    /// Theme from the preference store; updated on toggle.
    pub saved_theme: Option<Theme>,
    pub menu_open: bool,
    /// Resolved on `PageReady`, fixed for the rest of the page load.
    pub endpoint: EndpointConfig,
    pub viewport_width: u32,
}

/// Side effect requested by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Dom(Effect),
    Notify(Notification),
    DismissToast,
    PersistTheme(Theme),
    Submit {
        endpoint: EndpointConfig,
        form: FormSubmission,
        button_label: String,
    },
    OpenExternal(String),
    /// Emit `effects` after a delay.
    Later {
        after: Duration,
        effects: Vec<Effect>,
    },
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SiteState,
    pub actions: Vec<Action>,
}

impl Transition {
    /// State unchanged, nothing to do.
    #[must_use]
    pub fn idle(state: SiteState) -> Self {
        Self {
            state,
            actions: Vec::new(),
        }
    }
}

/// Read-only inputs available to every handler.
pub struct Ctx<'a> {
    pub config: &'a SiteConfig,
    pub year: i32,
}

pub type Handler = fn(&Ctx<'_>, SiteState, &UiEvent) -> Transition;

/// Event kind to handler, built once per session.
pub struct EventTable {
    handlers: HashMap<EventKind, Handler>,
}

impl EventTable {
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self {
            handlers: HashMap::new(),
        };
        table.on(EventKind::PageReady, on_page_ready);
        table.on(EventKind::ToggleTheme, theme::on_toggle);
        table.on(EventKind::ToggleMenu, menu::on_toggle);
        table.on(EventKind::DocumentClick, menu::on_document_click);
        table.on(EventKind::KeyDown, menu::on_key_down);
        table.on(EventKind::Resize, menu::on_resize);
        table.on(EventKind::ScrollTo, menu::on_scroll_to);
        table.on(EventKind::Reveal, reveal::on_reveal);
        table.on(EventKind::Submit, on_submit);
        table.on(EventKind::LearnMore, info::on_learn_more);
        table.on(EventKind::SocialClick, info::on_social_click);
        table.on(EventKind::LegalClick, info::on_legal_click);
        table.on(EventKind::DismissToast, info::on_dismiss);
        table
    }

    fn on(&mut self, kind: EventKind, handler: Handler) {
        if self.handlers.insert(kind, handler).is_some() {
            log::warn!("Handler for {:?} registered twice; keeping the last", kind);
        }
    }

    #[must_use]
    pub fn get(&self, kind: EventKind) -> Option<Handler> {
        self.handlers.get(&kind).copied()
    }
}

impl Default for EventTable {
    fn default() -> Self {
        Self::new()
    }
}

fn on_page_ready(ctx: &Ctx<'_>, mut state: SiteState, event: &UiEvent) -> Transition {
    let UiEvent::PageReady {
        meta_endpoint,
        search,
        prefers_dark,
        viewport_width,
    } = event
    else {
        return Transition::idle(state);
    };

    let query = query_endpoint(search);
    state.endpoint = EndpointConfig::resolve(&EndpointSources {
        configured: Some(&ctx.config.formspree_endpoint),
        meta: meta_endpoint.as_deref(),
        query: query.as_deref(),
    });
    state.theme = Theme::initial(state.saved_theme, *prefers_dark);
    state.viewport_width = *viewport_width;
    state.menu_open = false;

    if state.endpoint.is_demo() {
        log::info!("No form id configured; contact form runs in demo mode");
    } else {
        log::info!("Contact form posts to form {}", state.endpoint.id());
    }
    log::info!("Theme initialized: {}", state.theme.as_str());

    let mut actions = theme::apply(state.theme);
    actions.push(Action::Dom(Effect::SetText {
        target: Target::id(CURRENT_YEAR),
        text: ctx.year.to_string(),
    }));
    actions.push(Action::Dom(Effect::SetDisplay {
        target: Target::id(DEMO_NOTICE),
        visible: state.endpoint.is_demo(),
    }));
    let contact = &ctx.config.contact;
    let company = &ctx.config.company;
    let founded = company
        .founded_year
        .map(|year| format!("Since {}", year))
        .unwrap_or_default();
    for (id, text) in [
        ("contact-email", contact.email.as_str()),
        ("contact-phone", contact.phone.as_str()),
        ("contact-location", contact.location.as_str()),
        ("company-name", company.name.as_str()),
        ("company-description", company.description.as_str()),
        ("company-founded", founded.as_str()),
    ] {
        if !text.is_empty() {
            actions.push(Action::Dom(Effect::SetText {
                target: Target::id(id),
                text: text.to_string(),
            }));
        }
    }
    Transition { state, actions }
}

fn on_submit(_ctx: &Ctx<'_>, state: SiteState, event: &UiEvent) -> Transition {
    let UiEvent::Submit { form, button_label } = event else {
        return Transition::idle(state);
    };
    let action = Action::Submit {
        endpoint: state.endpoint.clone(),
        form: form.clone(),
        button_label: button_label.clone(),
    };
    Transition {
        state,
        actions: vec![action],
    }
}

/// Owns the page state and everything that acts on the page.
pub struct Session {
    state: Mutex<SiteState>,
    table: EventTable,
    config: SiteConfig,
    year: i32,
    sink: Arc<dyn EffectSink>,
    notifier: Notifier,
    submitter: Arc<SubmitController>,
    prefs: Arc<dyn PreferenceStore>,
    runtime: Handle,
}

impl Session {
    #[must_use]
    pub fn new(
        config: SiteConfig,
        sink: Arc<dyn EffectSink>,
        relay: Arc<dyn FormRelay>,
        prefs: Arc<dyn PreferenceStore>,
        runtime: Handle,
    ) -> Self {
        let notifier = Notifier::new(Arc::clone(&sink), runtime.clone());
        let submitter = Arc::new(SubmitController::new(
            relay,
            Arc::clone(&sink),
            notifier.clone(),
        ));
        let state = SiteState {
            saved_theme: prefs.theme(),
            ..SiteState::default()
        };
        Self {
            state: Mutex::new(state),
            table: EventTable::new(),
            config,
            year: chrono::Local::now().year(),
            sink,
            notifier,
            submitter,
            prefs,
            runtime,
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    #[allow(dead_code)]
    pub fn state(&self) -> SiteState {
        self.lock_state().clone()
    }

    #[must_use]
    #[allow(dead_code)]
    pub fn is_submitting(&self) -> bool {
        self.submitter.is_submitting()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SiteState> {
        self.state.lock().unwrap_or_else(|e| {
            log::error!("Session state mutex was poisoned, recovering");
            e.into_inner()
        })
    }

    /// Handles one page event to completion. Async work (timers, the submission) is spawned.
    pub fn dispatch(&self, event: UiEvent) {
        let Some(handler) = self.table.get(event.kind()) else {
            log::debug!("No handler for {:?}", event.kind());
            return;
        };
        let ctx = Ctx {
            config: &self.config,
            year: self.year,
        };
        let actions = {
            let mut state = self.lock_state();
            let transition = handler(&ctx, state.clone(), &event);
            *state = transition.state;
            transition.actions
        };
        self.perform(actions);
    }

    /// Runs actions in order; consecutive DOM effects go out as one batch.
    fn perform(&self, actions: Vec<Action>) {
        let mut dom = Vec::new();
        for action in actions {
            match action {
                Action::Dom(effect) => dom.push(effect),
                other => {
                    if !dom.is_empty() {
                        self.sink.emit(std::mem::take(&mut dom));
                    }
                    self.run(other);
                }
            }
        }
        if !dom.is_empty() {
            self.sink.emit(dom);
        }
    }

    fn run(&self, action: Action) {
        match action {
            Action::Dom(effect) => self.sink.emit(vec![effect]),
            Action::Notify(notification) => self.notifier.notify(notification),
            Action::DismissToast => self.notifier.dismiss(),
            Action::PersistTheme(theme) => self.prefs.set_theme(theme),
            Action::Submit {
                endpoint,
                form,
                button_label,
            } => {
                let Some(flight) = self.submitter.try_begin(button_label) else {
                    return;
                };
                let submitter = Arc::clone(&self.submitter);
                self.runtime.spawn(async move {
                    let outcome = submitter.complete(flight, &endpoint, form).await;
                    log::debug!("Submission finished: {:?}", outcome);
                });
            }
            Action::OpenExternal(url) => {
                self.runtime.spawn_blocking(move || {
                    if let Err(e) = ipc::open_external(&url) {
                        log::warn!("Could not open {}: {}", url, e);
                    }
                });
            }
            Action::Later { after, effects } => {
                let sink = Arc::clone(&self.sink);
                self.runtime.spawn(async move {
                    tokio::time::sleep(after).await;
                    sink.emit(effects);
                });
            }
        }
    }
}
