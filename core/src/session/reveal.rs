//! Scroll-triggered reveal animations.

use std::time::Duration;

use super::{Action, Ctx, SiteState, Transition};
use crate::effects::{Effect, REVEAL_CLASS, Target};
use crate::ipc::{RevealEntry, UiEvent};

fn animate(target: &str) -> Effect {
    Effect::SetClass {
        target: Target::id(target),
        class: REVEAL_CLASS.to_string(),
        on: true,
    }
}

fn entry_actions(entry: &RevealEntry) -> Vec<Action> {
    if !entry.intersecting {
        return Vec::new();
    }
    let mut actions = vec![Action::Dom(animate(&entry.target))];
    let delay = entry.delay();
    if delay > 0 {
        actions.push(Action::Dom(Effect::SetTransitionDelay {
            target: Target::id(&entry.target),
            ms: delay,
        }));
    }
    if entry.stat {
        actions.push(Action::Later {
            after: Duration::from_millis(u64::from(delay)),
            effects: vec![animate(&entry.target)],
        });
    }
    actions
}

pub(super) fn on_reveal(_ctx: &Ctx<'_>, state: SiteState, event: &UiEvent) -> Transition {
    let UiEvent::Reveal { entries } = event else {
        return Transition::idle(state);
    };
    let actions = entries.iter().flat_map(entry_actions).collect();
    Transition { state, actions }
}
