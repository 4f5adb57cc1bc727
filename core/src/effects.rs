//! DOM mutations the host asks the page to perform.
//!
//! Effects are serialized as `{ "op": ..., ...args }` and applied in order by
//! `site/bridge.js`. The host never touches the DOM any other way.

use serde::Serialize;

use crate::notify::Notification;

/// Class that starts an element's reveal transition.
pub const REVEAL_CLASS: &str = "animate";

/// Element an effect applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Target {
    /// `document.documentElement`.
    Document,
    /// Element looked up by id.
    Id(String),
}

impl Target {
    #[must_use]
    pub fn id(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

/// One DOM mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Effect {
    SetClass {
        target: Target,
        class: String,
        on: bool,
    },
    /// Sets `data-lucide` on the icon element; takes effect after `RefreshIcons`.
    SetIcon {
        target: Target,
        icon: &'static str,
    },
    SetText {
        target: Target,
        text: String,
    },
    SetDisplay {
        target: Target,
        visible: bool,
    },
    SetTransitionDelay {
        target: Target,
        ms: u32,
    },
    /// Disables the contact form's submit button, marks it loading and swaps its label.
    SetSubmitPending {
        label: String,
    },
    /// Re-enables the submit button and puts back its original label.
    RestoreSubmit {
        label: String,
    },
    ResetForm,
    ShowToast {
        #[serde(flatten)]
        notification: Notification,
    },
    HideToast,
    ScrollIntoView {
        target: Target,
    },
    /// Renders `data-lucide` placeholders as inline SVG (`site/icons.js`).
    RefreshIcons,
}

impl Effect {
    /// Visual polish the page can do without (reveal animation, icon refresh).
    /// Only batches made entirely of these may be shed under backpressure.
    #[must_use]
    pub fn is_cosmetic(&self) -> bool {
        match self {
            Self::SetTransitionDelay { .. } | Self::RefreshIcons => true,
            Self::SetClass { class, .. } => class == REVEAL_CLASS,
            _ => false,
        }
    }
}

/// Receives effect batches; each batch is applied atomically by the page.
pub trait EffectSink: Send + Sync {
    fn emit(&self, effects: Vec<Effect>);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{Effect, EffectSink};
    use std::sync::Mutex;

    /// Records every batch instead of sending it to a page.
    #[derive(Default)]
    pub struct RecordingSink {
        batches: Mutex<Vec<Vec<Effect>>>,
    }

    impl RecordingSink {
        /// All effects emitted so far, flattened in order.
        pub fn effects(&self) -> Vec<Effect> {
            self.batches.lock().unwrap().iter().flatten().cloned().collect()
        }

        pub fn contains(&self, effect: &Effect) -> bool {
            self.effects().contains(effect)
        }

        pub fn count(&self, pred: impl Fn(&Effect) -> bool) -> usize {
            self.effects().iter().filter(|e| pred(e)).count()
        }

        pub fn clear(&self) {
            self.batches.lock().unwrap().clear();
        }
    }

    impl EffectSink for RecordingSink {
        fn emit(&self, effects: Vec<Effect>) {
            self.batches.lock().unwrap().push(effects);
        }
    }
}
