//! Toast notifications.
//!
//! One toast element on the page. Showing a notification replaces whatever
//! is displayed and schedules a hide after [`TOAST_TTL`]. Earlier hide timers
//! are not cancelled, so a fast follow-up can be hidden early.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;

use crate::config::TOAST_TTL;
use crate::effects::{Effect, EffectSink};

/// Severity of a notification; also the CSS class of the toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// A titled message for the toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Shows toasts and runs their hide timers on the session runtime.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn EffectSink>,
    runtime: Handle,
    ttl: Duration,
}

impl Notifier {
    #[must_use]
    pub fn new(sink: Arc<dyn EffectSink>, runtime: Handle) -> Self {
        Self {
            sink,
            runtime,
            ttl: TOAST_TTL,
        }
    }

    pub fn notify(&self, notification: Notification) {
        log::info!(
            "Toast shown ({:?}): {} - {}",
            notification.severity,
            notification.title,
            notification.message
        );
        self.sink.emit(vec![Effect::ShowToast { notification }]);

        let sink = Arc::clone(&self.sink);
        let ttl = self.ttl;
        self.runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            sink.emit(vec![Effect::HideToast]);
        });
    }

    /// Hides the toast now (close button).
    pub fn dismiss(&self) {
        self.sink.emit(vec![Effect::HideToast]);
    }
}
