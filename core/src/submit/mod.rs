//! Contact form submission.
//!
//! One submission at a time: [`SubmitController::try_begin`] claims the
//! in-flight slot and returns an [`InFlight`] guard; dropping the guard
//! restores the submit button and frees the slot, whatever the outcome.
//! A second attempt while the slot is taken is rejected, not queued.

mod relay;

pub use relay::{FormRelay, RelayPayload, RelayResponse, UreqRelay};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{DEMO_SUBMIT_DELAY, SUBMIT_PENDING_LABEL};
use crate::effects::{Effect, EffectSink};
use crate::endpoint::EndpointConfig;
use crate::notify::{Notification, Notifier, Severity};

/// Fields of the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// No response was obtained.
    #[error("network error: {0}")]
    Transport(String),
    /// The relay answered with a non-2xx status.
    #[error("relay rejected submission ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl SubmitError {
    /// Text for the error toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => {
                "Please try again or contact us directly. Check your internet connection."
                    .to_string()
            }
            Self::Rejected { message, .. } => {
                format!("{}. Please try again or contact us directly.", message)
            }
        }
    }
}

/// How a submission attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    Demo,
    Failed(SubmitError),
    /// Another submission was in flight; nothing was done.
    Busy,
}

/// Holds the in-flight slot. Dropping it restores the submit button and frees the slot.
pub struct InFlight {
    flag: Arc<AtomicBool>,
    sink: Arc<dyn EffectSink>,
    label: String,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.sink.emit(vec![Effect::RestoreSubmit {
            label: std::mem::take(&mut self.label),
        }]);
        self.flag.store(false, Ordering::Release);
    }
}

pub struct SubmitController {
    relay: Arc<dyn FormRelay>,
    sink: Arc<dyn EffectSink>,
    notifier: Notifier,
    in_flight: Arc<AtomicBool>,
    demo_delay: Duration,
}

impl SubmitController {
    #[must_use]
    pub fn new(relay: Arc<dyn FormRelay>, sink: Arc<dyn EffectSink>, notifier: Notifier) -> Self {
        Self {
            relay,
            sink,
            notifier,
            in_flight: Arc::new(AtomicBool::new(false)),
            demo_delay: DEMO_SUBMIT_DELAY,
        }
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claims the in-flight slot and puts the submit button into its pending state.
    /// `None` if a submission is already running.
    pub fn try_begin(&self, button_label: String) -> Option<InFlight> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Submission already in flight; ignoring");
            return None;
        }
        self.sink.emit(vec![Effect::SetSubmitPending {
            label: SUBMIT_PENDING_LABEL.to_string(),
        }]);
        Some(InFlight {
            flag: Arc::clone(&self.in_flight),
            sink: Arc::clone(&self.sink),
            label: button_label,
        })
    }

    /// Claims the slot and runs the submission to completion.
    #[allow(dead_code)]
    pub async fn submit(
        &self,
        endpoint: &EndpointConfig,
        form: FormSubmission,
        button_label: String,
    ) -> Outcome {
        match self.try_begin(button_label) {
            Some(flight) => self.complete(flight, endpoint, form).await,
            None => Outcome::Busy,
        }
    }

    /// Runs a claimed submission. The guard is released when this returns.
    pub async fn complete(
        &self,
        flight: InFlight,
        endpoint: &EndpointConfig,
        form: FormSubmission,
    ) -> Outcome {
        log::info!("Contact form submitted");
        log::debug!("Submission from {} <{}>", form.name, form.email);

        let result = if endpoint.is_demo() {
            self.run_demo(&form).await
        } else {
            self.run_live(endpoint, &form).await
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Form submission error: {}", e);
                self.notifier.notify(Notification::new(
                    "Failed to send message",
                    e.user_message(),
                    Severity::Error,
                ));
                Outcome::Failed(e)
            }
        };
        drop(flight);
        outcome
    }

    async fn run_demo(&self, form: &FormSubmission) -> Result<Outcome, SubmitError> {
        tokio::time::sleep(self.demo_delay).await;
        log::info!("Demo mode, submission not sent");
        log::debug!("Demo submission: {:?}", form);
        self.notifier.notify(Notification::new(
            "Demo Mode Active",
            "Form data was logged, not sent. Set a Formspree form id to enable real submissions.",
            Severity::Info,
        ));
        self.sink.emit(vec![Effect::ResetForm]);
        Ok(Outcome::Demo)
    }

    async fn run_live(
        &self,
        endpoint: &EndpointConfig,
        form: &FormSubmission,
    ) -> Result<Outcome, SubmitError> {
        let url = endpoint.submit_url();
        let payload = RelayPayload::from(form);
        let relay = Arc::clone(&self.relay);
        let response: RelayResponse = tokio::task::spawn_blocking(move || relay.post(&url, &payload))
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))??;

        if !response.is_success() {
            return Err(SubmitError::Rejected {
                status: response.status,
                message: response.error_message(),
            });
        }

        self.notifier.notify(Notification::new(
            "Message sent successfully!",
            "We'll get back to you within 24 hours.",
            Severity::Success,
        ));
        self.sink.emit(vec![Effect::ResetForm]);
        Ok(Outcome::Sent)
    }
}

#[cfg(test)]
mod tests;
