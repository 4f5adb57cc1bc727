//! Unit tests for the submission flow: guard, demo mode, live outcomes.

use super::*;
use crate::effects::testing::RecordingSink;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use tokio::runtime::Handle;

const LABEL: &str = "Send Message";

/// Relay returning a canned result and counting calls.
struct FakeRelay {
    calls: AtomicUsize,
    result: Result<RelayResponse, SubmitError>,
    delay: Duration,
    last_url: Mutex<Option<String>>,
}

impl FakeRelay {
    fn responding(status: u16, status_text: &str, body: &str) -> Self {
        Self::with_result(Ok(RelayResponse {
            status,
            status_text: status_text.to_string(),
            body: body.to_string(),
        }))
    }

    fn with_result(result: Result<RelayResponse, SubmitError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            result,
            delay: Duration::ZERO,
            last_url: Mutex::new(None),
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FormRelay for FakeRelay {
    fn post(&self, url: &str, _payload: &RelayPayload) -> Result<RelayResponse, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.to_string());
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.result.clone()
    }
}

fn controller(relay: Arc<FakeRelay>) -> (Arc<RecordingSink>, SubmitController) {
    let sink = Arc::new(RecordingSink::default());
    let notifier = Notifier::new(sink.clone(), Handle::current());
    let controller = SubmitController::new(relay, sink.clone(), notifier);
    (sink, controller)
}

fn form() -> FormSubmission {
    FormSubmission {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        message: "Tell me more".to_string(),
    }
}

fn toasts(sink: &RecordingSink) -> Vec<Notification> {
    sink.effects()
        .into_iter()
        .filter_map(|e| match e {
            Effect::ShowToast { notification } => Some(notification),
            _ => None,
        })
        .collect()
}

fn assert_restored(sink: &RecordingSink, controller: &SubmitController) {
    assert_eq!(
        sink.effects().last(),
        Some(&Effect::RestoreSubmit {
            label: LABEL.to_string()
        })
    );
    assert!(!controller.is_submitting());
}

fn live() -> EndpointConfig {
    EndpointConfig::new("abc123")
}

#[tokio::test]
async fn live_success_notifies_and_clears_form() {
    let relay = Arc::new(FakeRelay::responding(200, "OK", r#"{"ok":true}"#));
    let (sink, controller) = controller(relay.clone());

    let outcome = controller.submit(&live(), form(), LABEL.to_string()).await;

    assert_eq!(outcome, Outcome::Sent);
    assert_eq!(relay.calls(), 1);
    assert_eq!(
        relay.last_url.lock().unwrap().as_deref(),
        Some("https://formspree.io/f/abc123")
    );
    let shown = toasts(&sink);
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].severity, Severity::Success);
    assert!(sink.contains(&Effect::ResetForm));
    assert_restored(&sink, &controller);
}

#[tokio::test]
async fn rejected_submission_keeps_fields() {
    let relay = Arc::new(FakeRelay::responding(
        422,
        "Unprocessable Entity",
        r#"{"error": "Invalid email"}"#,
    ));
    let (sink, controller) = controller(relay);

    let outcome = controller.submit(&live(), form(), LABEL.to_string()).await;

    assert_eq!(
        outcome,
        Outcome::Failed(SubmitError::Rejected {
            status: 422,
            message: "Invalid email".to_string()
        })
    );
    let shown = toasts(&sink);
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].severity, Severity::Error);
    assert!(shown[0].message.contains("Invalid email"));
    assert!(!sink.contains(&Effect::ResetForm));
    assert_restored(&sink, &controller);
}

#[tokio::test]
async fn rejected_without_json_body_uses_status() {
    let relay = Arc::new(FakeRelay::responding(503, "Service Unavailable", "down"));
    let (sink, controller) = controller(relay);

    controller.submit(&live(), form(), LABEL.to_string()).await;

    assert!(toasts(&sink)[0].message.contains("HTTP 503: Service Unavailable"));
}

#[tokio::test]
async fn transport_failure_notifies_error() {
    let relay = Arc::new(FakeRelay::with_result(Err(SubmitError::Transport(
        "connection refused".to_string(),
    ))));
    let (sink, controller) = controller(relay);

    let outcome = controller.submit(&live(), form(), LABEL.to_string()).await;

    assert!(matches!(outcome, Outcome::Failed(SubmitError::Transport(_))));
    let shown = toasts(&sink);
    assert_eq!(shown[0].severity, Severity::Error);
    assert!(shown[0].message.contains("internet connection"));
    assert!(!sink.contains(&Effect::ResetForm));
    assert_restored(&sink, &controller);
}

#[tokio::test(start_paused = true)]
async fn demo_mode_waits_then_informs() {
    let relay = Arc::new(FakeRelay::responding(200, "OK", ""));
    let (sink, controller) = controller(relay.clone());
    let started = tokio::time::Instant::now();

    let outcome = controller
        .submit(&EndpointConfig::default(), form(), LABEL.to_string())
        .await;

    assert_eq!(outcome, Outcome::Demo);
    assert!(started.elapsed() >= DEMO_SUBMIT_DELAY);
    assert_eq!(relay.calls(), 0);
    let shown = toasts(&sink);
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].severity, Severity::Info);
    assert!(sink.contains(&Effect::ResetForm));
    assert_restored(&sink, &controller);
}

#[tokio::test]
async fn pending_state_is_set_before_request() {
    let relay = Arc::new(FakeRelay::responding(200, "OK", ""));
    let (sink, controller) = controller(relay);

    let flight = controller.try_begin(LABEL.to_string()).expect("slot free");
    assert!(controller.is_submitting());
    assert_eq!(
        sink.effects(),
        vec![Effect::SetSubmitPending {
            label: "Sending".to_string()
        }]
    );

    drop(flight);
    assert_restored(&sink, &controller);
}

#[tokio::test]
async fn second_begin_while_in_flight_is_rejected() {
    let relay = Arc::new(FakeRelay::responding(200, "OK", ""));
    let (sink, controller) = controller(relay);

    let first = controller.try_begin(LABEL.to_string());
    assert!(first.is_some());
    assert!(controller.try_begin(LABEL.to_string()).is_none());
    assert_eq!(
        sink.count(|e| matches!(e, Effect::SetSubmitPending { .. })),
        1
    );

    drop(first);
    assert!(controller.try_begin(LABEL.to_string()).is_some());
}

#[tokio::test]
async fn rapid_submits_send_one_request() {
    let relay = Arc::new(FakeRelay::responding(200, "OK", "").slow(Duration::from_millis(50)));
    let (sink, controller) = controller(relay.clone());
    let endpoint = live();

    let (a, b, c) = tokio::join!(
        controller.submit(&endpoint, form(), LABEL.to_string()),
        controller.submit(&endpoint, form(), LABEL.to_string()),
        controller.submit(&endpoint, form(), LABEL.to_string()),
    );

    let outcomes = [a, b, c];
    assert_eq!(outcomes.iter().filter(|o| **o == Outcome::Sent).count(), 1);
    assert_eq!(outcomes.iter().filter(|o| **o == Outcome::Busy).count(), 2);
    assert_eq!(relay.calls(), 1);
    assert_eq!(
        sink.count(|e| matches!(e, Effect::RestoreSubmit { .. })),
        1
    );
    assert!(!controller.is_submitting());
}

#[test]
fn user_message_includes_rejection_text() {
    let err = SubmitError::Rejected {
        status: 422,
        message: "Invalid email".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "relay rejected submission (422): Invalid email"
    );
    assert!(err.user_message().starts_with("Invalid email."));
}

struct CaptureLogger;

static RECORDS: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        RECORDS
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

#[tokio::test(start_paused = true)]
async fn user_data_is_not_logged_above_debug() {
    static LOGGER: CaptureLogger = CaptureLogger;
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Trace);

    let form = FormSubmission {
        name: "Grace Hopper".to_string(),
        email: "grace@navy.example".to_string(),
        message: "COBOL question".to_string(),
    };
    let relay = Arc::new(FakeRelay::responding(200, "OK", ""));
    let (_, controller) = controller(relay);
    controller
        .submit(&EndpointConfig::default(), form.clone(), LABEL.to_string())
        .await;
    controller.submit(&live(), form, LABEL.to_string()).await;

    let records = RECORDS.lock().unwrap();
    assert!(records.iter().any(|(_, msg)| msg.contains("grace@navy.example")));
    for (level, msg) in records.iter().filter(|(level, _)| *level <= log::Level::Info) {
        for secret in ["Grace Hopper", "grace@navy.example", "COBOL question"] {
            assert!(!msg.contains(secret), "{} record leaks user data: {}", level, msg);
        }
    }
}
