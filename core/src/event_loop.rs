//! Event loop, user events, and the effect queue.
//!
//! Producers (the session on the UI thread, timers and submissions on the
//! runtime thread) push serialized effect batches to [`EffectQueue`]; the
//! first push of a batch wakes the loop with `EffectsFlush`, and the loop
//! drains the queue and delivers everything in one `evaluate_script`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::MAX_PENDING_EFFECTS;
use crate::effects::{Effect, EffectSink};
use crate::storage;

/// User-defined events sent from background threads or IPC into the main loop.
pub enum UserEvent {
    /// Wake to drain the effect queue and deliver a batch to the WebView.
    EffectsFlush,
    /// Request to show the window (after first load or fallback timeout).
    ShowWindow,
}

/// Serialized effect batches waiting for the event loop.
pub struct EffectQueue {
    batches: Mutex<Vec<String>>,
    pending: AtomicUsize,
    wake: Box<dyn Fn() + Send + Sync>,
}

impl EffectQueue {
    /// `wake` is called when the queue goes from empty to non-empty.
    pub fn new(wake: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            pending: AtomicUsize::new(0),
            wake: Box::new(wake),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.batches.lock().unwrap_or_else(|e| {
            log::error!("Effect queue mutex was poisoned, recovering");
            e.into_inner()
        })
    }

    /// Pushes one JSON batch and wakes the loop only when this is the first item.
    fn push(&self, json: String) {
        let was_first = {
            let mut q = self.lock();
            q.push(json);
            q.len() == 1
        };
        if was_first {
            (self.wake)();
        }
    }

    /// Takes every queued batch.
    pub fn drain(&self) -> Vec<String> {
        let batch = std::mem::take(&mut *self.lock());
        let to_sub = batch.len().min(self.pending.load(Ordering::Relaxed));
        self.pending.fetch_sub(to_sub, Ordering::Relaxed);
        batch
    }
}

impl EffectSink for EffectQueue {
    fn emit(&self, effects: Vec<Effect>) {
        if effects.is_empty() {
            return;
        }
        if self.pending.load(Ordering::Relaxed) >= MAX_PENDING_EFFECTS
            && effects.iter().all(Effect::is_cosmetic)
        {
            log::warn!("Effect backpressure: dropping batch of {}", effects.len());
            return;
        }
        match serde_json::to_string(&effects) {
            Ok(json) => {
                self.pending.fetch_add(1, Ordering::Relaxed);
                self.push(json);
            }
            Err(e) => log::warn!("Failed to serialize effects: {}", e),
        }
    }
}

/// Escapes a JSON string for safe embedding inside a JS string (backslash, quote, newline, carriage return).
/// Avoids allocation when the string contains none of these characters.
#[must_use]
pub fn escape_json_for_js(s: &str) -> std::borrow::Cow<'_, str> {
    if !s.contains(['\\', '"', '\n', '\r']) {
        return std::borrow::Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    std::borrow::Cow::Owned(out)
}

/// Script that hands each batch to the page's effect applier, in order.
#[must_use]
pub fn delivery_script(batches: &[String]) -> String {
    let mut script = String::from("if (window.__applyEffects) { ");
    for batch in batches {
        script.push_str(&format!(
            r#"try {{ window.__applyEffects(JSON.parse("{}")); }} catch(e) {{}}"#,
            escape_json_for_js(batch)
        ));
    }
    script.push_str(" }");
    script
}

/// Drains the effect queue and runs one script to deliver all batches. Returns true if any were delivered.
fn drain_and_deliver(queue: &EffectQueue, webview: &wry::WebView) -> bool {
    let batches = queue.drain();
    if batches.is_empty() {
        return false;
    }
    if let Err(e) = webview.evaluate_script(&delivery_script(&batches)) {
        log::warn!("Effect evaluate_script failed: {}", e);
    }
    true
}

/// Runs the tao event loop until exit.
///
/// Keeps `web_context` and `window` alive for the lifetime of `webview`.
/// Uses `ControlFlow::Poll` after delivering effects so the loop re-runs
/// immediately when there is pending work; otherwise `Wait` to avoid busy-waiting.
pub fn run_event_loop(
    event_loop: tao::event_loop::EventLoop<UserEvent>,
    webview: wry::WebView,
    window: tao::window::Window,
    _web_context: wry::WebContext,
    effects: Arc<EffectQueue>,
) -> ! {
    event_loop.run(move |event, _event_loop, control_flow| {
        *control_flow = tao::event_loop::ControlFlow::Wait;

        match event {
            tao::event::Event::UserEvent(UserEvent::ShowWindow) => {
                window.set_visible(true);
            }
            tao::event::Event::UserEvent(UserEvent::EffectsFlush)
            | tao::event::Event::MainEventsCleared => {
                if drain_and_deliver(&effects, &webview) {
                    *control_flow = tao::event_loop::ControlFlow::Poll;
                }
            }
            tao::event::Event::WindowEvent {
                event: tao::event::WindowEvent::CloseRequested,
                ..
            } => {
                if let Ok(pos) = window.outer_position() {
                    let size = window.inner_size();
                    storage::save_window_bounds(pos.x, pos.y, size.width, size.height);
                }
                *control_flow = tao::event_loop::ControlFlow::Exit;
            }
            _ => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{REVEAL_CLASS, Target};

    fn queue() -> (Arc<AtomicUsize>, EffectQueue) {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        let queue = EffectQueue::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (wakes, queue)
    }

    #[test]
    fn escape_json_for_js_borrows_clean_input() {
        assert!(matches!(
            escape_json_for_js("[1,2]"),
            std::borrow::Cow::Borrowed(_)
        ));
        assert_eq!(escape_json_for_js(r#"{"a":"b"}"#), r#"{\"a\":\"b\"}"#);
        assert_eq!(escape_json_for_js("a\nb\\c"), "a\\nb\\\\c");
    }

    #[test]
    fn first_push_wakes_once_per_batch() {
        let (wakes, queue) = queue();
        queue.emit(vec![Effect::HideToast]);
        queue.emit(vec![Effect::ResetForm]);
        assert_eq!(wakes.load(Ordering::SeqCst), 1);

        let batches = queue.drain();
        assert_eq!(batches, vec![r#"[{"op":"hideToast"}]"#, r#"[{"op":"resetForm"}]"#]);

        queue.emit(vec![Effect::HideToast]);
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_batches_are_skipped() {
        let (wakes, queue) = queue();
        queue.emit(Vec::new());
        assert_eq!(wakes.load(Ordering::SeqCst), 0);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn backpressure_drops_beyond_limit() {
        let (_, queue) = queue();
        for _ in 0..MAX_PENDING_EFFECTS + 10 {
            queue.emit(vec![Effect::RefreshIcons]);
        }
        assert_eq!(queue.drain().len(), MAX_PENDING_EFFECTS);
        queue.emit(vec![Effect::RefreshIcons]);
        assert_eq!(queue.drain().len(), 1);
    }

    #[tokio::test]
    async fn full_queue_still_restores_submit_button() {
        use crate::notify::Notifier;
        use crate::submit::{FormRelay, RelayPayload, RelayResponse, SubmitController, SubmitError};

        struct UnusedRelay;
        impl FormRelay for UnusedRelay {
            fn post(&self, _: &str, _: &RelayPayload) -> Result<RelayResponse, SubmitError> {
                Err(SubmitError::Transport("unused".to_string()))
            }
        }

        let (_, queue) = queue();
        let queue = Arc::new(queue);
        for _ in 0..MAX_PENDING_EFFECTS {
            queue.emit(vec![Effect::RefreshIcons]);
        }
        let notifier = Notifier::new(queue.clone(), tokio::runtime::Handle::current());
        let controller = SubmitController::new(Arc::new(UnusedRelay), queue.clone(), notifier);

        let flight = controller.try_begin("Send Message".to_string());
        assert!(flight.is_some());
        drop(flight);
        queue.emit(vec![Effect::ResetForm]);
        queue.emit(vec![Effect::RefreshIcons]);

        let batches = queue.drain();
        assert_eq!(batches.len(), MAX_PENDING_EFFECTS + 3);
        assert!(batches.iter().any(|b| b.contains(r#""op":"setSubmitPending""#)));
        assert!(batches.iter().any(|b| b.contains(r#""op":"restoreSubmit""#)));
        assert!(batches.iter().any(|b| b.contains(r#""op":"resetForm""#)));
        assert!(!controller.is_submitting());
    }

    #[test]
    fn only_reveal_and_icon_refresh_are_cosmetic() {
        assert!(Effect::RefreshIcons.is_cosmetic());
        assert!(
            Effect::SetClass {
                target: Target::id("reveal-1"),
                class: REVEAL_CLASS.to_string(),
                on: true,
            }
            .is_cosmetic()
        );
        assert!(
            !Effect::SetClass {
                target: Target::id("mobile-menu"),
                class: "open".to_string(),
                on: false,
            }
            .is_cosmetic()
        );
        assert!(!Effect::RestoreSubmit { label: String::new() }.is_cosmetic());
        assert!(!Effect::HideToast.is_cosmetic());
    }

    #[test]
    fn delivery_script_wraps_each_batch() {
        let script = delivery_script(&[r#"[{"op":"hideToast"}]"#.to_string()]);
        assert!(script.starts_with("if (window.__applyEffects) { "));
        assert!(script.contains(r#"JSON.parse("[{\"op\":\"hideToast\"}]")"#));
        assert!(script.ends_with(" }"));
    }
}
