//! Sparkwave Media site host: single event loop, one WebView, embedded site,
//! all page behavior in Rust.
//!
//! The page forwards DOM events over IPC; the session answers with effect
//! batches. Timers and the contact form request run on a current-thread
//! Tokio runtime on its own thread so the UI loop never blocks.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod config;
mod effects;
mod endpoint;
mod event_loop;
mod ipc;
mod notify;
mod paths;
mod protocol;
mod session;
mod site_config;
mod storage;
mod submit;
mod window;


use crate::config::{
    ENV_DEVTOOLS, ENV_FORMSPREE, SHOW_WINDOW_FALLBACK_SECS, SITE, WINDOW_HEIGHT,
    WINDOW_MIN_HEIGHT, WINDOW_MIN_WIDTH, WINDOW_WIDTH,
};
use crate::event_loop::{EffectQueue, UserEvent, run_event_loop};
use crate::ipc::{is_external_url, open_external, parse_message};
use crate::paths::user_data_dir;
use crate::session::Session;
use crate::site_config::SiteConfig;
use crate::storage::JsonPreferences;
use crate::submit::UreqRelay;
use crate::window::{init_script, start_url, window_icon};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tao::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use tao::event_loop::EventLoopBuilder;
use wry::WebViewBuilder;

/// Exits the process with code 1 after logging. Use for unrecoverable startup failures.
fn exit_fatal(msg: &str) -> ! {
    log::error!("{}", msg);
    std::process::exit(1);
}

/// Starts a current-thread runtime on a background thread and returns its handle.
fn spawn_runtime() -> tokio::runtime::Handle {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap_or_else(|e| exit_fatal(&format!("Async runtime: {}", e)));
    let handle = runtime.handle().clone();
    thread::Builder::new()
        .name("site-runtime".to_string())
        .spawn(move || runtime.block_on(std::future::pending::<()>()))
        .unwrap_or_else(|e| exit_fatal(&format!("Runtime thread: {}", e)));
    handle
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let wake_proxy = Mutex::new(proxy.clone());
    let effects = Arc::new(EffectQueue::new(move || {
        if let Ok(p) = wake_proxy.lock() {
            let _ = p.send_event(UserEvent::EffectsFlush);
        }
    }));

    let runtime = spawn_runtime();
    let session = Arc::new(Session::new(
        SiteConfig::embedded(),
        effects.clone(),
        Arc::new(UreqRelay::new()),
        Arc::new(JsonPreferences),
        runtime.clone(),
    ));

    let window = {
        let mut b = tao::window::WindowBuilder::new()
            .with_title("Sparkwave Media")
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_min_inner_size(LogicalSize::new(WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT))
            .with_visible(false);
        if let Some(icon) = window_icon() {
            b = b.with_window_icon(Some(icon));
        }
        if let Some(bounds) = storage::load_window_bounds() {
            b = b
                .with_position(PhysicalPosition::new(bounds.x, bounds.y))
                .with_inner_size(PhysicalSize::new(bounds.width, bounds.height));
        }
        b.build(&event_loop).unwrap_or_else(|e| {
            exit_fatal(&format!("Failed to create window: {}", e));
        })
    };

    let ipc_session = Arc::clone(&session);
    let ipc_handler = move |req: wry::http::Request<String>| {
        let Some(event) = parse_message(req.body()) else { return };
        ipc_session.dispatch(event);
    };

    let protocol_handler = move |_: wry::WebViewId<'_>, request: wry::http::Request<Vec<u8>>| {
        protocol::respond(&SITE, request.uri().path())
    };

    let nav_runtime = runtime.clone();
    let navigation_allow = move |url: String| {
        if url.starts_with("app://") || url.contains("app.localhost") {
            return true;
        }
        if is_external_url(&url) {
            nav_runtime.spawn_blocking(move || {
                if let Err(e) = open_external(&url) {
                    log::warn!("Could not open {}: {}", url, e);
                }
            });
        } else {
            log::warn!("Blocked navigation to {}", url);
        }
        false
    };

    let shown = Arc::new(AtomicUsize::new(0));
    let on_page_load = {
        let p = proxy.clone();
        let s = Arc::clone(&shown);
        move |_event: wry::PageLoadEvent, _url: String| {
            if s.fetch_add(1, Ordering::Relaxed) == 0 {
                let _ = p.send_event(UserEvent::ShowWindow);
            }
        }
    };
    {
        let p = proxy.clone();
        let s = Arc::clone(&shown);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(SHOW_WINDOW_FALLBACK_SECS));
            if s.fetch_add(1, Ordering::Relaxed) == 0 {
                let _ = p.send_event(UserEvent::ShowWindow);
            }
        });
    }

    let mut web_context = wry::WebContext::new(Some(user_data_dir()));
    let devtools = std::env::var(ENV_DEVTOOLS).as_deref() == Ok("1");
    let form_id = std::env::var(ENV_FORMSPREE).ok();

    let builder = WebViewBuilder::new_with_web_context(&mut web_context)
        .with_custom_protocol("app".to_string(), protocol_handler)
        .with_url(start_url(form_id.as_deref()))
        .with_ipc_handler(ipc_handler)
        .with_initialization_script(init_script())
        .with_navigation_handler(navigation_allow)
        .with_on_page_load_handler(on_page_load)
        .with_devtools(devtools);

    #[cfg(any(target_os = "windows", target_os = "macos"))]
    let webview = builder.build(&window).unwrap_or_else(|e| {
        exit_fatal(&format!("Failed to build webview: {}", e));
    });

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window.default_vbox().unwrap_or_else(|| exit_fatal("Failed to get GTK vbox"));
        builder.build_gtk(vbox).unwrap_or_else(|e| {
            exit_fatal(&format!("Failed to build webview: {}", e));
        })
    };

    log::info!("Sparkwave site host started");
    run_event_loop(event_loop, webview, window, web_context, effects);
}
