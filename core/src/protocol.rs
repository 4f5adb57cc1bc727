// app:// protocol: serve the embedded site, CSP, no external URLs.

use include_dir::Dir;
use std::borrow::Cow;

/// CSP for app://. The page never talks to the network; the host does.
pub const CSP: &str = "default-src 'self'; script-src 'self'; style-src 'self'; img-src 'self' data:; connect-src 'none';";

/// Served for `/` and empty paths.
pub const INDEX_PATH: &str = "index.html";

/// Outcome of serving one request.
pub enum ServeResult {
    Found {
        body: Cow<'static, [u8]>,
        mime_type: &'static str,
    },
    NotFound,
}

/// MIME type from the file extension.
#[must_use]
pub fn mime_from_path(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    match ext {
        "html" => "text/html",
        "js" => "application/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

/// Maps a URI path to a path inside the site dir. `None` for traversal attempts.
#[must_use]
pub fn normalize_path(uri_path: &str) -> Option<&str> {
    let path = uri_path.trim_matches('/');
    if path.contains("..") {
        return None;
    }
    Some(if path.is_empty() { INDEX_PATH } else { path })
}

/// Serve one request from the embedded site dir. Path is the URI path (e.g. "/" or "/styles.css").
/// No filesystem access.
#[must_use]
pub fn serve(site: &'static Dir<'static>, uri_path: &str) -> ServeResult {
    let Some(path) = normalize_path(uri_path) else {
        log::warn!("Rejected path traversal: {}", uri_path);
        return ServeResult::NotFound;
    };
    match site.get_file(path) {
        Some(file) => ServeResult::Found {
            body: Cow::Borrowed(file.contents()),
            mime_type: mime_from_path(path),
        },
        None => ServeResult::NotFound,
    }
}

/// Full HTTP response for `uri_path`, with CSP and `nosniff` on every status.
#[must_use]
pub fn respond(site: &'static Dir<'static>, uri_path: &str) -> http::Response<Cow<'static, [u8]>> {
    let (status, body, mime_type) = match serve(site, uri_path) {
        ServeResult::Found { body, mime_type } => (200, body, mime_type),
        ServeResult::NotFound => (404, Cow::Borrowed(b"Not Found".as_slice()), "text/plain"),
    };
    http::Response::builder()
        .status(status)
        .header("Content-Type", mime_type)
        .header("Content-Security-Policy", CSP)
        .header("X-Content-Type-Options", "nosniff")
        .body(body)
        .unwrap_or_else(|e| {
            log::error!("Protocol response build failed: {}", e);
            let mut resp = http::Response::new(Cow::Borrowed(b"Internal Server Error".as_slice()));
            *resp.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}
