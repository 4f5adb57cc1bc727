//! Form relay endpoint resolution.
//!
//! The form id comes from the first non-empty source: site configuration,
//! page meta tag, page query string. With none set, the placeholder id puts
//! the contact form into demo mode.

use crate::config::{ENDPOINT_QUERY_PARAM, RELAY_BASE_URL, UNCONFIGURED_ENDPOINT};

/// Candidate form ids in priority order. `None` and blank values are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointSources<'a> {
    pub configured: Option<&'a str>,
    pub meta: Option<&'a str>,
    pub query: Option<&'a str>,
}

/// Returns the form id to submit to, or [`UNCONFIGURED_ENDPOINT`].
#[must_use]
pub fn resolve_endpoint(sources: &EndpointSources<'_>) -> String {
    [sources.configured, sources.meta, sources.query]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(UNCONFIGURED_ENDPOINT)
        .to_string()
}

/// Value of the endpoint query parameter in `search` (with or without the leading `?`).
#[must_use]
pub fn query_endpoint(search: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == ENDPOINT_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|v| !v.is_empty())
}

/// Resolved form id for the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    id: String,
}

impl EndpointConfig {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    #[must_use]
    pub fn resolve(sources: &EndpointSources<'_>) -> Self {
        Self::new(resolve_endpoint(sources))
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True when no real form id is configured.
    #[must_use]
    pub fn is_demo(&self) -> bool {
        self.id.is_empty() || self.id == UNCONFIGURED_ENDPOINT
    }

    #[must_use]
    pub fn submit_url(&self) -> String {
        format!("{}{}", RELAY_BASE_URL, self.id)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::new(UNCONFIGURED_ENDPOINT)
    }
}
