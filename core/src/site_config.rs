//! Static site configuration (`site/config.json`).
//!
//! Embedded with the rest of the site. Only `formspree_endpoint` drives
//! behavior; the rest is display data.

use serde::Deserialize;

use crate::config::SITE;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    pub formspree_endpoint: String,
    pub contact: ContactInfo,
    pub social: SocialLinks,
    pub company: CompanyInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub facebook: String,
    pub twitter: String,
    pub linkedin: String,
    pub instagram: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyInfo {
    pub name: String,
    pub founded_year: Option<i32>,
    pub description: String,
}

impl SocialLinks {
    /// Configured URL for a platform name (case-insensitive), if non-empty.
    #[must_use]
    pub fn url_for(&self, platform: &str) -> Option<&str> {
        let url = match platform.to_ascii_lowercase().as_str() {
            "facebook" => &self.facebook,
            "twitter" | "x" => &self.twitter,
            "linkedin" => &self.linkedin,
            "instagram" => &self.instagram,
            _ => return None,
        };
        Some(url.as_str()).filter(|u| !u.trim().is_empty())
    }
}

impl SiteConfig {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Loads the embedded configuration. Missing or invalid config yields defaults (demo mode).
    #[must_use]
    pub fn embedded() -> Self {
        let Some(file) = SITE.get_file(CONFIG_FILE) else {
            log::warn!("No {} in embedded site; using defaults", CONFIG_FILE);
            return Self::default();
        };
        let raw = String::from_utf8_lossy(file.contents());
        Self::parse(&raw).unwrap_or_else(|e| {
            log::warn!("Invalid site {}: {}", CONFIG_FILE, e);
            Self::default()
        })
    }
}
