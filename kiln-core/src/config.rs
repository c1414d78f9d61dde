use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("site origin `{0}` is not an absolute URL")]
    InvalidOrigin(String),
}

/// Site-wide metadata shared by pages, feeds and absolute URLs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    /// Absolute URL prefix for `full_path`, e.g. `https://example.com`.
    pub origin: String,
    pub author: Option<String>,
    pub language: Option<String>,
}

impl SiteConfig {
    pub fn check(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.origin) {
            Ok(url) if url.has_host() => Ok(()),
            _ => Err(ConfigError::InvalidOrigin(self.origin.clone())),
        }
    }

    /// Origin without a trailing slash.
    pub fn origin(&self) -> &str {
        self.origin.trim_end_matches('/')
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Kiln".into(),
            description: "Posts, projects and the things I use".into(),
            origin: "http://localhost:3000".into(),
            author: None,
            language: Some("en".into()),
        }
    }
}
