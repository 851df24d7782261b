//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::MetadataDefaults;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // URL
    /// Path prefix the site is served under
    pub root: String,
    /// Moment.js-style format for displayed dates
    pub date_format: String,

    // Content
    /// Directory holding the posts, relative to the base directory
    pub content_dir: String,
    pub default_category: String,
    pub default_read_time: String,
    /// Estimate "N min read" for posts without `readTime`
    pub estimate_read_time: bool,

    // Listing
    pub per_page: usize,
    /// Number of posts shown on the home page
    pub home_posts: usize,

    // Rendering
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub external_link: ExternalLinkConfig,

    // Server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let defaults = MetadataDefaults::default();
        Self {
            title: "Inkwell".to_string(),
            description: String::new(),
            author: String::new(),

            root: "/".to_string(),
            date_format: "MMM DD, YYYY".to_string(),

            content_dir: "posts".to_string(),
            default_category: defaults.category,
            default_read_time: defaults.read_time,
            estimate_read_time: defaults.estimate_read_time,

            per_page: 10,
            home_posts: 5,

            highlight: HighlightConfig::default(),
            external_link: ExternalLinkConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults the frontmatter parser applies to optional fields
    pub fn metadata_defaults(&self) -> MetadataDefaults {
        MetadataDefaults {
            category: self.default_category.clone(),
            read_time: self.default_read_time.clone(),
            estimate_read_time: self.estimate_read_time,
        }
    }
}

/// External link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalLinkConfig {
    /// Open absolute links in a new tab
    pub enable: bool,
}

impl Default for ExternalLinkConfig {
    fn default() -> Self {
        Self { enable: true }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Development server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}
