//! inkwell: a markdown blog engine
//!
//! Posts are markdown files with a YAML front-matter block. They are
//! scanned from a content directory, parsed, indexed newest-first and
//! rendered to HTML on demand. The [`content`] module holds the pipeline;
//! [`server`] and [`commands`] are thin hosts on top of it.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{FsContentStore, MarkdownRenderer, PostLibrary};

/// A blog site rooted at a base directory
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content (posts) directory
    pub content_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);

        Self {
            config,
            base_dir,
            content_dir,
        }
    }

    /// A post library reading from the content directory
    pub fn library(&self) -> PostLibrary {
        PostLibrary::new(
            FsContentStore::new(&self.content_dir),
            self.config.metadata_defaults(),
        )
    }

    /// A markdown renderer configured for this site
    pub fn renderer(&self) -> MarkdownRenderer {
        MarkdownRenderer::from_config(&self.config)
    }
}
