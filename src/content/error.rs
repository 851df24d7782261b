//! Error types for the content pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading from a content store
#[derive(Debug, Error)]
pub enum ContentError {
    /// The content root itself is missing; nothing can be listed
    #[error("content root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("content unit not found: {0}")]
    UnitNotFound(String),
}

impl ContentError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures while splitting and validating a unit's frontmatter
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("content does not start with a `---` frontmatter block")]
    MissingFrontMatter,

    #[error("frontmatter block is not closed by a `---` line")]
    UnterminatedFrontMatter,

    #[error("invalid frontmatter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unparseable date `{0}`")]
    InvalidDate(String),
}
