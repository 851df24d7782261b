//! Post model

use chrono::{Datelike, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;

/// Marker separating a post's excerpt from the rest of its body
pub const MORE_MARKER: &str = "<!-- more -->";

/// Validated frontmatter of a post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostMetadata {
    /// Post title, never empty
    pub title: String,

    /// Publication date
    pub date: NaiveDateTime,

    /// Display string such as "12 min read"
    pub read_time: String,

    /// Category, exactly as written in the frontmatter
    pub category: String,

    /// Frontmatter keys without a dedicated field
    pub extra: IndexMap<String, serde_yaml::Value>,
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// Slug (URL-friendly name, unique within an index)
    pub slug: String,

    /// Source file path relative to the content root
    pub source: String,

    /// Parsed frontmatter
    pub meta: PostMetadata,

    /// Raw markdown body
    pub body: String,
}

impl Post {
    pub fn new(slug: String, source: String, meta: PostMetadata, body: String) -> Self {
        Self {
            slug,
            source,
            meta,
            body,
        }
    }

    pub fn title(&self) -> &str {
        &self.meta.title
    }

    pub fn category(&self) -> &str {
        &self.meta.category
    }

    pub fn date(&self) -> NaiveDateTime {
        self.meta.date
    }

    /// Calendar year used for archive grouping
    pub fn year(&self) -> i32 {
        self.meta.date.year()
    }

    /// Markdown excerpt: the text before `<!-- more -->`, or else the first paragraph
    pub fn excerpt(&self) -> &str {
        if let Some(pos) = self.body.find(MORE_MARKER) {
            return self.body[..pos].trim();
        }

        let body = self.body.trim_start();
        let end = body.find("\n\n").unwrap_or(body.len());
        body[..end].trim_end()
    }

    /// Number of whitespace-separated words in the body
    pub fn word_count(&self) -> usize {
        word_count(&self.body)
    }
}

pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
