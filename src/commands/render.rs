//! Render a single post to HTML

use anyhow::{Context, Result};

use crate::content::{MarkdownRenderer, PostLibrary};
use crate::Blog;

/// Render the body of the post with the given slug
pub fn render_post(library: &PostLibrary, renderer: &MarkdownRenderer, slug: &str) -> Result<String> {
    let post = library
        .get_by_slug(slug)?
        .with_context(|| format!("No post with slug {:?}", slug))?;
    Ok(renderer.render(&post.body).html)
}

/// Run the render command
pub fn run(blog: &Blog, slug: &str) -> Result<()> {
    let html = render_post(&blog.library(), &blog.renderer(), slug)?;
    println!("{}", html);
    Ok(())
}
