//! List site content

use anyhow::Result;

use crate::content::{PostIndex, PostLibrary};

/// Format the listing of one content type
pub fn listing(index: &PostIndex, content_type: &str) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            out.push_str(&format!("Posts ({}):\n", index.len()));
            for post in index.posts() {
                out.push_str(&format!(
                    "  {} - {} [{}] ({})\n",
                    post.meta.date.format("%Y-%m-%d"),
                    post.meta.title,
                    post.slug,
                    post.meta.category
                ));
            }
        }
        "category" | "categories" => {
            let categories: Vec<_> = index.categories().collect();
            out.push_str(&format!("Categories ({}):\n", categories.len()));
            for (name, count) in categories {
                out.push_str(&format!("  {} ({})\n", name, count));
            }
        }
        "archive" | "archives" => {
            for group in index.archive() {
                out.push_str(&format!("{} ({}):\n", group.year, group.posts.len()));
                for post in group.posts {
                    out.push_str(&format!(
                        "  {} - {}\n",
                        post.meta.date.format("%m-%d"),
                        post.meta.title
                    ));
                }
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, categories, archive",
                content_type
            );
        }
    }

    Ok(out)
}

/// List site content by type
pub fn run(library: &PostLibrary, content_type: &str) -> Result<()> {
    let index = library.snapshot()?;
    print!("{}", listing(&index, content_type)?);
    Ok(())
}
