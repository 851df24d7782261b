//! Create a new post

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::Blog;

/// Front matter written into a new post
#[derive(Debug, Serialize)]
struct Scaffold<'a> {
    title: &'a str,
    date: String,
    category: &'a str,
}

/// Create a post file named after the slugified title
///
/// Returns the path of the new file. An existing file is never overwritten.
pub fn create_post(blog: &Blog, title: &str, category: Option<&str>) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} does not produce a usable file name", title);
    }

    fs::create_dir_all(&blog.content_dir)?;
    let file_path = blog.content_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold = Scaffold {
        title,
        date: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        category: category.unwrap_or(&blog.config.default_category),
    };
    let content = format!("---\n{}---\n", serde_yaml::to_string(&scaffold)?);

    fs::write(&file_path, content)?;
    tracing::debug!("Wrote scaffold for {:?}", title);

    Ok(file_path)
}

/// Run the new command
pub fn run(blog: &Blog, title: &str, category: Option<&str>) -> Result<()> {
    let path = create_post(blog, title, category)?;
    println!("Created: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::frontmatter::parse_unit;

    #[test]
    fn test_create_post_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "Hello: World", Some("Notes")).unwrap();
        assert_eq!(path, dir.path().join("posts").join("hello-world.md"));

        let raw = fs::read_to_string(&path).unwrap();
        let (meta, body) = parse_unit(&raw, &blog.config.metadata_defaults()).unwrap();
        assert_eq!(meta.title, "Hello: World");
        assert_eq!(meta.category, "Notes");
        assert!(body.is_empty());
    }

    #[test]
    fn test_create_post_default_category() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "Plain", None).unwrap();
        let raw = fs::read_to_string(path).unwrap();
        assert!(raw.contains("category: Uncategorized"));
    }

    #[test]
    fn test_create_post_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        create_post(&blog, "Twice", None).unwrap();
        assert!(create_post(&blog, "Twice", None).is_err());
    }
}
