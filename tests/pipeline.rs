use std::fs;
use std::path::Path;

use inkwell::config::SiteConfig;
use inkwell::content::{FsContentStore, MarkdownRenderer, PostLibrary};
use inkwell::Blog;

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn unit(title: &str, date: &str, category: &str) -> String {
    format!(
        "---\ntitle: {}\ndate: {}\nreadTime: 3 min read\ncategory: {}\n---\nBody of {}.\n",
        title, date, category, title
    )
}

fn site() -> (tempfile::TempDir, Blog) {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts");

    write(&posts, "consensus.md", &unit("Consensus", "2024-09-10", "Distributed"));
    write(&posts, "clocks.md", &unit("Clocks", "2025-01-15", "Distributed"));
    write(&posts, "paging.md", &unit("Paging", "2024-09-10", "Memory"));
    write(&posts, "nested/io-uring.md", &unit("io_uring", "2023-12-01", "IO"));
    write(&posts, "untitled.md", "---\ndate: 2024-01-01\n---\nno title here");
    write(&posts, "notes.txt", "not content");
    write(&posts, "_drafts/wip.md", &unit("WIP", "2026-01-01", "Drafts"));

    let blog = Blog::new(dir.path()).unwrap();
    (dir, blog)
}

#[test]
fn library_holds_every_parsed_unit_newest_first() {
    let (_dir, blog) = site();
    let library = blog.library();
    let posts = library.get_all().unwrap();

    let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
    // consensus and paging share a date; discovery order breaks the tie
    assert_eq!(slugs, ["clocks", "consensus", "paging", "io-uring"]);
    assert!(posts.windows(2).all(|w| w[0].meta.date >= w[1].meta.date));
}

#[test]
fn unit_without_title_appears_nowhere() {
    let (_dir, blog) = site();
    let library = blog.library();

    assert!(library.get_by_slug("untitled").unwrap().is_none());
    assert!(library
        .get_all()
        .unwrap()
        .iter()
        .all(|p| p.slug != "untitled"));

    let (_, report) = library.check().unwrap();
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].source, "untitled.md");
}

#[test]
fn lookups_and_category_filters() {
    let (_dir, blog) = site();
    let library = blog.library();

    let post = library.get_by_slug("clocks").unwrap().unwrap();
    assert_eq!(post.meta.title, "Clocks");
    assert_eq!(post.meta.read_time, "3 min read");
    assert_eq!(post.meta.category, "Distributed");
    assert_eq!(post.body, "Body of Clocks.");

    assert!(library.get_by_slug("missing").unwrap().is_none());

    let distributed: Vec<_> = library
        .get_by_category("Distributed")
        .unwrap()
        .into_iter()
        .map(|p| p.slug)
        .collect();
    assert_eq!(distributed, ["clocks", "consensus"]);
    assert!(library.get_by_category("distributed").unwrap().is_empty());

    let categories = library.list_categories().unwrap();
    let total: usize = categories.iter().map(|(_, n)| n).sum();
    assert_eq!(total, library.get_all().unwrap().len());
    assert_eq!(categories[0], ("Distributed".to_string(), 2));
}

#[test]
fn rebuilding_gives_identical_index() {
    let (_dir, blog) = site();
    let first = blog.library().snapshot().unwrap();
    let second = blog.library().snapshot().unwrap();
    assert_eq!(first.posts(), second.posts());
}

#[test]
fn reload_picks_up_new_content() {
    let (dir, blog) = site();
    let library = blog.library();
    let before = library.snapshot().unwrap();

    write(
        &dir.path().join("posts"),
        "fresh.md",
        &unit("Fresh", "2025-06-01", "Memory"),
    );
    let after = library.reload().unwrap();

    assert_eq!(before.len(), 4);
    assert_eq!(after.len(), 5);
    assert_eq!(library.get_all().unwrap()[0].slug, "fresh");
}

#[test]
fn missing_content_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let library = PostLibrary::new(
        FsContentStore::new(dir.path().join("posts")),
        SiteConfig::default().metadata_defaults(),
    );
    assert!(library.get_all().is_err());
}

#[test]
fn renders_post_bodies() {
    let renderer = MarkdownRenderer::new();

    let html = renderer.render("## Heading\n\nSome *text*").html;
    assert!(html.contains("Heading</h2>"));
    assert!(html.contains("<p>Some <em>text</em></p>"));

    let html = renderer
        .render("Use `let` here.\n\n```rust\nlet x = 1;\n```\n")
        .html;
    assert!(html.contains(r#"<code class="inline-code">let</code>"#));
    assert!(html.contains(r#"<figure class="highlight rust">"#));
}
