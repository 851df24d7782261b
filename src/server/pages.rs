//! Page shell - minimal HTML around the pipeline's output

use crate::config::SiteConfig;
use crate::content::{HeadingEntry, Page, Post, PostIndex, RenderedPost};
use crate::helpers::{
    blog_url, html_escape, link_to, list_archives, list_categories, post_url, time_tag, truncate,
    url_for,
};

/// Longest excerpt shown in listings, in characters
const EXCERPT_LENGTH: usize = 280;

/// Wrap page content in the site layout
pub fn layout(config: &SiteConfig, title: &str, content: &str) -> String {
    let full_title = if title.is_empty() {
        config.title.clone()
    } else {
        format!("{} | {}", title, config.title)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<header class="site-header"><a class="site-title" href="{home}">{site}</a>
<nav>{home_link} {blog_link} {archive_link}</nav>
</header>
<main>
{content}
</main>
</body>
</html>
"#,
        title = html_escape(&full_title),
        site = html_escape(&config.title),
        home = url_for(config, "/"),
        home_link = link_to(config, "/", "Home"),
        blog_link = link_to(config, "blog", "Blog"),
        archive_link = link_to(config, "archive", "Archive"),
        content = content,
    )
}

/// Shown when there are no posts, including when content failed to load
fn empty_state() -> String {
    r#"<p class="empty-state">No posts yet.</p>"#.to_string()
}

/// One entry of a post listing
fn post_summary(config: &SiteConfig, post: &Post) -> String {
    format!(
        r#"<article class="post-summary"><h2><a href="{url}">{title}</a></h2><div class="post-meta">{date} · {read_time} · <a href="{category_url}">{category}</a></div><p class="post-excerpt">{excerpt}</p></article>"#,
        url = html_escape(&post_url(config, &post.slug)),
        title = html_escape(post.title()),
        date = time_tag(&post.meta.date, &config.date_format),
        read_time = html_escape(&post.meta.read_time),
        category_url = html_escape(&blog_url(config, Some(post.category()), 1)),
        category = html_escape(post.category()),
        excerpt = html_escape(&truncate(post.excerpt(), EXCERPT_LENGTH, None)),
    )
}

fn post_list<'a>(config: &SiteConfig, posts: impl IntoIterator<Item = &'a Post>) -> String {
    let items: String = posts
        .into_iter()
        .map(|post| post_summary(config, post))
        .collect();
    if items.is_empty() {
        empty_state()
    } else {
        format!(r#"<div class="post-list">{}</div>"#, items)
    }
}

/// Home page: latest posts plus the category filter
pub fn home_page(config: &SiteConfig, index: &PostIndex) -> String {
    let latest = index.posts().iter().take(config.home_posts);

    let mut content = String::new();
    if !config.description.is_empty() {
        content.push_str(&format!(
            r#"<p class="site-description">{}</p>"#,
            html_escape(&config.description)
        ));
    }
    content.push_str(&list_categories(config, index, None, true));
    content.push_str(&post_list(config, latest));
    if index.len() > config.home_posts {
        content.push_str(&format!(
            r#"<p class="more-posts"><a href="{}">All posts</a></p>"#,
            html_escape(&blog_url(config, None, 1))
        ));
    }

    layout(config, "", &content)
}

/// Blog list page, filtered and paginated
pub fn list_page(
    config: &SiteConfig,
    index: &PostIndex,
    category: Option<&str>,
    page: &Page<'_, &Post>,
) -> String {
    let mut content = list_categories(config, index, category, true);
    content.push_str(&post_list(config, page.items.iter().copied()));
    content.push_str(&pager(config, category, page));

    let title = category.unwrap_or("Blog");
    layout(config, title, &content)
}

fn pager(config: &SiteConfig, category: Option<&str>, page: &Page<'_, &Post>) -> String {
    if page.total_pages <= 1 {
        return String::new();
    }

    let mut html = String::from(r#"<nav class="pager">"#);
    if let Some(prev) = page.prev() {
        html.push_str(&format!(
            r#"<a class="pager-prev" href="{}">Newer</a>"#,
            html_escape(&blog_url(config, category, prev))
        ));
    }
    html.push_str(&format!(
        r#"<span class="pager-current">{} / {}</span>"#,
        page.number, page.total_pages
    ));
    if let Some(next) = page.next() {
        html.push_str(&format!(
            r#"<a class="pager-next" href="{}">Older</a>"#,
            html_escape(&blog_url(config, category, next))
        ));
    }
    html.push_str("</nav>");
    html
}

/// Archive page: posts grouped by year
pub fn archive_page(config: &SiteConfig, index: &PostIndex) -> String {
    let content = if index.is_empty() {
        empty_state()
    } else {
        list_archives(config, index)
    };
    layout(config, "Archive", &content)
}

/// Single post page
pub fn post_page(
    config: &SiteConfig,
    post: &Post,
    rendered: &RenderedPost,
    neighbours: (Option<&Post>, Option<&Post>),
) -> String {
    let mut content = format!(
        r#"<article class="post"><header><h1 class="post-title">{title}</h1><div class="post-meta">{date} · {read_time} · <a href="{category_url}">{category}</a></div></header>"#,
        title = html_escape(post.title()),
        date = time_tag(&post.meta.date, &config.date_format),
        read_time = html_escape(&post.meta.read_time),
        category_url = html_escape(&blog_url(config, Some(post.category()), 1)),
        category = html_escape(post.category()),
    );

    if rendered.headings.len() > 1 {
        content.push_str(&toc(&rendered.headings));
    }
    content.push_str(r#"<div class="post-content">"#);
    content.push_str(&rendered.html);
    content.push_str("</div>");

    let (newer, older) = neighbours;
    if newer.is_some() || older.is_some() {
        content.push_str(r#"<nav class="post-nav">"#);
        if let Some(p) = newer {
            content.push_str(&format!(
                r#"<a class="post-nav-newer" href="{}">{}</a>"#,
                html_escape(&post_url(config, &p.slug)),
                html_escape(p.title())
            ));
        }
        if let Some(p) = older {
            content.push_str(&format!(
                r#"<a class="post-nav-older" href="{}">{}</a>"#,
                html_escape(&post_url(config, &p.slug)),
                html_escape(p.title())
            ));
        }
        content.push_str("</nav>");
    }
    content.push_str("</article>");

    layout(config, post.title(), &content)
}

/// Table of contents from the rendered headings
fn toc(headings: &[HeadingEntry]) -> String {
    let items: String = headings
        .iter()
        .map(|h| {
            format!(
                r##"<li class="toc-level-{}"><a href="#{}">{}</a></li>"##,
                h.level,
                html_escape(&h.id),
                html_escape(&h.text)
            )
        })
        .collect();
    format!(r#"<nav class="toc"><ol>{}</ol></nav>"#, items)
}

/// Not-found page
pub fn not_found_page(config: &SiteConfig) -> String {
    let content = format!(
        r#"<h1>Not found</h1><p>The page you are looking for does not exist. <a href="{}">Back to the blog</a></p>"#,
        html_escape(&blog_url(config, None, 1))
    );
    layout(config, "Not found", &content)
}
