//! List helper functions for category filters and archives

use super::date::format_date;
use super::html::html_escape;
use super::url::{blog_url, post_url};
use crate::config::SiteConfig;
use crate::content::PostIndex;

/// Generate the category filter list as HTML
///
/// Categories keep the index's first-appearance order. An "All" entry
/// leads the list; the active entry gets an `active` class.
pub fn list_categories(
    config: &SiteConfig,
    index: &PostIndex,
    active: Option<&str>,
    show_count: bool,
) -> String {
    if index.is_empty() {
        return String::new();
    }

    let class = "category-list";
    let mut html = format!(r#"<ul class="{}">"#, class);

    let item = |name: &str, url: &str, count: usize, is_active: bool| {
        let mut li = format!(
            r#"<li class="{}-item{}"><a class="{}-link" href="{}">{}</a>"#,
            class,
            if is_active { " active" } else { "" },
            class,
            html_escape(url),
            html_escape(name)
        );
        if show_count {
            li.push_str(&format!(r#"<span class="{}-count">{}</span>"#, class, count));
        }
        li.push_str("</li>");
        li
    };

    html.push_str(&item("All", &blog_url(config, None, 1), index.len(), active.is_none()));

    for (name, count) in index.categories() {
        let url = blog_url(config, Some(name), 1);
        html.push_str(&item(name, &url, count, active == Some(name)));
    }

    html.push_str("</ul>");
    html
}

/// Generate the archive as HTML, one section per year
pub fn list_archives(config: &SiteConfig, index: &PostIndex) -> String {
    let mut html = String::from(r#"<div class="archive">"#);

    for group in index.archive() {
        html.push_str(&format!(
            r#"<section class="archive-year"><h2>{}<span class="archive-count">{}</span></h2><ul>"#,
            group.year,
            group.posts.len()
        ));
        for post in group.posts {
            html.push_str(&format!(
                r#"<li><span class="archive-date">{}</span><a href="{}">{}</a></li>"#,
                format_date(&post.meta.date, "MMM DD"),
                html_escape(&post_url(config, &post.slug)),
                html_escape(&post.meta.title)
            ));
        }
        html.push_str("</ul></section>");
    }

    html.push_str("</div>");
    html
}
