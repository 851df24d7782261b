//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters left as-is in query values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/archive/") // -> "/blog/archive/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// URL of a single post page
pub fn post_url(config: &SiteConfig, slug: &str) -> String {
    url_for(config, &format!("posts/{}/", encode_component(slug)))
}

/// URL of the blog list, optionally filtered and paginated
///
/// Page 1 and "no category" are left out of the query string.
pub fn blog_url(config: &SiteConfig, category: Option<&str>, page: usize) -> String {
    let mut query = Vec::new();
    if let Some(category) = category {
        query.push(format!("category={}", encode_component(category)));
    }
    if page > 1 {
        query.push(format!("page={}", page));
    }

    let base = url_for(config, "blog");
    if query.is_empty() {
        base
    } else {
        format!("{}?{}", base, query.join("&"))
    }
}

/// Percent-encode a path segment or query value
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}
