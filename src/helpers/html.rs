//! HTML helper functions

use super::url::url_for;
use crate::config::SiteConfig;
use crate::content::LinkKind;

/// Generate an anchor tag
///
/// Absolute URLs are kept as-is and open in a new tab; other paths are
/// resolved against the site root.
///
/// # Examples
/// ```ignore
/// link_to(&config, "/archive/", "Archive") // -> <a href="/archive/">Archive</a>
/// ```
pub fn link_to(config: &SiteConfig, path: &str, text: &str) -> String {
    match LinkKind::of(path) {
        LinkKind::External => format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            html_escape(path),
            html_escape(text)
        ),
        LinkKind::Internal => format!(
            r#"<a href="{}">{}</a>"#,
            html_escape(&url_for(config, path)),
            html_escape(text)
        ),
    }
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Truncate a string to a specified length
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.chars().count()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_to() {
        let config = SiteConfig::default();
        assert_eq!(
            link_to(&config, "/archive/", "Archive"),
            r#"<a href="/archive/">Archive</a>"#
        );
        assert!(link_to(&config, "https://example.com", "Ex").contains("_blank"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 8, None), "Hello...");
        assert_eq!(truncate("Hi", 10, None), "Hi");
    }
}
