//! Date helper functions

use chrono::NaiveDateTime;

/// Format a date using a Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date(date: &NaiveDateTime, format: &str) -> String {
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Generate a <time> HTML element
pub fn time_tag(date: &NaiveDateTime, format: &str) -> String {
    let datetime = date.format("%Y-%m-%dT%H:%M:%S").to_string();
    format!(
        r#"<time datetime="{}">{}</time>"#,
        datetime,
        format_date(date, format)
    )
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest patterns first within each unit
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(&date(), "YYYY-MM-DD"), "2024-01-15");
        assert_eq!(format_date(&date(), "MMM DD, YYYY"), "Jan 15, 2024");
    }

    #[test]
    fn test_time_tag() {
        assert_eq!(
            time_tag(&date(), "YYYY/MM/DD"),
            r#"<time datetime="2024-01-15T10:30:00">2024/01/15</time>"#
        );
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
    }
}
