//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use super::error::FrontMatterError;
use super::post::{word_count, PostMetadata};

/// Words per minute used when estimating reading time
const WORDS_PER_MINUTE: usize = 200;

/// Custom deserializer that accepts any scalar and keeps its text
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct ScalarString;

    impl<'de> Visitor<'de> for ScalarString {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ScalarString)
}

/// Raw front-matter block of a post, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(rename = "readTime", alias = "read_time", deserialize_with = "scalar_string")]
    pub read_time: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub category: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

/// Defaults applied to optional fields
#[derive(Debug, Clone)]
pub struct MetadataDefaults {
    pub category: String,
    pub read_time: String,
    /// Estimate "N min read" from the body instead of using `read_time`
    pub estimate_read_time: bool,
}

impl Default for MetadataDefaults {
    fn default() -> Self {
        Self {
            category: "Uncategorized".to_string(),
            read_time: "reading time unknown".to_string(),
            estimate_read_time: false,
        }
    }
}

impl FrontMatter {
    /// Split content into the front-matter block and the body
    ///
    /// Leading whitespace is ignored. Anything else before the opening `---`
    /// line is an error, as is a block without a closing `---` line.
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let (yaml, body) = split(content)?;

        let fm = if yaml.trim().is_empty() {
            FrontMatter::default()
        } else {
            serde_yaml::from_str::<FrontMatter>(yaml)?
        };

        let body = body.trim_start_matches(['\n', '\r']).trim_end();
        Ok((fm, body))
    }

    /// Validate required fields and fill in defaults
    pub fn into_metadata(
        self,
        body: &str,
        defaults: &MetadataDefaults,
    ) -> Result<PostMetadata, FrontMatterError> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(FrontMatterError::MissingField("title"))?;

        let raw_date = self
            .date
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .ok_or(FrontMatterError::MissingField("date"))?;
        let date = parse_date_string(&raw_date).ok_or(FrontMatterError::InvalidDate(raw_date))?;

        let read_time = match self.read_time.map(|r| r.trim().to_string()) {
            Some(r) if !r.is_empty() => r,
            _ if defaults.estimate_read_time => estimate_read_time(body),
            _ => defaults.read_time.clone(),
        };

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| defaults.category.clone());

        Ok(PostMetadata {
            title,
            date,
            read_time,
            category,
            extra: self.extra,
        })
    }
}

/// Parse a raw unit into validated metadata and its body
pub fn parse_unit(
    content: &str,
    defaults: &MetadataDefaults,
) -> Result<(PostMetadata, String), FrontMatterError> {
    let (fm, body) = FrontMatter::parse(content)?;
    let meta = fm.into_metadata(body, defaults)?;
    Ok((meta, body.to_string()))
}

/// Locate the `---` delimited block; returns (yaml, rest)
fn split(content: &str) -> Result<(&str, &str), FrontMatterError> {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    let rest = content
        .strip_prefix("---")
        .ok_or(FrontMatterError::MissingFrontMatter)?;
    let (opening, rest) = rest.split_once('\n').unwrap_or((rest, ""));
    if !opening.trim().is_empty() {
        return Err(FrontMatterError::MissingFrontMatter);
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Ok((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err(FrontMatterError::UnterminatedFrontMatter)
}

/// "N min read" at a fixed reading speed, never less than one minute
pub fn estimate_read_time(body: &str) -> String {
    let minutes = word_count(body).div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{} min read", minutes)
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    // Offsets are normalized to UTC so posts stay comparable
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> MetadataDefaults {
        MetadataDefaults::default()
    }

    #[test]
    fn test_parse_full_unit() {
        let content = r#"---
title: T
date: 2025-01-01
readTime: 5 min read
category: X
---
Hello
"#;

        let (meta, body) = parse_unit(content, &defaults()).unwrap();
        assert_eq!(meta.title, "T");
        assert_eq!(
            meta.date,
            NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(meta.read_time, "5 min read");
        assert_eq!(meta.category, "X");
        assert_eq!(body, "Hello");
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let content = "---\ntitle: Only Required\ndate: 2024-06-01\n---\n\nBody text.\n";
        let (meta, body) = parse_unit(content, &defaults()).unwrap();
        assert_eq!(meta.read_time, "reading time unknown");
        assert_eq!(meta.category, "Uncategorized");
        assert_eq!(body, "Body text.");
    }

    #[test]
    fn test_estimated_read_time() {
        let words = vec!["word"; 450].join(" ");
        let content = format!("---\ntitle: Long\ndate: 2024-06-01\n---\n{}", words);
        let defaults = MetadataDefaults {
            estimate_read_time: true,
            ..MetadataDefaults::default()
        };
        let (meta, _) = parse_unit(&content, &defaults).unwrap();
        assert_eq!(meta.read_time, "3 min read");
        assert_eq!(estimate_read_time(""), "1 min read");
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let content = "---\ndate: 2024-06-01\ncategory: X\n---\nBody";
        let err = parse_unit(content, &defaults()).unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingField("title")));

        let blank = "---\ntitle: \"  \"\ndate: 2024-06-01\n---\nBody";
        let err = parse_unit(blank, &defaults()).unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingField("title")));
    }

    #[test]
    fn test_missing_and_invalid_date() {
        let missing = "---\ntitle: No Date\n---\nBody";
        assert!(matches!(
            parse_unit(missing, &defaults()).unwrap_err(),
            FrontMatterError::MissingField("date")
        ));

        let invalid = "---\ntitle: Bad Date\ndate: last tuesday\n---\nBody";
        match parse_unit(invalid, &defaults()).unwrap_err() {
            FrontMatterError::InvalidDate(d) => assert_eq!(d, "last tuesday"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_and_unterminated_block() {
        let no_block = "# Just markdown\n\ntitle: nope";
        assert!(matches!(
            FrontMatter::parse(no_block).unwrap_err(),
            FrontMatterError::MissingFrontMatter
        ));

        let text_before = "intro\n---\ntitle: T\ndate: 2024-01-01\n---\nBody";
        assert!(matches!(
            FrontMatter::parse(text_before).unwrap_err(),
            FrontMatterError::MissingFrontMatter
        ));

        let unterminated = "---\ntitle: T\ndate: 2024-01-01\nBody";
        assert!(matches!(
            FrontMatter::parse(unterminated).unwrap_err(),
            FrontMatterError::UnterminatedFrontMatter
        ));
    }

    #[test]
    fn test_leading_whitespace_and_crlf() {
        let content = "\u{feff}\n\n---\r\ntitle: Windows\r\ndate: 2024-02-03\r\n---\r\n\r\nBody\r\n";
        let (meta, body) = parse_unit(content, &defaults()).unwrap();
        assert_eq!(meta.title, "Windows");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_body_keeps_horizontal_rules() {
        let content = "---\ntitle: Rules\ndate: 2024-02-03\n---\nAbove\n\n---\n\nBelow";
        let (_, body) = parse_unit(content, &defaults()).unwrap();
        assert_eq!(body, "Above\n\n---\n\nBelow");
    }

    #[test]
    fn test_scalar_values_and_extra_fields() {
        let content = "---\ntitle: 1984\ndate: 2024-02-03\nreadTime: 7\nauthor: Jo\n---\nBody";
        let (meta, _) = parse_unit(content, &defaults()).unwrap();
        assert_eq!(meta.title, "1984");
        assert_eq!(meta.read_time, "7");
        assert_eq!(
            meta.extra.get("author"),
            Some(&serde_yaml::Value::String("Jo".to_string()))
        );
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parse_date_string("2024-01-15 10:30:00"), Some(expected));
        assert_eq!(parse_date_string("2024/01/15 10:30"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15T10:30:00"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15T12:30:00+02:00"), Some(expected));
        assert_eq!(
            parse_date_string("2024/01/15"),
            expected.date().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_date_string("2024-13-01"), None);
        assert_eq!(parse_date_string("soon"), None);
    }
}
