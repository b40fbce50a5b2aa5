//! Slugs
//!
//! A slug template such as `{{year}}-{{month}}-{{day}}-{{slug}}` is rendered
//! against the entry's fields and the current time:
//!
//! - `{{year}}`, `{{month}}`, `{{day}}`, `{{hour}}`, `{{minute}}`, `{{second}}`:
//!   zero-padded date parts
//! - `{{slug}}`: the slugified entry title
//! - `{{<field>}}`: the slugified value of any other field

use crate::artifacts::formats::Fields;
use chrono::{DateTime, Datelike, TimeZone, Timelike};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid slug regex"));
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([\w-]+)\s*\}\}").expect("valid placeholder regex"));

/// Lowercase `text`, collapsing every run of non-alphanumerics into `-`
pub fn slugify(text: &str) -> String {
    NON_SLUG_CHARS
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Render `template` for an entry called `title` with field values `fields`
pub fn render<Tz: TimeZone>(
    template: &str,
    title: &str,
    fields: &Fields,
    now: &DateTime<Tz>,
) -> anyhow::Result<String> {
    let mut missing = Vec::new();

    let rendered = PLACEHOLDER.replace_all(template, |captures: &regex::Captures| {
        let name = &captures[1];
        match name {
            "year" => format!("{:04}", now.year()),
            "month" => format!("{:02}", now.month()),
            "day" => format!("{:02}", now.day()),
            "hour" => format!("{:02}", now.hour()),
            "minute" => format!("{:02}", now.minute()),
            "second" => format!("{:02}", now.second()),
            "slug" => slugify(title),
            field => match fields.get(field) {
                Some(Value::String(value)) => slugify(value),
                Some(Value::Number(value)) => value.to_string(),
                Some(Value::Bool(value)) => value.to_string(),
                _ => {
                    missing.push(field.to_string());
                    String::new()
                }
            },
        }
    });

    if !missing.is_empty() {
        anyhow::bail!(
            "slug template {template} references fields without a value: {}",
            missing.join(", ")
        );
    }

    let slug = rendered.trim_matches('-').to_string();
    if slug.contains('/') {
        anyhow::bail!("slug template {template} must not produce nested paths");
    }
    if slug.is_empty() {
        anyhow::bail!("slug template {template} rendered an empty slug");
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use proptest::proptest;
    use serde_json::json;

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 12, 5, 9).unwrap()
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Déjà vu -- again  "), "déjà-vu-again");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_date_placeholders_are_zero_padded() {
        let slug = render(
            "{{year}}-{{month}}-{{day}}-{{ hour }}{{minute}}{{second}}-{{slug}}",
            "First Post",
            &Fields::new(),
            &at_noon(),
        )
        .unwrap();

        assert_eq!(slug, "2024-03-07-120509-first-post");
    }

    #[test]
    fn test_field_placeholders_use_field_values() {
        let fields = json!({"category": "Release Notes", "version": 2})
            .as_object()
            .unwrap()
            .clone();
        let slug = render("{{category}}-{{version}}-{{slug}}", "Hi", &fields, &at_noon());

        assert_eq!(slug.unwrap(), "release-notes-2-hi");
    }

    #[test]
    fn test_nested_slugs_are_rejected() {
        let result = render("{{year}}/{{slug}}", "Hi", &Fields::new(), &at_noon());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_field_is_reported() {
        let result = render("{{author}}-{{slug}}", "Hi", &Fields::new(), &at_noon());
        assert!(result.unwrap_err().to_string().contains("author"));
    }

    #[test]
    fn test_empty_slug_is_rejected() {
        assert!(render("{{slug}}", "!!!", &Fields::new(), &at_noon()).is_err());
    }

    proptest! {
        #[test]
        fn test_slugify_output_is_url_safe(text in ".{0,40}") {
            let slug = slugify(&text);
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert!(!slug.contains("--"));
            assert!(slug.chars().all(|c| c == '-' || c.is_alphanumeric()));
        }
    }
}
