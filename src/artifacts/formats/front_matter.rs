//! Front matter documents
//!
//! ```text
//! ---                +++                {
//! title: Hello       title = "Hello"      "title": "Hello"
//! ---                +++                }
//! Body text          Body text          Body text
//! ```
//!
//! The body is everything after the line closing the metadata block. An empty
//! body is not reported as a field, so documents without one round-trip
//! unchanged.
//!
//! The body shares the field map with the metadata under [`BODY_FIELD`]. A
//! metadata key named `body` is replaced by a non-empty body, and is itself
//! written out as the body when the document is serialized again.

use crate::artifacts::formats::{BODY_FIELD, Fields, structured};
use serde_json::Value;

const YAML_FENCE: &str = "---";
const TOML_FENCE: &str = "+++";
const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Yaml,
    Toml,
    Json,
}

impl Delimiter {
    fn parse_meta(&self, meta: &str) -> anyhow::Result<Fields> {
        match self {
            Delimiter::Yaml => structured::parse_yaml(meta),
            Delimiter::Toml => structured::parse_toml(meta),
            Delimiter::Json => structured::parse_json(meta),
        }
    }
}

/// Split `text` into its delimiter, metadata block and body.
pub fn split(text: &str) -> anyhow::Result<Option<(Delimiter, &str, &str)>> {
    let text = text.trim_start_matches(BYTE_ORDER_MARK);

    for (delimiter, fence) in [(Delimiter::Yaml, YAML_FENCE), (Delimiter::Toml, TOML_FENCE)] {
        let Some(rest) = strip_line(text, fence) else {
            continue;
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end_matches(['\r', '\n']) == fence {
                return Ok(Some((delimiter, &rest[..offset], &rest[offset + line.len()..])));
            }
            offset += line.len();
        }
        anyhow::bail!("front matter opened with {fence} is never closed");
    }

    if text.starts_with('{') {
        let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
        if let Some(Ok(Value::Object(_))) = stream.next() {
            let end = stream.byte_offset();
            let rest = &text[end..];
            let body = rest
                .strip_prefix("\r\n")
                .or_else(|| rest.strip_prefix('\n'))
                .unwrap_or(rest);
            return Ok(Some((Delimiter::Json, &text[..end], body)));
        }
    }

    Ok(None)
}

/// `text` without its first line, when that line is exactly `fence`
fn strip_line<'t>(text: &'t str, fence: &str) -> Option<&'t str> {
    let rest = text.strip_prefix(fence)?;
    rest.strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
}

pub fn parse(text: &str) -> anyhow::Result<Fields> {
    let (mut fields, body) = match split(text)? {
        Some((delimiter, meta, body)) => (delimiter.parse_meta(meta)?, body),
        None => (Fields::new(), text),
    };

    if !body.is_empty() {
        fields.insert(BODY_FIELD.to_string(), Value::String(body.to_string()));
    }

    Ok(fields)
}

pub fn serialize(delimiter: Delimiter, fields: &Fields) -> anyhow::Result<String> {
    let mut meta = fields.clone();
    let body = match meta.shift_remove(BODY_FIELD) {
        Some(Value::String(body)) => body,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let document = match delimiter {
        Delimiter::Yaml => format!(
            "{YAML_FENCE}\n{}{YAML_FENCE}\n{body}",
            structured::to_yaml(&meta)?
        ),
        Delimiter::Toml => format!(
            "{TOML_FENCE}\n{}{TOML_FENCE}\n{body}",
            structured::to_toml(&meta)?
        ),
        Delimiter::Json => format!("{}\n{body}", serde_json::to_string_pretty(&meta)?),
    };

    Ok(document)
}
