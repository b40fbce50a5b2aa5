//! Structured document formats
//!
//! Entries are ordered field maps. A format turns such a map into file text
//! and back:
//!
//! - `json`, `yaml`, `toml`: the whole file is the field map
//! - front matter formats: a metadata block followed by a free-form body, which
//!   is exposed as the [`BODY_FIELD`] field
//!
//! Parsing front matter detects the delimiter (`---` YAML, `+++` TOML, a
//! leading `{` JSON object) whatever flavor was configured; the flavor only
//! decides how documents are written.

pub mod front_matter;
pub mod structured;

use crate::artifacts::formats::front_matter::Delimiter;
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Field values of a document, in document order
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Field holding the text after the front matter block
///
/// Front matter formats reserve this name. A metadata key called `body` is
/// overwritten by the document body when one is present, and otherwise
/// becomes the body the next time the entry is written.
pub const BODY_FIELD: &str = "body";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Json,
    #[serde(alias = "yml")]
    Yaml,
    Toml,
    #[serde(alias = "markdown", alias = "md")]
    Frontmatter,
    YamlFrontmatter,
    TomlFrontmatter,
    JsonFrontmatter,
}

static EXTENSION_FORMATS: phf::Map<&'static str, Format> = phf_map! {
    "json" => Format::Json,
    "yml" => Format::Yaml,
    "yaml" => Format::Yaml,
    "toml" => Format::Toml,
    "md" => Format::Frontmatter,
    "markdown" => Format::Frontmatter,
    "html" => Format::Frontmatter,
};

impl Format {
    pub fn from_extension(extension: &str) -> Option<Format> {
        EXTENSION_FORMATS
            .get(extension.to_ascii_lowercase().as_str())
            .copied()
    }

    pub fn default_extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yml",
            Format::Toml => "toml",
            Format::Frontmatter
            | Format::YamlFrontmatter
            | Format::TomlFrontmatter
            | Format::JsonFrontmatter => "md",
        }
    }

    pub fn has_body(&self) -> bool {
        self.delimiter().is_some()
    }

    fn delimiter(&self) -> Option<Delimiter> {
        match self {
            Format::Json | Format::Yaml | Format::Toml => None,
            Format::Frontmatter | Format::YamlFrontmatter => Some(Delimiter::Yaml),
            Format::TomlFrontmatter => Some(Delimiter::Toml),
            Format::JsonFrontmatter => Some(Delimiter::Json),
        }
    }

    pub fn parse(&self, text: &str) -> anyhow::Result<Fields> {
        match self {
            Format::Json => structured::parse_json(text),
            Format::Yaml => structured::parse_yaml(text),
            Format::Toml => structured::parse_toml(text),
            _ => front_matter::parse(text),
        }
    }

    pub fn serialize(&self, fields: &Fields) -> anyhow::Result<String> {
        match (self, self.delimiter()) {
            (_, Some(delimiter)) => front_matter::serialize(delimiter, fields),
            (Format::Json, None) => structured::to_json(fields),
            (Format::Yaml, None) => structured::to_yaml(fields),
            (_, None) => structured::to_toml(fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn sample() -> Fields {
        json!({
            "title": "Hello, world",
            "date": "2024-05-01",
            "draft": false,
            "weight": 3,
            "tags": ["intro", "news"],
            "author": {"name": "Ada", "email": "ada@example.com"}
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn published() -> Fields {
        json!({"title": "Hi", "published": "2024-01-02T03:04:05Z"})
            .as_object()
            .unwrap()
            .clone()
    }

    fn with_body(mut fields: Fields) -> Fields {
        fields.insert(BODY_FIELD.to_string(), json!("# Hello\n\nFirst post.\n"));
        fields
    }

    #[rstest]
    #[case::json(Format::Json, sample())]
    #[case::yaml(Format::Yaml, sample())]
    #[case::toml(Format::Toml, sample())]
    #[case::frontmatter(Format::Frontmatter, with_body(sample()))]
    #[case::yaml_frontmatter(Format::YamlFrontmatter, with_body(sample()))]
    #[case::toml_frontmatter(Format::TomlFrontmatter, with_body(sample()))]
    #[case::json_frontmatter(Format::JsonFrontmatter, with_body(sample()))]
    #[case::toml_offset_datetime(Format::TomlFrontmatter, with_body(published()))]
    #[case::yaml_offset_datetime(Format::YamlFrontmatter, with_body(published()))]
    fn test_serialize_then_parse_recovers_fields(#[case] format: Format, #[case] fields: Fields) {
        let text = format.serialize(&fields).unwrap();
        let parsed = format.parse(&text).unwrap();

        assert_eq!(
            serde_json::Value::Object(parsed),
            serde_json::Value::Object(fields)
        );
    }

    #[rstest]
    #[case("json", Some(Format::Json))]
    #[case("YML", Some(Format::Yaml))]
    #[case("markdown", Some(Format::Frontmatter))]
    #[case("png", None)]
    fn test_format_from_extension(#[case] extension: &str, #[case] expected: Option<Format>) {
        assert_eq!(Format::from_extension(extension), expected);
    }

    #[test]
    fn test_format_names_accept_aliases() {
        let formats: Vec<Format> =
            serde_yaml::from_str("[yml, markdown, toml-frontmatter, json-frontmatter]").unwrap();

        assert_eq!(
            formats,
            vec![
                Format::Yaml,
                Format::Frontmatter,
                Format::TomlFrontmatter,
                Format::JsonFrontmatter
            ]
        );
    }

    #[test]
    fn test_yaml_frontmatter_layout() {
        let mut fields = Fields::new();
        fields.insert("title".to_string(), json!("Hello"));
        fields.insert(BODY_FIELD.to_string(), json!("Body text\n"));

        assert_eq!(
            Format::Frontmatter.serialize(&fields).unwrap(),
            "---\ntitle: Hello\n---\nBody text\n"
        );
    }
}
