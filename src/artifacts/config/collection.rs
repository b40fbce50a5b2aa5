use crate::areas::backend::normalize_path;
use crate::artifacts::formats::Format;
use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};

const DEFAULT_SLUG_TEMPLATE: &str = "{{slug}}";
const DEFAULT_WIDGET: &str = "string";

/// A group of entries sharing a field schema and an output format.
///
/// Folder collections treat every file with the collection's extension found
/// directly inside `folder` as an entry. File collections list their files
/// explicitly, each with its own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "deserialize_folder")]
    pub folder: Option<String>,
    #[serde(default)]
    pub files: Vec<CollectionFile>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub format: Option<Format>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default = "default_create")]
    pub create: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionFile {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub file: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_widget")]
    pub widget: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

/// Folders are stored normalized (`./_posts/` -> `_posts`).
fn deserialize_folder<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|folder| normalize_path(&folder).map_err(serde::de::Error::custom))
        .transpose()
}

fn default_create() -> bool {
    true
}

fn default_required() -> bool {
    true
}

fn default_widget() -> String {
    DEFAULT_WIDGET.to_string()
}

impl Field {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Where the entries of a collection live
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollectionKind<'c> {
    Folder(&'c str),
    Files(&'c [CollectionFile]),
}

impl Collection {
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        match (&self.folder, self.files.is_empty()) {
            (Some(_), false) => {
                anyhow::bail!("collection {} sets both `folder` and `files`", self.name)
            }
            (None, true) => {
                anyhow::bail!("collection {} needs a `folder` or `files`", self.name)
            }
            (Some(folder), true) => {
                normalize_path(folder)
                    .with_context(|| format!("invalid folder for collection {}", self.name))?;
            }
            (None, false) => {
                for file in &self.files {
                    normalize_path(&file.file).with_context(|| {
                        format!("invalid file {} for collection {}", file.name, self.name)
                    })?;
                }
            }
        }

        Ok(())
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> CollectionKind<'_> {
        match &self.folder {
            Some(folder) => CollectionKind::Folder(folder),
            None => CollectionKind::Files(&self.files),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }

    /// Extension of entry files, without the dot
    pub fn extension(&self) -> String {
        match (&self.extension, self.format) {
            (Some(extension), _) => extension.trim_start_matches('.').to_string(),
            (None, Some(format)) => format.default_extension().to_string(),
            (None, None) => Format::Frontmatter.default_extension().to_string(),
        }
    }

    /// Format of the file at `path`: the configured one, else inferred from
    /// the file extension.
    pub fn format_for(&self, path: &str) -> Format {
        self.format.unwrap_or_else(|| {
            path.rsplit_once('.')
                .and_then(|(_, extension)| Format::from_extension(extension))
                .unwrap_or(Format::Frontmatter)
        })
    }

    pub fn slug_template(&self) -> &str {
        self.slug.as_deref().unwrap_or(DEFAULT_SLUG_TEMPLATE)
    }

    pub fn file(&self, name: &str) -> anyhow::Result<&CollectionFile> {
        self.files
            .iter()
            .find(|file| file.name == name)
            .with_context(|| format!("collection {} has no file named {name}", self.name))
    }

    /// Repository path of the entry called `slug`
    pub fn entry_path(&self, slug: &str) -> anyhow::Result<String> {
        match self.kind() {
            CollectionKind::Folder(folder) => Ok(normalize_path(&format!(
                "{folder}/{slug}.{}",
                self.extension()
            ))?),
            CollectionKind::Files(_) => Ok(normalize_path(&self.file(slug)?.file)?),
        }
    }

    /// Slug of the entry stored at `path`, when `path` belongs to this folder
    /// collection
    pub fn slug_for_path(&self, path: &str) -> Option<String> {
        let CollectionKind::Folder(folder) = self.kind() else {
            return None;
        };

        let name = match folder {
            "" => path,
            folder => path.strip_prefix(folder)?.strip_prefix('/')?,
        };
        if name.contains('/') {
            return None;
        }

        let suffix = format!(".{}", self.extension());
        name.strip_suffix(suffix.as_str())
            .filter(|slug| !slug.is_empty())
            .map(str::to_string)
    }

    /// Field schema for the entry called `slug`
    pub fn fields_for(&self, slug: &str) -> anyhow::Result<&[Field]> {
        match self.kind() {
            CollectionKind::Folder(_) => Ok(&self.fields),
            CollectionKind::Files(_) => Ok(&self.file(slug)?.fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn posts() -> Collection {
        serde_yaml::from_str(
            "{name: posts, folder: /_posts/, slug: '{{year}}-{{slug}}', fields: [{name: title}]}",
        )
        .unwrap()
    }

    #[test]
    fn test_folder_collection_paths() {
        let collection = posts();

        assert_eq!(collection.extension(), "md");
        assert_eq!(collection.entry_path("hello").unwrap(), "_posts/hello.md");
        assert_eq!(
            collection.slug_for_path("_posts/hello.md"),
            Some("hello".to_string())
        );
        assert_eq!(collection.slug_for_path("_posts/nested/hello.md"), None);
        assert_eq!(collection.slug_for_path("_posts/hello.json"), None);
        assert_eq!(collection.slug_for_path("_postsx/hello.md"), None);
    }

    #[rstest]
    #[case::dot_prefix("./_posts/")]
    #[case::doubled_slashes("_posts//")]
    #[case::dot_segment("/_posts/./")]
    fn test_folder_is_normalized_on_load(#[case] folder: &str) {
        let collection: Collection =
            serde_yaml::from_str(&format!("{{name: posts, folder: '{folder}'}}")).unwrap();

        assert_eq!(collection.kind(), CollectionKind::Folder("_posts"));
        assert_eq!(collection.entry_path("hello").unwrap(), "_posts/hello.md");
        assert_eq!(
            collection.slug_for_path("_posts/hello.md"),
            Some("hello".to_string())
        );
    }

    #[test]
    fn test_folder_outside_repository_is_rejected() {
        let result = serde_yaml::from_str::<Collection>("{name: posts, folder: ../posts}");

        assert!(result.is_err());
    }

    #[test]
    fn test_format_is_inferred_from_extension() {
        let collection = posts();

        assert_eq!(collection.format_for("_posts/a.md"), Format::Frontmatter);
        assert_eq!(collection.format_for("_data/a.json"), Format::Json);
        assert_eq!(collection.format_for("_data/a.yml"), Format::Yaml);
        assert_eq!(collection.format_for("_data/a"), Format::Frontmatter);
    }

    #[test]
    fn test_configured_format_drives_extension() {
        let collection: Collection =
            serde_yaml::from_str("{name: data, folder: _data, format: json}").unwrap();

        assert_eq!(collection.extension(), "json");
        assert_eq!(collection.entry_path("team").unwrap(), "_data/team.json");
    }

    #[test]
    fn test_file_collection_resolves_named_files() {
        let collection: Collection = serde_yaml::from_str(
            r#"
name: settings
files:
  - {name: general, file: _data/settings.json, fields: [{name: site_title, required: false}]}
"#,
        )
        .unwrap();

        assert!(!collection.is_folder());
        assert_eq!(
            collection.entry_path("general").unwrap(),
            "_data/settings.json"
        );
        assert_eq!(collection.fields_for("general").unwrap()[0].name, "site_title");
        assert!(collection.entry_path("missing").is_err());
        assert_eq!(collection.slug_for_path("_data/settings.json"), None);
    }

    #[test]
    fn test_collection_needs_exactly_one_location() {
        let neither: Collection = serde_yaml::from_str("{name: x}").unwrap();
        let both: Collection = serde_yaml::from_str(
            "{name: x, folder: a, files: [{name: f, file: f.json}]}",
        )
        .unwrap();

        assert!(neither.validate().is_err());
        assert!(both.validate().is_err());
    }

    #[test]
    fn test_fields_default_to_required_strings() {
        let collection = posts();
        let field = &collection.fields[0];

        assert!(field.required);
        assert_eq!(field.widget, "string");
        assert_eq!(field.label(), "title");
    }
}
