//! CMS configuration
//!
//! The configuration is a YAML document naming the backend, the media folder
//! and the collections users can edit:
//!
//! ```yaml
//! backend:
//!   name: github
//!   repo: owner/site
//!   branch: main
//! media_folder: static/uploads
//! collections:
//!   - name: posts
//!     folder: _posts
//!     fields: [{name: title, widget: string}]
//! ```
//!
//! Relative `seed_dir` and `cache_dir` paths are resolved against the
//! directory holding the configuration file.

pub mod collection;

use crate::areas::backend::http::{GITHUB_API_ROOT, LOCAL_API_ROOT};
use crate::areas::backend::normalize_path;
pub use crate::artifacts::config::collection::{Collection, CollectionFile, CollectionKind, Field};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.yml";
const DEFAULT_BRANCH: &str = "master";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    Github,
    #[serde(alias = "git-gateway")]
    Local,
    TestRepo,
}

impl BackendKind {
    pub fn as_str(&self) -> &str {
        match self {
            BackendKind::Github => "github",
            BackendKind::Local => "local",
            BackendKind::TestRepo => "test-repo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub name: BackendKind,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub api_root: Option<String>,
    #[serde(default)]
    pub seed_dir: Option<PathBuf>,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl BackendConfig {
    pub fn api_root(&self) -> String {
        match (&self.api_root, self.name) {
            (Some(api_root), _) => api_root.clone(),
            (None, BackendKind::Local) => LOCAL_API_ROOT.to_string(),
            (None, _) => GITHUB_API_ROOT.to_string(),
        }
    }

    /// Identifies the repository a stored credential belongs to
    pub fn credential_key(&self) -> String {
        match &self.repo {
            Some(repo) => format!("{}:{}", self.name.as_str(), repo),
            None => format!("{}:{}", self.name.as_str(), self.api_root()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub media_folder: Option<String>,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl Config {
    pub fn parse(document: &str) -> anyhow::Result<Self> {
        let config =
            serde_yaml::from_str::<Config>(document).context("Invalid configuration document")?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let document = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read configuration {}", path.display()))?;
        let mut config = Self::parse(&document)
            .with_context(|| format!("Unable to load configuration {}", path.display()))?;

        let base = path.parent().unwrap_or(Path::new("."));
        config.backend.seed_dir = config.backend.seed_dir.map(|dir| base.join(dir));
        config.cache_dir = config.cache_dir.map(|dir| base.join(dir));

        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.backend.name == BackendKind::Github && self.backend.repo.is_none() {
            anyhow::bail!("the github backend requires `backend.repo` (owner/name)");
        }
        if let Some(media_folder) = &self.media_folder {
            normalize_path(media_folder)
                .with_context(|| format!("invalid media folder {media_folder}"))?;
        }

        let mut names = HashSet::new();
        for collection in &self.collections {
            if !names.insert(collection.name.as_str()) {
                anyhow::bail!("duplicate collection name {}", collection.name);
            }
            collection.validate()?;
        }

        Ok(())
    }

    pub fn collection(&self, name: &str) -> anyhow::Result<&Collection> {
        self.collections
            .iter()
            .find(|collection| collection.name == name)
            .with_context(|| format!("unknown collection {name}"))
    }

    pub fn media_folder(&self) -> anyhow::Result<&str> {
        self.media_folder
            .as_deref()
            .context("no `media_folder` configured")
    }
}
